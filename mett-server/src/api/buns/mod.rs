//! Bun catalog API module

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/buns", bun_routes())
}

fn bun_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/prices", get(handler::list_with_prices))
        .route("/{name}/price", put(handler::change_price))
        .route("/{name}/mett", put(handler::change_mett))
}
