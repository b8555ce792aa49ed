//! Purchase API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/purchases", purchase_routes())
}

fn purchase_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}/authorize", post(handler::authorize))
        .route("/{id}/decline", post(handler::decline))
}
