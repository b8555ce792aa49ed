//! Account API module

mod handler;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/accounts", account_routes())
        .route("/api/deposits", get(handler::list_deposits))
}

fn account_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{name}", delete(handler::delete))
        .route(
            "/{name}/balance",
            get(handler::get_balance).post(handler::change_balance),
        )
}
