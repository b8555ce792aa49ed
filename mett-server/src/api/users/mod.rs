//! User API module

mod handler;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", user_routes())
}

fn user_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/me/password", put(handler::change_own_password))
        .route("/{name}", delete(handler::delete))
        .route("/{name}/roles", post(handler::add_role))
        .route("/{name}/roles/{role}", delete(handler::remove_role))
}
