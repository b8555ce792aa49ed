//! API route modules
//!
//! One module per resource, each with its own `router()`: `mod.rs` wires
//! routes, `handler.rs` holds the handlers. Handlers are thin: decode the
//! request, call [`MettStore`](crate::db::MettStore), map errors.

pub mod convert;

pub mod accounts;
pub mod auth;
pub mod buns;
pub mod health;
pub mod orders;
pub mod purchases;
pub mod users;

use axum::Router;

use crate::core::ServerState;

/// The full API router
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(accounts::router())
        .merge(buns::router())
        .merge(orders::router())
        .merge(purchases::router())
        .merge(users::router())
}

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
