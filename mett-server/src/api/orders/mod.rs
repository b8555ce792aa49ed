//! Order API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_all).post(handler::create))
        .route(
            "/current",
            get(handler::current_bun_order).delete(handler::drop_current),
        )
        .route("/current/process", post(handler::process))
        .route("/current/expired", get(handler::current_expired))
        .route("/current/mett", get(handler::current_mett_order))
        .route("/current/buns", post(handler::order_buns))
        .route("/current/buns/{account}", get(handler::user_buns))
        .route("/current/reroute", post(handler::reroute))
        .route("/history/{account}", get(handler::history))
}
