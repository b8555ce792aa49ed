//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::convert::record_key;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{BunCounts, MettOrder, OrderHistory, OrderedBun};
use crate::utils::{AppError, AppResponse, AppResult, ok, time};

#[derive(Debug, Deserialize)]
pub struct OrderCreate {
    /// Expiry date, YYYY-MM-DD; the window closes at the configured cutoff
    pub expiry_date: String,
}

#[derive(Debug, Deserialize)]
pub struct SpareQuery {
    /// Include the spare-bun adjustment; on by default
    #[serde(default = "default_true")]
    pub spares: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct BunOrderRequest {
    pub bun_class: String,
    /// Number of buns; the store takes one line item per bun
    #[serde(default = "default_count")]
    pub count: u32,
    /// Admins may order on behalf of another account
    pub account: Option<String>,
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct RerouteRequest {
    pub bun_class: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct OrderInfo {
    pub id: String,
    pub expiry_date: NaiveDate,
    pub processed: bool,
    pub buns: Vec<OrderedBun>,
}

impl From<MettOrder> for OrderInfo {
    fn from(order: MettOrder) -> Self {
        Self {
            id: record_key(&order.id),
            expiry_date: order.expiry_date,
            processed: order.processed,
            buns: order.buns,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MettOrderInfo {
    pub grams: f64,
}

#[derive(Debug, Serialize)]
pub struct ExpiredInfo {
    pub expired: bool,
}

/// POST /api/orders - open a new order window (admin)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<OrderCreate>,
) -> AppResult<Json<OrderInfo>> {
    user.require_admin()?;
    let expiry_date = time::parse_date(&req.expiry_date)?;
    let order = state.store.create_order(expiry_date).await?;
    Ok(Json(order.into()))
}

/// GET /api/orders - every order, processed included (admin)
pub async fn list_all(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<OrderInfo>>> {
    user.require_admin()?;
    let orders = state.store.get_all_order_information().await?;
    Ok(Json(orders.into_iter().map(OrderInfo::from).collect()))
}

/// GET /api/orders/current - aggregated bun counts of the open window
pub async fn current_bun_order(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Query(query): Query<SpareQuery>,
) -> AppResult<Json<BunCounts>> {
    Ok(Json(state.store.get_current_bun_order(query.spares).await?))
}

/// DELETE /api/orders/current - cancel the open window (admin)
pub async fn drop_current(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<()>>> {
    user.require_admin()?;
    state.store.drop_current_order().await?;
    Ok(ok(()))
}

/// POST /api/orders/current/process - charge and close the window (admin)
pub async fn process(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<()>>> {
    user.require_admin()?;
    state.store.process_order().await?;
    Ok(ok(()))
}

/// GET /api/orders/current/expired
pub async fn current_expired(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<ExpiredInfo>> {
    Ok(Json(ExpiredInfo {
        expired: state.store.current_order_is_expired().await?,
    }))
}

/// GET /api/orders/current/mett - grams of mett to buy for the window
pub async fn current_mett_order(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Query(query): Query<SpareQuery>,
) -> AppResult<Json<MettOrderInfo>> {
    Ok(Json(MettOrderInfo {
        grams: state.store.get_current_mett_order(query.spares).await?,
    }))
}

/// POST /api/orders/current/buns - order buns into the open window
///
/// Orders for the caller's own account; admins may name another account.
pub async fn order_buns(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<BunOrderRequest>,
) -> AppResult<Json<AppResponse<()>>> {
    let account = match req.account {
        Some(account) if account != user.name => {
            user.require_admin()?;
            account
        }
        _ => user.name.clone(),
    };
    if req.count == 0 {
        return Err(AppError::validation("count must be at least 1"));
    }

    for _ in 0..req.count {
        state.store.order_bun(&account, &req.bun_class).await?;
    }
    Ok(ok(()))
}

/// GET /api/orders/current/buns/:account - one account's buns in the window
pub async fn user_buns(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(account): Path<String>,
) -> AppResult<Json<BunCounts>> {
    if account != user.name {
        user.require_admin()?;
    }
    Ok(Json(state.store.get_current_user_buns(&account).await?))
}

/// POST /api/orders/current/reroute - reassign the first matching bun (admin)
pub async fn reroute(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<RerouteRequest>,
) -> AppResult<Json<AppResponse<()>>> {
    user.require_admin()?;
    state
        .store
        .reroute_bun(&req.bun_class, &req.from, &req.to)
        .await?;
    Ok(ok(()))
}

/// GET /api/orders/history/:account - mean buns over processed orders
pub async fn history(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(account): Path<String>,
) -> AppResult<Json<OrderHistory>> {
    if account != user.name {
        user.require_admin()?;
    }
    Ok(Json(state.store.get_order_history(&account).await?))
}
