//! Purchase API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::convert::record_key;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Purchase;
use crate::utils::{AppResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct PurchaseCreate {
    pub amount: Decimal,
    pub purpose: String,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseListQuery {
    /// List resolved purchases instead of pending ones
    #[serde(default)]
    pub processed: bool,
}

#[derive(Debug, Serialize)]
pub struct PurchaseInfo {
    pub id: String,
    pub account: String,
    pub amount: Decimal,
    pub purpose: String,
    pub timestamp: DateTime<Utc>,
    pub processed: bool,
    pub authorized: Option<bool>,
    pub by: Option<String>,
    pub at: Option<DateTime<Utc>>,
}

impl From<Purchase> for PurchaseInfo {
    fn from(purchase: Purchase) -> Self {
        Self {
            id: record_key(&purchase.id),
            account: purchase.account,
            amount: purchase.amount,
            purpose: purchase.purpose,
            timestamp: purchase.timestamp,
            processed: purchase.processed,
            authorized: purchase.authorized,
            by: purchase.by,
            at: purchase.at,
        }
    }
}

/// POST /api/purchases - file a reimbursement claim for the caller
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<PurchaseCreate>,
) -> AppResult<Json<PurchaseInfo>> {
    let purchase = state
        .store
        .state_purchase(&user.name, req.amount, &req.purpose)
        .await?;
    Ok(Json(purchase.into()))
}

/// GET /api/purchases?processed= - pending or resolved purchases (admin)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<PurchaseListQuery>,
) -> AppResult<Json<Vec<PurchaseInfo>>> {
    user.require_admin()?;
    let purchases = state.store.list_purchases(query.processed).await?;
    Ok(Json(purchases.into_iter().map(PurchaseInfo::from).collect()))
}

/// POST /api/purchases/:id/authorize - credit the amount (admin)
pub async fn authorize(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    user.require_admin()?;
    state.store.authorize_purchase(&id, &user.name).await?;
    Ok(ok(()))
}

/// POST /api/purchases/:id/decline - reject the claim (admin)
pub async fn decline(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    user.require_admin()?;
    state.store.decline_purchase(&id, &user.name).await?;
    Ok(ok(()))
}
