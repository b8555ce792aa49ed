//! Account API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Account, Deposit};
use crate::utils::{AppResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct AccountCreate {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct BalanceChange {
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct BalanceInfo {
    pub name: String,
    pub balance: Option<Decimal>,
}

/// GET /api/accounts - all ledger accounts (admin)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Account>>> {
    user.require_admin()?;
    Ok(Json(state.store.list_accounts().await?))
}

/// POST /api/accounts - create an account with balance 0 (admin)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<AccountCreate>,
) -> AppResult<Json<Account>> {
    user.require_admin()?;
    Ok(Json(state.store.create_account(&req.name).await?))
}

/// DELETE /api/accounts/:name (admin)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(name): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    user.require_admin()?;
    state.store.delete_account(&name).await?;
    Ok(ok(()))
}

/// GET /api/accounts/:name/balance - own balance, or any as admin
pub async fn get_balance(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(name): Path<String>,
) -> AppResult<Json<BalanceInfo>> {
    if name != user.name {
        user.require_admin()?;
    }
    let balance = state.store.get_balance(&name).await?;
    Ok(Json(BalanceInfo { name, balance }))
}

/// POST /api/accounts/:name/balance - book a signed amount (admin)
///
/// The admin stamped into the audit row is the authenticated caller.
pub async fn change_balance(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(name): Path<String>,
    Json(req): Json<BalanceChange>,
) -> AppResult<Json<AppResponse<()>>> {
    user.require_admin()?;
    state
        .store
        .change_balance(&name, req.amount, &user.name)
        .await?;
    Ok(ok(()))
}

/// GET /api/deposits - the balance-change audit log (admin)
pub async fn list_deposits(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Deposit>>> {
    user.require_admin()?;
    Ok(Json(state.store.list_deposits().await?))
}
