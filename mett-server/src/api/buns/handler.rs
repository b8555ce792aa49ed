//! Bun catalog API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::BunClass;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct BunClassCreate {
    pub name: String,
    pub price: Decimal,
    pub mett: f64,
}

#[derive(Debug, Deserialize)]
pub struct PriceChange {
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct MettChange {
    pub mett: f64,
}

/// GET /api/buns - all bun class names
pub async fn list(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.store.list_bun_classes().await?))
}

/// GET /api/buns/prices - catalog with price and mett content
pub async fn list_with_prices(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<Vec<BunClass>>> {
    Ok(Json(state.store.list_bun_classes_with_price().await?))
}

/// POST /api/buns - add a bun class (admin)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<BunClassCreate>,
) -> AppResult<Json<BunClass>> {
    user.require_admin()?;
    Ok(Json(
        state
            .store
            .add_bun_class(&req.name, req.price, req.mett)
            .await?,
    ))
}

/// PUT /api/buns/:name/price - change the price (admin)
pub async fn change_price(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(name): Path<String>,
    Json(req): Json<PriceChange>,
) -> AppResult<Json<BunClass>> {
    user.require_admin()?;
    Ok(Json(state.store.change_bun_price(&name, req.price).await?))
}

/// PUT /api/buns/:name/mett - change the mett grams (admin)
pub async fn change_mett(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(name): Path<String>,
    Json(req): Json<MettChange>,
) -> AppResult<Json<BunClass>> {
    user.require_admin()?;
    Ok(Json(state.store.change_mett_formula(&name, req.mett).await?))
}
