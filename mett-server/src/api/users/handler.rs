//! User API Handlers
//!
//! User management is admin-only except for the own-password change, which
//! verifies the old password first.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::UserCreate;
use crate::utils::{AppResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct RoleGrant {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub name: String,
    pub roles: Vec<String>,
}

/// GET /api/users (admin)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<UserInfo>>> {
    user.require_admin()?;
    let users = state.store.list_users().await?;
    Ok(Json(
        users
            .into_iter()
            .map(|u| UserInfo {
                name: u.name,
                roles: u.roles,
            })
            .collect(),
    ))
}

/// POST /api/users - create a user plus its ledger account (admin)
///
/// The new user starts with the configured default role.
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<UserCreate>,
) -> AppResult<Json<UserInfo>> {
    user.require_admin()?;

    let created = state.store.create_user(&req.name, &req.password).await?;
    state
        .store
        .add_role_to_user(&req.name, &state.config.default_role)
        .await?;
    if !state.store.account_exists(&req.name).await? {
        state.store.create_account(&req.name).await?;
    }

    Ok(Json(UserInfo {
        name: created.name,
        roles: vec![state.config.default_role.clone()],
    }))
}

/// DELETE /api/users/:name (admin)
///
/// Removes the login only; the ledger account and its history stay.
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(name): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    user.require_admin()?;
    if name == user.name {
        return Err(AppError::validation("Cannot delete the own user"));
    }
    state.store.delete_user(&name).await?;
    Ok(ok(()))
}

/// POST /api/users/:name/roles (admin)
pub async fn add_role(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(name): Path<String>,
    Json(req): Json<RoleGrant>,
) -> AppResult<Json<AppResponse<()>>> {
    user.require_admin()?;
    state.store.add_role_to_user(&name, &req.role).await?;
    Ok(ok(()))
}

/// DELETE /api/users/:name/roles/:role (admin)
pub async fn remove_role(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((name, role)): Path<(String, String)>,
) -> AppResult<Json<AppResponse<()>>> {
    user.require_admin()?;
    state.store.remove_role_from_user(&name, &role).await?;
    Ok(ok(()))
}

/// PUT /api/users/me/password - change the own password
pub async fn change_own_password(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<PasswordChange>,
) -> AppResult<Json<AppResponse<()>>> {
    if !state
        .store
        .password_is_correct(&user.name, &req.old_password)
        .await?
    {
        return Err(AppError::validation("Wrong password"));
    }
    state
        .store
        .change_password(&user.name, &req.new_password)
        .await?;
    Ok(ok(()))
}
