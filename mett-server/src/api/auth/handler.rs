//! Authentication Handlers

use std::time::Duration;

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::AppError;
use crate::core::ServerState;

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub name: String,
    pub roles: Vec<String>,
    /// Ledger balance of the account with the same name, if one exists
    pub balance: Option<Decimal>,
}

/// Login handler
///
/// Verifies the credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state.store.get_user(&req.username).await?;

    // Fixed delay before checking the result, against timing attacks
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent username enumeration
    let user = match user {
        Some(user) => {
            let password_valid = user.verify_password(&req.password).map_err(|e| {
                AppError::internal(format!("Password verification failed: {}", e))
            })?;
            if !password_valid {
                tracing::warn!(username = %req.username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }
            user
        }
        None => {
            tracing::warn!(username = %req.username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let token = state
        .get_jwt_service()
        .generate_token(&user.name, &user.roles)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    let balance = state.store.get_balance(&user.name).await?;

    tracing::info!(username = %user.name, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserInfo {
            name: user.name,
            roles: user.roles,
            balance,
        },
    }))
}
