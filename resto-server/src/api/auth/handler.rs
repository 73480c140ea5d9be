//! Authentication Handlers

use std::time::Duration;

use axum::{Json, extract::State};
use shared::client::{LoginRequest, LoginResponse, UserInfo};
use shared::error::{AppError, AppResult, ErrorCode};

use crate::auth::password::verify_password;
use crate::auth::permissions::role_permissions;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;

/// Fixed delay before answering a login, whatever the outcome
const AUTH_FIXED_DELAY_MS: u64 = 500;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// POST /api/auth/login
///
/// Unknown user, wrong password and disabled account all get the same
/// 401 after the same delay.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let username = req.username.trim().to_string();
    let found = user::find_by_username(&state.pool, &username).await?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let account = match found {
        Some(u) if u.is_active && verify_password(&u.hash_pass, &req.password) => u,
        Some(u) => {
            let reason = if u.is_active { "invalid_password" } else { "account_disabled" };
            security_log!("WARN", "login_failed", username = username.as_str(), reason = reason);
            return Err(AppError::with_message(ErrorCode::InvalidCredentials, INVALID_CREDENTIALS));
        }
        None => {
            security_log!(
                "WARN",
                "login_failed",
                username = username.as_str(),
                reason = "user_not_found"
            );
            return Err(AppError::with_message(ErrorCode::InvalidCredentials, INVALID_CREDENTIALS));
        }
    };

    let permissions = role_permissions(account.role);
    let token = state
        .get_jwt_service()
        .generate_token(account.id, &account.username, account.role, &permissions)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    security_log!(
        "INFO",
        "login_success",
        user_id = account.id,
        username = account.username.as_str(),
        role = account.role.as_str()
    );

    Ok(Json(LoginResponse {
        token,
        user: UserInfo {
            id: account.id,
            username: account.username,
            display_name: account.display_name,
            role: account.role,
            permissions,
        },
    }))
}

/// GET /api/auth/me
pub async fn me(State(state): State<ServerState>, current: CurrentUser) -> AppResult<Json<UserInfo>> {
    let account = user::find_by_id(&state.pool, current.id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::AccountDisabled))?;

    Ok(Json(UserInfo {
        id: account.id,
        username: account.username,
        display_name: account.display_name,
        role: account.role,
        permissions: current.permissions,
    }))
}
