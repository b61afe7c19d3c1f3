//! Authentication Handlers
//!
//! Handles registration, login, federated sign-in and token management

use std::time::Duration;

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppError;
use crate::auth::{CurrentUser, FederatedVerifier};
use crate::core::ServerState;
use crate::db::models::{User, UserInfo};
use crate::db::repository::UserRepository;
use crate::security_log;
use crate::utils::AppResult;

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// 注册请求
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// 登录请求
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 联合登录请求 (身份提供商令牌)
#[derive(Debug, Deserialize)]
pub struct FederatedRequest {
    pub token: String,
}

/// 登录响应
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

fn issue_token(state: &ServerState, user: &User) -> AppResult<String> {
    state
        .jwt_service
        .generate_token(&user.id_string(), &user.email, &user.name, &user.role)
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

/// Register handler
///
/// 创建 `client` 角色的用户档案并直接签发令牌
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<LoginResponse>> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let hash_pass = User::hash_password(&req.password)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    let users = UserRepository::new(state.get_db());
    let user = users
        .create(&req.email, &req.name, Some(hash_pass), "client")
        .await?;

    tracing::info!(user_id = %user.id_string(), email = %user.email, "User registered");

    let token = issue_token(&state, &user)?;
    Ok(Json(LoginResponse {
        token,
        user: UserInfo::from(&user),
    }))
}

/// Login handler
///
/// Authenticates user credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let users = UserRepository::new(state.get_db());
    let user = users.find_by_email(&req.email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Check authentication result - unified error message to prevent email enumeration
    let user = match user {
        Some(u) => {
            let password_valid = u
                .verify_password(&req.password)
                .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

            if !password_valid {
                security_log!(
                    "WARN",
                    "login_failed",
                    email = req.email.clone(),
                    reason = "invalid_credentials"
                );
                return Err(AppError::invalid_credentials());
            }

            u
        }
        None => {
            security_log!(
                "WARN",
                "login_failed",
                email = req.email.clone(),
                reason = "user_not_found"
            );
            return Err(AppError::invalid_credentials());
        }
    };

    tracing::info!(
        user_id = %user.id_string(),
        email = %user.email,
        role = %user.role,
        "User logged in successfully"
    );

    let token = issue_token(&state, &user)?;
    Ok(Json(LoginResponse {
        token,
        user: UserInfo::from(&user),
    }))
}

/// Federated sign-in handler
///
/// 验证身份提供商令牌，首次登录时自动创建 `client` 档案，
/// 然后换发本服务令牌
pub async fn federated(
    State(state): State<ServerState>,
    Json(req): Json<FederatedRequest>,
) -> AppResult<Json<LoginResponse>> {
    let verifier = FederatedVerifier::new(&state.config.federated);

    let identity = match verifier.verify(&req.token) {
        Ok(identity) => identity,
        Err(e) => {
            security_log!("WARN", "federated_rejected", error = format!("{}", e));
            return Err(AppError::InvalidToken);
        }
    };

    let users = UserRepository::new(state.get_db());
    let user = match users.find_by_email(&identity.email).await? {
        Some(existing) => existing,
        None => {
            let name = identity
                .name
                .clone()
                .unwrap_or_else(|| identity.email.split('@').next().unwrap_or("").to_string());
            let created = users.create(&identity.email, &name, None, "client").await?;
            tracing::info!(
                user_id = %created.id_string(),
                email = %created.email,
                "Federated profile provisioned"
            );
            created
        }
    };

    tracing::info!(
        user_id = %user.id_string(),
        email = %user.email,
        "Federated sign-in successful"
    );

    let token = issue_token(&state, &user)?;
    Ok(Json(LoginResponse {
        token,
        user: UserInfo::from(&user),
    }))
}

/// Get current user info
///
/// 重新读取档案，令牌里的角色声明可能已过期
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<UserInfo>> {
    let users = UserRepository::new(state.get_db());
    let profile = users
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", user.id)))?;

    Ok(Json(UserInfo::from(&profile)))
}

/// Logout handler (tokens are stateless, audit-log only)
pub async fn logout(Extension(user): Extension<CurrentUser>) -> AppResult<Json<()>> {
    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        "User logged out"
    );

    Ok(Json(()))
}
