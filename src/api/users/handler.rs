//! User Management Handlers
//!
//! 仅管理员可访问，每次请求都重新查库确认角色

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::UserInfo;
use crate::db::models::user::is_valid_role;
use crate::db::repository::UserRepository;
use crate::security_log;
use crate::utils::{AppError, AppResult};

/// 角色变更请求
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

/// GET /api/users - 用户列表 (管理员)
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<UserInfo>>> {
    state.gate.ensure_admin(&user.id).await?;

    let users = UserRepository::new(state.get_db());
    let all = users.find_all().await?;

    Ok(Json(all.iter().map(UserInfo::from).collect()))
}

/// PUT /api/users/{id}/role - 变更用户角色 (管理员)
pub async fn set_role(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> AppResult<Json<UserInfo>> {
    state.gate.ensure_admin(&user.id).await?;

    if !is_valid_role(&req.role) {
        return Err(AppError::Validation(format!(
            "Unknown role: {}",
            req.role
        )));
    }

    let users = UserRepository::new(state.get_db());
    let updated = users.set_role(&id, &req.role).await?;

    security_log!(
        "INFO",
        "role_changed",
        admin = user.id.clone(),
        target = id.clone(),
        role = req.role.clone()
    );

    Ok(Json(UserInfo::from(&updated)))
}
