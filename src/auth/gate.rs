//! 管理员角色校验
//!
//! 管理员写操作不信任令牌中的角色声明，每次都重新读取用户档案。
//! 档案缺失、角色非 admin 或读取失败一律拒绝。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::AppError;
use crate::db::repository::UserRepository;
use crate::security_log;
use crate::utils::AppResult;

/// 角色门卫
#[derive(Clone)]
pub struct RoleGate {
    users: UserRepository,
}

impl RoleGate {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            users: UserRepository::new(db),
        }
    }

    /// 当前档案角色是否为管理员
    ///
    /// 查询失败或档案缺失视为非管理员
    pub async fn is_admin(&self, user_id: &str) -> bool {
        matches!(
            self.users.find_by_id(user_id).await,
            Ok(Some(user)) if user.role == "admin"
        )
    }

    /// 要求管理员角色，否则返回 403
    pub async fn ensure_admin(&self, user_id: &str) -> AppResult<()> {
        if self.is_admin(user_id).await {
            Ok(())
        } else {
            security_log!("WARN", "admin_required", user_id = user_id.to_string());
            Err(AppError::Forbidden(
                "Administrator privileges required".to_string(),
            ))
        }
    }
}
