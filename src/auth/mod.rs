//! 认证模块
//!
//! - [`jwt`] - JWT 令牌生成与验证
//! - [`federated`] - 联合登录令牌验证
//! - [`middleware`] - 认证中间件
//! - [`gate`] - 管理员角色校验 (数据库为准)

pub mod federated;
pub mod gate;
pub mod jwt;
pub mod middleware;

pub use federated::{FederatedConfig, FederatedIdentity, FederatedVerifier};
pub use gate::RoleGate;
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{CurrentUserExt, require_auth};
