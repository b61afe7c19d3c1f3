//! 工具模块
//!
//! - [`error`] - 统一错误处理
//! - [`logger`] - 日志初始化
//! - [`result`] - Result 类型别名

pub mod error;
pub mod logger;
pub mod result;

pub use error::{AppError, AppResponse, ok, ok_with_message};
pub use result::AppResult;
