//! Tienda Server - 移动店面后端节点
//!
//! # 架构概述
//!
//! 本模块是店面服务的主入口，提供以下核心功能：
//!
//! - **目录** (`catalog`): 商品目录视图状态，身份匹配的原位更新
//! - **购物车** (`cart`): 按用户键控的购物车状态与快照广播
//! - **库存** (`inventory`): 加购前的原子库存预留
//! - **认证** (`auth`): JWT + Argon2 认证，联合登录，管理员角色门
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、联合登录、角色门
//! ├── catalog/       # 商品目录视图状态
//! ├── cart/          # 购物车状态
//! ├── inventory/     # 库存预留
//! ├── location/      # 位置上报
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 工具函数
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod core;
pub mod db;
pub mod inventory;
pub mod location;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use cart::CartStore;
pub use catalog::CatalogService;
pub use core::{Config, Server, ServerState};
pub use inventory::InventoryService;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv, 日志)
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
  ______                __
 /_  __(_)__  ____  ____/ /___ _
  / / / / _ \/ __ \/ __  / __ `/
 / / / /  __/ / / / /_/ / /_/ /
/_/ /_/\___/_/ /_/\__,_/\__,_/
    "#
    );
}
