use std::path::PathBuf;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{JwtService, RoleGate};
use crate::cart::CartStore;
use crate::catalog::CatalogService;
use crate::core::Config;
use crate::db::DbService;
use crate::inventory::InventoryService;
use crate::location::LocationService;

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是店面节点的核心数据结构。所有服务内部使用 Arc，
/// Clone 是浅拷贝，成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | catalog | CatalogService | 商品目录视图状态 |
/// | carts | CartStore | 购物车状态 |
/// | inventory | InventoryService | 库存预留 |
/// | gate | RoleGate | 管理员角色校验 |
/// | locations | LocationService | 位置上报 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 商品目录视图状态
    pub catalog: CatalogService,
    /// 购物车状态
    pub carts: CartStore,
    /// 库存预留服务
    pub inventory: InventoryService,
    /// 管理员角色校验
    pub gate: RoleGate,
    /// 位置上报服务
    pub locations: LocationService,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("environment", &self.config.environment)
            .field("http_port", &self.config.http_port)
            .finish()
    }
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/tienda.db)
    /// 3. 各服务 (JWT, Catalog, Cart, Inventory, Gate, Location)
    /// 4. 目录缓存预热
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Initialize DB
        let db_path = config.database_dir().join("tienda.db");
        let db_path_str = db_path.to_string_lossy();

        let db_service = DbService::new(&db_path_str)
            .await
            .expect("Failed to initialize database");

        let state = Self::with_db(config.clone(), db_service.db);

        // 2. Warm the catalog view-state
        if let Err(e) = state.catalog.load_all().await {
            tracing::error!(error = %e, "Failed to warm catalog cache");
        }

        state
    }

    /// 基于已打开的数据库构造状态 (测试场景直接传入内存引擎)
    pub fn with_db(config: Config, db: Surreal<Db>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let catalog = CatalogService::new(db.clone());
        let carts = CartStore::new();
        let inventory = InventoryService::new(db.clone());
        let gate = RoleGate::new(db.clone());
        let locations = LocationService::new(db.clone(), config.enable_location_tracking);

        Self {
            config,
            db,
            jwt_service,
            catalog,
            carts,
            inventory,
            gate,
            locations,
        }
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
