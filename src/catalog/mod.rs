//! Catalog view-state
//!
//! 商品目录的内存视图：展示顺序 = 装载顺序，写路径先数据库后缓存。
//! 目录为空时回退到内置样例清单。

use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use tokio::sync::broadcast;

use crate::db::models::Product;
use crate::db::repository::{ProductRepository, RepoResult};

/// 目录变更事件
#[derive(Debug, Clone, Serialize)]
pub enum CatalogEvent {
    /// 整表重载
    Reset,
    /// 单个商品被插入或原位替换
    Upserted { id: String },
    /// 单个商品被移除
    Removed { id: String },
}

/// 商品目录服务
///
/// 有序商品列表缓存在 `RwLock<Vec<_>>` 后面；
/// 变更通过 broadcast 通道通知订阅者。
#[derive(Clone)]
pub struct CatalogService {
    repo: ProductRepository,
    products: Arc<RwLock<Vec<Product>>>,
    events: broadcast::Sender<CatalogEvent>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.products.read().len();
        f.debug_struct("CatalogService")
            .field("products_count", &count)
            .finish()
    }
}

impl CatalogService {
    pub fn new(db: Surreal<Db>) -> Self {
        let (events, _rx) = broadcast::channel(64);
        Self {
            repo: ProductRepository::new(db),
            products: Arc::new(RwLock::new(Vec::new())),
            events,
        }
    }

    /// 从数据库整表重载缓存
    ///
    /// 数据库为空时装入内置样例清单 (不落库)。
    pub async fn load_all(&self) -> RepoResult<()> {
        let mut products = self.repo.find_all().await?;

        if products.is_empty() {
            products = sample_products();
            tracing::info!("📦 CatalogService: empty catalog, loaded sample products");
        }

        let count = products.len();
        {
            let mut cache = self.products.write();
            *cache = products;
        }
        tracing::info!("📦 CatalogService: Loaded {} products", count);

        let _ = self.events.send(CatalogEvent::Reset);
        Ok(())
    }

    /// List all products (from cache, display order)
    pub fn list(&self) -> Vec<Product> {
        self.products.read().clone()
    }

    /// Get product by ID (from cache)
    pub fn get(&self, id: &str) -> Option<Product> {
        self.products
            .read()
            .iter()
            .find(|p| p.id_string() == id)
            .cloned()
    }

    /// 身份匹配的 upsert
    ///
    /// ID 已存在时原位替换 (位置和其余条目不动)，否则追加到尾部。
    pub fn apply_edit(&self, product: Product) {
        let id = product.id_string();
        {
            let mut cache = self.products.write();
            match cache.iter_mut().find(|p| p.id_string() == id) {
                Some(slot) => *slot = product,
                None => cache.push(product),
            }
        }
        let _ = self.events.send(CatalogEvent::Upserted { id });
    }

    /// 移除商品 (不存在时为无操作)
    pub fn remove(&self, id: &str) {
        {
            let mut cache = self.products.write();
            cache.retain(|p| p.id_string() != id);
        }
        let _ = self.events.send(CatalogEvent::Removed { id: id.to_string() });
    }

    /// 订阅目录变更事件
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }
}

/// 内置样例清单 (目录为空时的展示回退)
fn sample_products() -> Vec<Product> {
    let fixtures = [
        ("1", "Camiseta", Decimal::new(1999, 2)),
        ("2", "Pantalón", Decimal::new(3999, 2)),
        ("3", "Zapatos", Decimal::new(5999, 2)),
        ("4", "Gorra", Decimal::new(1499, 2)),
    ];

    fixtures
        .into_iter()
        .map(|(key, name, price)| Product {
            id: Some(RecordId::from_table_key("product", key)),
            name: name.to_string(),
            price,
            stock: 10,
            category: String::new(),
            image_url: String::new(),
            description: String::new(),
        })
        .collect()
}
