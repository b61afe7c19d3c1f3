//! Inventory reconciler
//!
//! 加购前的库存预留：先本地库存门槛，后单次原子条件递减。
//! 任何失败都不重试，调用方收到且仅收到一个错误。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::db::models::Product;
use crate::db::repository::{ProductRepository, RepoError};

/// 预留失败原因
#[derive(Debug, Error)]
pub enum ReserveError {
    #[error("Out of stock: {0}")]
    OutOfStock(String),

    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// 库存预留服务
#[derive(Clone)]
pub struct InventoryService {
    products: ProductRepository,
}

impl InventoryService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db),
        }
    }

    /// 预留一件商品
    ///
    /// `current_stock` 是调用方视图里的库存：
    /// - `<= 0` 立即返回 OutOfStock，不访问数据库
    /// - 否则恰好一次条件递减 (`stock > 0` 不满足则无写入)
    ///
    /// 成功返回递减后的最新商品记录，供调用方快照名称/单价。
    pub async fn try_reserve(
        &self,
        product_id: &str,
        current_stock: i64,
    ) -> Result<Product, ReserveError> {
        if current_stock <= 0 {
            return Err(ReserveError::OutOfStock(product_id.to_string()));
        }

        match self.products.try_decrement_stock(product_id).await {
            Ok(Some(product)) => Ok(product),
            // 递减未命中：记录存在则是库存已被抢完，否则商品不存在
            Ok(None) => match self.products.find_by_id(product_id).await {
                Ok(Some(_)) => Err(ReserveError::OutOfStock(product_id.to_string())),
                Ok(None) => Err(ReserveError::NotFound(product_id.to_string())),
                Err(e) => Err(ReserveError::Unavailable(e.to_string())),
            },
            Err(RepoError::Validation(msg)) => Err(ReserveError::NotFound(msg)),
            Err(e) => Err(ReserveError::Unavailable(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::ProductCreate;
    use rust_decimal::Decimal;

    async fn setup() -> (InventoryService, ProductRepository) {
        let db = DbService::memory().await.expect("in-memory db").db;
        (
            InventoryService::new(db.clone()),
            ProductRepository::new(db),
        )
    }

    fn create_payload(name: &str, stock: i64) -> ProductCreate {
        ProductCreate {
            name: name.to_string(),
            price: Decimal::new(1999, 2),
            stock,
            category: None,
            image_url: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_reserve_decrements_once() {
        let (inventory, repo) = setup().await;
        let created = repo.create(create_payload("Camiseta", 3)).await.unwrap();
        let id = created.id_string();

        let reserved = inventory.try_reserve(&id, created.stock).await.unwrap();
        assert_eq!(reserved.stock, 2);

        let stored = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 2);
    }

    #[tokio::test]
    async fn test_zero_local_stock_skips_store() {
        let (inventory, repo) = setup().await;
        // 数据库里实际还有库存，但调用方视图为 0
        let created = repo.create(create_payload("Camiseta", 5)).await.unwrap();
        let id = created.id_string();

        let err = inventory.try_reserve(&id, 0).await.unwrap_err();
        assert!(matches!(err, ReserveError::OutOfStock(_)));

        // 没有发生远端递减
        let stored = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 5);
    }

    #[tokio::test]
    async fn test_reserve_exhausted_stock() {
        let (inventory, repo) = setup().await;
        let created = repo.create(create_payload("Gorra", 1)).await.unwrap();
        let id = created.id_string();

        inventory.try_reserve(&id, 1).await.unwrap();

        // 调用方视图过期 (仍以为有货)，远端门槛兜底
        let err = inventory.try_reserve(&id, 1).await.unwrap_err();
        assert!(matches!(err, ReserveError::OutOfStock(_)));

        let stored = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 0);
    }

    #[tokio::test]
    async fn test_reserve_missing_product() {
        let (inventory, _repo) = setup().await;
        let err = inventory.try_reserve("product:404", 1).await.unwrap_err();
        assert!(matches!(err, ReserveError::NotFound(_)));
    }
}
