//! Product Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use rust_decimal::Decimal;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all products
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY name")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let product: Option<Product> = self.base.db().select(thing).await?;
        Ok(product)
    }

    /// Prefix search on product name
    pub async fn search_by_name(&self, prefix: &str) -> RepoResult<Vec<Product>> {
        let prefix_owned = prefix.to_string();
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE string::starts_with(name, $prefix) ORDER BY name")
            .bind(("prefix", prefix_owned))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        // Internal struct preserves field defaults for the document store
        #[derive(serde::Serialize)]
        struct InternalProduct {
            name: String,
            price: Decimal,
            stock: i64,
            category: String,
            image_url: String,
            description: String,
        }

        let product = InternalProduct {
            name: data.name,
            price: data.price,
            stock: data.stock,
            category: data.category.unwrap_or_default(),
            image_url: data.image_url.unwrap_or_default(),
            description: data.description.unwrap_or_default(),
        };

        let created: Option<Product> = self.base.db().create("product").content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product (partial, SET-based)
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;

        // Build dynamic SET clauses
        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.stock.is_some() {
            set_parts.push("stock = $stock");
        }
        if data.category.is_some() {
            set_parts.push("category = $category");
        }
        if data.image_url.is_some() {
            set_parts.push("image_url = $image_url");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)));
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(&query_str).bind(("thing", thing));

        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = data.stock {
            query = query.bind(("stock", v));
        }
        if let Some(v) = data.category {
            query = query.bind(("category", v));
        }
        if let Some(v) = data.image_url {
            query = query.bind(("image_url", v));
        }
        if let Some(v) = data.description {
            query = query.bind(("description", v));
        }

        let mut result = query.await?;
        result
            .take::<Option<Product>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Hard delete a product
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Atomically reserve one unit of stock
    ///
    /// 单次条件递减：`stock > 0` 不满足时不产生任何写入。
    /// 返回 `Ok(None)` 表示无库存可减或记录不存在，调用方自行区分。
    pub async fn try_decrement_stock(&self, id: &str) -> RepoResult<Option<Product>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;

        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET stock -= 1 WHERE stock > 0 RETURN AFTER")
            .bind(("thing", thing))
            .await?;

        let updated: Option<Product> = result.take(0)?;
        Ok(updated)
    }
}
