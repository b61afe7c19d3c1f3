//! Product API Handlers
//!
//! 读路径走目录视图状态；写路径要求管理员角色 (数据库为准)，
//! 顺序固定：校验 → 写库 → 回填视图状态。

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::ProductRepository;
use crate::utils::{AppError, AppResult};

/// 编辑载荷的字段校验
///
/// 任何校验失败都发生在写库之前
fn validate_fields(
    name: Option<&str>,
    price: Option<&Decimal>,
    stock: Option<i64>,
) -> AppResult<()> {
    if let Some(name) = name
        && name.trim().is_empty()
    {
        return Err(AppError::Validation("Name must not be empty".to_string()));
    }
    if let Some(price) = price
        && price.is_sign_negative()
    {
        return Err(AppError::Validation(
            "Price must not be negative".to_string(),
        ));
    }
    if let Some(stock) = stock
        && stock < 0
    {
        return Err(AppError::Validation(
            "Stock must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/products - 目录列表 (展示顺序)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.catalog.list()))
}

/// GET /api/products/{id} - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state
        .catalog
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Product {}", id)))?;
    Ok(Json(product))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET /api/products/search?q= - 名称前缀搜索
pub async fn search(
    State(state): State<ServerState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Product>>> {
    if params.q.is_empty() {
        return Ok(Json(state.catalog.list()));
    }

    let repo = ProductRepository::new(state.get_db());
    let products = repo.search_by_name(&params.q).await?;
    Ok(Json(products))
}

/// POST /api/products - 创建商品 (管理员)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    state.gate.ensure_admin(&user.id).await?;

    validate_fields(
        Some(&payload.name),
        Some(&payload.price),
        Some(payload.stock),
    )?;

    let repo = ProductRepository::new(state.get_db());
    let product = repo.create(payload).await?;

    state.catalog.apply_edit(product.clone());

    tracing::info!(id = %product.id_string(), name = %product.name, "Product created");
    Ok(Json(product))
}

/// PUT /api/products/{id} - 更新商品 (管理员)
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    state.gate.ensure_admin(&user.id).await?;

    validate_fields(
        payload.name.as_deref(),
        payload.price.as_ref(),
        payload.stock,
    )?;

    let repo = ProductRepository::new(state.get_db());
    let product = repo.update(&id, payload).await?;

    state.catalog.apply_edit(product.clone());

    tracing::info!(id = %id, "Product updated");
    Ok(Json(product))
}

/// DELETE /api/products/{id} - 删除商品 (管理员)
///
/// 只移除后续可见性，已在购物车中的行项目保留
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    state.gate.ensure_admin(&user.id).await?;

    let repo = ProductRepository::new(state.get_db());
    repo.delete(&id).await?;

    state.catalog.remove(&id);

    tracing::info!(id = %id, "Product deleted");
    Ok(Json(true))
}
