//! Cart API Handlers
//!
//! 加购是两步：先库存预留 (原子递减)，成功后才进购物车。
//! 预留失败时购物车不变，返回且仅返回一个错误。

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::cart::{CartError, CartSnapshot};
use crate::core::ServerState;
use crate::inventory::ReserveError;
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message};

/// 加购请求 (每次请求预留并加入一件)
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
}

/// 数量覆盖请求
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

impl From<ReserveError> for AppError {
    fn from(e: ReserveError) -> Self {
        match e {
            ReserveError::OutOfStock(id) => {
                AppError::OutOfStock(format!("Product {} is out of stock", id))
            }
            ReserveError::NotFound(id) => AppError::NotFound(format!("Product {}", id)),
            ReserveError::Unavailable(msg) => AppError::Database(msg),
        }
    }
}

/// GET /api/cart - 当前购物车快照
pub async fn snapshot(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<CartSnapshot>> {
    Ok(Json(state.carts.snapshot(&user.id)))
}

/// POST /api/cart/items - 预留一件并加入购物车
pub async fn add_item(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<AddItemRequest>,
) -> AppResult<Json<CartSnapshot>> {
    // 目录视图里的库存作为本地门槛
    let product = state
        .catalog
        .get(&req.product_id)
        .ok_or_else(|| AppError::NotFound(format!("Product {}", req.product_id)))?;

    let reserved = state
        .inventory
        .try_reserve(&req.product_id, product.stock)
        .await?;

    // 预留成功后把最新库存回填到目录视图
    state.catalog.apply_edit(reserved.clone());

    let snapshot = state
        .carts
        .add(
            &user.id,
            &req.product_id,
            &reserved.name,
            reserved.price,
            &reserved.image_url,
            1,
        )
        .map_err(|e: CartError| AppError::Validation(e.to_string()))?;

    tracing::info!(user = %user.id, product = %req.product_id, "Item added to cart");
    Ok(Json(snapshot))
}

/// PUT /api/cart/items/{product_id} - 覆盖数量 (0 等价于移除)
pub async fn set_quantity(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(product_id): Path<String>,
    Json(req): Json<SetQuantityRequest>,
) -> AppResult<Json<CartSnapshot>> {
    Ok(Json(state.carts.set_quantity(&user.id, &product_id, req.quantity)))
}

/// DELETE /api/cart/items/{product_id} - 移除行项目 (幂等)
pub async fn remove_item(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(product_id): Path<String>,
) -> AppResult<Json<CartSnapshot>> {
    Ok(Json(state.carts.remove(&user.id, &product_id)))
}

/// POST /api/cart/checkout - 结算并清空购物车
pub async fn checkout(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<AppResponse<CartSnapshot>>> {
    let current = state.carts.snapshot(&user.id);
    if current.is_empty() {
        return Err(AppError::BusinessRule("Cart is empty".to_string()));
    }

    let cleared = state.carts.clear(&user.id);

    tracing::info!(
        user = %user.id,
        total = %current.grand_total,
        items = current.items.len(),
        "Checkout completed"
    );

    Ok(ok_with_message(cleared, "Purchase completed"))
}
