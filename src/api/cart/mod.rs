//! 购物车 API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", cart_routes())
}

fn cart_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::snapshot))
        .route("/items", post(handler::add_item))
        .route(
            "/items/{product_id}",
            put(handler::set_quantity).delete(handler::remove_item),
        )
        .route("/checkout", post(handler::checkout))
}
