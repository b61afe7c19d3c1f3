//! 认证 API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub use handler::{FederatedRequest, LoginRequest, LoginResponse, RegisterRequest};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", auth_routes())
}

fn auth_routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/federated", post(handler::federated))
        .route("/me", get(handler::me))
        .route("/logout", post(handler::logout))
}
