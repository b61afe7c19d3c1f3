//! 购物车模块
//!
//! - [`model`] - 行项目与快照
//! - [`store`] - 每用户购物车状态，单写者纪律

pub mod model;
pub mod store;

pub use model::{CartError, CartItem, CartSnapshot};
pub use store::CartStore;
