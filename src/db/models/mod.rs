//! Database Models

pub mod location;
pub mod product;
pub mod serde_helpers;
pub mod user;

pub use location::LocationPing;
pub use product::{Product, ProductCreate, ProductId, ProductUpdate};
pub use user::{User, UserId, UserInfo};
