//! Cart line items and snapshots

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 购物车错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Quantity delta must be at least 1")]
    InvalidQuantity,
}

/// 购物车行项目
///
/// 名称和单价在加入时快照，之后商品记录的改动不会回写到已有行项目。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// 商品 ID ("product:xxx")
    pub product_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: String,
}

impl CartItem {
    /// 行小计 = 单价 × 数量
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// 购物车快照 - 唯一的观察面
///
/// 总计每次从行项目重新求和，从不增量维护。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub grand_total: Decimal,
}

impl CartSnapshot {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            grand_total: Decimal::ZERO,
        }
    }

    /// 从行项目构造，重新计算总计
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let grand_total = items.iter().map(|i| i.line_total()).sum();
        Self { items, grand_total }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_line_total() {
        let item = CartItem {
            product_id: "product:1".to_string(),
            name: "Camiseta".to_string(),
            unit_price: Decimal::from_str("19.99").unwrap(),
            quantity: 3,
            image_url: String::new(),
        };
        assert_eq!(item.line_total(), Decimal::from_str("59.97").unwrap());
    }

    #[test]
    fn test_snapshot_total_is_sum_of_lines() {
        let items = vec![
            CartItem {
                product_id: "product:1".to_string(),
                name: "Camiseta".to_string(),
                unit_price: Decimal::from_str("19.99").unwrap(),
                quantity: 2,
                image_url: String::new(),
            },
            CartItem {
                product_id: "product:4".to_string(),
                name: "Gorra".to_string(),
                unit_price: Decimal::from_str("14.99").unwrap(),
                quantity: 1,
                image_url: String::new(),
            },
        ];
        let snapshot = CartSnapshot::from_items(items);
        assert_eq!(snapshot.grand_total, Decimal::from_str("54.97").unwrap());
    }
}
