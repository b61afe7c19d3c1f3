//! Cart state store
//!
//! 每个已认证用户一个购物车，由 store 独占持有。
//! 所有变更都经过 DashMap 条目的写锁 (单写者纪律)，
//! 成功变更后同步向 watch 订阅者发布新快照。

use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::watch;

use super::model::{CartError, CartItem, CartSnapshot};

struct CartEntry {
    items: Vec<CartItem>,
    tx: watch::Sender<CartSnapshot>,
}

impl CartEntry {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(CartSnapshot::empty());
        Self {
            items: Vec::new(),
            tx,
        }
    }

    fn publish(&self) -> CartSnapshot {
        let snapshot = CartSnapshot::from_items(self.items.clone());
        self.tx.send_replace(snapshot.clone());
        snapshot
    }
}

/// 购物车状态 store (按用户 ID 键控)
#[derive(Clone)]
pub struct CartStore {
    carts: Arc<DashMap<String, CartEntry>>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    pub fn new() -> Self {
        Self {
            carts: Arc::new(DashMap::new()),
        }
    }

    /// 累加或插入行项目
    ///
    /// 同一商品已存在时仅累加数量，名称/单价保持首次加入时的快照。
    /// `quantity_delta == 0` 拒绝，购物车不变。
    pub fn add(
        &self,
        user_id: &str,
        product_id: &str,
        name: &str,
        unit_price: Decimal,
        image_url: &str,
        quantity_delta: u32,
    ) -> Result<CartSnapshot, CartError> {
        if quantity_delta == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let mut entry = self
            .carts
            .entry(user_id.to_string())
            .or_insert_with(CartEntry::new);

        match entry.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => item.quantity += quantity_delta,
            None => entry.items.push(CartItem {
                product_id: product_id.to_string(),
                name: name.to_string(),
                unit_price,
                quantity: quantity_delta,
                image_url: image_url.to_string(),
            }),
        }

        Ok(entry.publish())
    }

    /// 覆盖行项目数量
    ///
    /// `quantity == 0` 等价于移除；商品不在购物车中时为无操作。
    pub fn set_quantity(&self, user_id: &str, product_id: &str, quantity: u32) -> CartSnapshot {
        let mut entry = self
            .carts
            .entry(user_id.to_string())
            .or_insert_with(CartEntry::new);

        if quantity == 0 {
            entry.items.retain(|i| i.product_id != product_id);
        } else if let Some(item) = entry.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
        }

        entry.publish()
    }

    /// 移除行项目 (幂等)
    pub fn remove(&self, user_id: &str, product_id: &str) -> CartSnapshot {
        let mut entry = self
            .carts
            .entry(user_id.to_string())
            .or_insert_with(CartEntry::new);

        entry.items.retain(|i| i.product_id != product_id);
        entry.publish()
    }

    /// 清空购物车 (结算)
    pub fn clear(&self, user_id: &str) -> CartSnapshot {
        let mut entry = self
            .carts
            .entry(user_id.to_string())
            .or_insert_with(CartEntry::new);

        entry.items.clear();
        entry.publish()
    }

    /// 当前快照 (无购物车时返回空快照)
    pub fn snapshot(&self, user_id: &str) -> CartSnapshot {
        match self.carts.get(user_id) {
            Some(entry) => CartSnapshot::from_items(entry.items.clone()),
            None => CartSnapshot::empty(),
        }
    }

    /// 订阅购物车快照变更
    pub fn subscribe(&self, user_id: &str) -> watch::Receiver<CartSnapshot> {
        self.carts
            .entry(user_id.to_string())
            .or_insert_with(CartEntry::new)
            .tx
            .subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::str::FromStr;

    const USER: &str = "user:ana";

    fn price(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_add_accumulates_by_product_id() {
        let store = CartStore::new();
        store
            .add(USER, "product:1", "Camiseta", price("19.99"), "", 1)
            .unwrap();
        let snapshot = store
            .add(USER, "product:1", "Camiseta", price("19.99"), "", 2)
            .unwrap();

        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].quantity, 3);
        assert_eq!(snapshot.grand_total, price("59.97"));
    }

    #[test]
    fn test_add_zero_delta_rejected_and_cart_unchanged() {
        let store = CartStore::new();
        store
            .add(USER, "product:1", "Camiseta", price("19.99"), "", 1)
            .unwrap();

        let err = store
            .add(USER, "product:1", "Camiseta", price("19.99"), "", 0)
            .unwrap_err();
        assert_eq!(err, CartError::InvalidQuantity);
        assert_eq!(store.snapshot(USER).items[0].quantity, 1);
    }

    #[test]
    fn test_price_snapshot_not_live_linked() {
        let store = CartStore::new();
        store
            .add(USER, "product:1", "Camiseta", price("19.99"), "", 1)
            .unwrap();

        // 之后以新价加入同一商品，保持首次快照价
        let snapshot = store
            .add(USER, "product:1", "Camiseta Pro", price("29.99"), "", 1)
            .unwrap();
        assert_eq!(snapshot.items[0].unit_price, price("19.99"));
        assert_eq!(snapshot.items[0].name, "Camiseta");
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let store = CartStore::new();
        store
            .add(USER, "product:1", "Camiseta", price("19.99"), "", 2)
            .unwrap();

        let snapshot = store.set_quantity(USER, "product:1", 0);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.grand_total, Decimal::ZERO);
    }

    #[test]
    fn test_set_quantity_absent_is_noop() {
        let store = CartStore::new();
        store
            .add(USER, "product:1", "Camiseta", price("19.99"), "", 1)
            .unwrap();

        let snapshot = store.set_quantity(USER, "product:999", 5);
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].quantity, 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = CartStore::new();
        store
            .add(USER, "product:1", "Camiseta", price("19.99"), "", 1)
            .unwrap();

        store.remove(USER, "product:1");
        let snapshot = store.remove(USER, "product:1");
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let store = CartStore::new();
        store
            .add(USER, "product:2", "Pantalón", price("39.99"), "", 1)
            .unwrap();
        store
            .add(USER, "product:1", "Camiseta", price("19.99"), "", 1)
            .unwrap();
        store
            .add(USER, "product:2", "Pantalón", price("39.99"), "", 1)
            .unwrap();

        let snapshot = store.snapshot(USER);
        let ids: Vec<&str> = snapshot.items.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["product:2", "product:1"]);
    }

    #[test]
    fn test_carts_isolated_per_user() {
        let store = CartStore::new();
        store
            .add("user:ana", "product:1", "Camiseta", price("19.99"), "", 1)
            .unwrap();
        store
            .add("user:luis", "product:2", "Pantalón", price("39.99"), "", 2)
            .unwrap();

        assert_eq!(store.snapshot("user:ana").items.len(), 1);
        assert_eq!(store.snapshot("user:luis").items[0].quantity, 2);
    }

    #[test]
    fn test_subscriber_sees_each_mutation() {
        let store = CartStore::new();
        let rx = store.subscribe(USER);

        store
            .add(USER, "product:1", "Camiseta", price("19.99"), "", 2)
            .unwrap();
        assert_eq!(rx.borrow().grand_total, price("39.98"));

        store.clear(USER);
        assert_eq!(rx.borrow().grand_total, Decimal::ZERO);
    }

    #[test]
    fn test_grand_total_matches_recomputed_sum_randomized() {
        let mut rng = rand::thread_rng();
        let store = CartStore::new();

        for round in 0..200 {
            let product = format!("product:{}", rng.gen_range(0..10));
            let cents: i64 = rng.gen_range(1..10_000);
            let unit_price = Decimal::new(cents, 2);

            match rng.gen_range(0..4) {
                0 => {
                    let _ = store.add(
                        USER,
                        &product,
                        "P",
                        unit_price,
                        "",
                        rng.gen_range(0..4),
                    );
                }
                1 => {
                    store.set_quantity(USER, &product, rng.gen_range(0..5));
                }
                2 => {
                    store.remove(USER, &product);
                }
                _ => {
                    if round % 37 == 0 {
                        store.clear(USER);
                    }
                }
            }

            let snapshot = store.snapshot(USER);
            let expected: Decimal = snapshot.items.iter().map(|i| i.line_total()).sum();
            assert_eq!(snapshot.grand_total, expected);
            assert!(snapshot.items.iter().all(|i| i.quantity > 0));
        }
    }
}
