//! 购物流程端到端测试 (内存数据库, 服务层直连)

use rust_decimal::Decimal;
use tienda_server::db::DbService;
use tienda_server::db::models::ProductCreate;
use tienda_server::db::repository::{ProductRepository, UserRepository};
use tienda_server::inventory::ReserveError;
use tienda_server::{AppError, Config, ServerState};

async fn state() -> ServerState {
    let db = DbService::memory().await.expect("in-memory db").db;
    ServerState::with_db(Config::with_overrides("/tmp/tienda-test", 0), db)
}

fn payload(name: &str, cents: i64, stock: i64) -> ProductCreate {
    ProductCreate {
        name: name.to_string(),
        price: Decimal::new(cents, 2),
        stock,
        category: None,
        image_url: None,
        description: None,
    }
}

/// 加购一次：目录查视图 → 库存预留 → 视图回填 → 购物车累加
async fn add_once(
    state: &ServerState,
    user_id: &str,
    product_id: &str,
) -> Result<tienda_server::cart::CartSnapshot, ReserveError> {
    let product = state
        .catalog
        .get(product_id)
        .ok_or_else(|| ReserveError::NotFound(product_id.to_string()))?;

    let reserved = state
        .inventory
        .try_reserve(product_id, product.stock)
        .await?;

    state.catalog.apply_edit(reserved.clone());

    Ok(state
        .carts
        .add(
            user_id,
            product_id,
            &reserved.name,
            reserved.price,
            &reserved.image_url,
            1,
        )
        .expect("delta of 1 is always valid"))
}

#[tokio::test]
async fn test_add_to_cart_reserves_stock_and_totals() {
    let state = state().await;
    let repo = ProductRepository::new(state.get_db());

    let camiseta = repo.create(payload("Camiseta", 1999, 3)).await.unwrap();
    let pantalon = repo.create(payload("Pantalón", 3999, 2)).await.unwrap();
    state.catalog.load_all().await.unwrap();

    let camiseta_id = camiseta.id_string();
    let pantalon_id = pantalon.id_string();

    add_once(&state, "user:ana", &camiseta_id).await.unwrap();
    add_once(&state, "user:ana", &camiseta_id).await.unwrap();
    let snapshot = add_once(&state, "user:ana", &pantalon_id).await.unwrap();

    // 同一商品合并为一行，总额为逐行重算
    assert_eq!(snapshot.items.len(), 2);
    assert_eq!(snapshot.items[0].quantity, 2);
    assert_eq!(snapshot.grand_total, Decimal::new(7997, 2));

    // 预留会同步到目录视图和数据库
    assert_eq!(state.catalog.get(&camiseta_id).unwrap().stock, 1);
    let stored = repo.find_by_id(&camiseta_id).await.unwrap().unwrap();
    assert_eq!(stored.stock, 1);
}

#[tokio::test]
async fn test_out_of_stock_leaves_cart_unchanged() {
    let state = state().await;
    let repo = ProductRepository::new(state.get_db());

    let gorra = repo.create(payload("Gorra", 1499, 1)).await.unwrap();
    state.catalog.load_all().await.unwrap();
    let id = gorra.id_string();

    add_once(&state, "user:ana", &id).await.unwrap();

    // 视图库存已归零，第二次加购不触发数据库写入
    let err = add_once(&state, "user:ana", &id).await.unwrap_err();
    assert!(matches!(err, ReserveError::OutOfStock(_)));

    let snapshot = state.carts.snapshot("user:ana");
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].quantity, 1);

    let stored = repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.stock, 0);
}

#[tokio::test]
async fn test_checkout_clears_cart_only_for_that_user() {
    let state = state().await;
    let repo = ProductRepository::new(state.get_db());

    let camiseta = repo.create(payload("Camiseta", 1999, 5)).await.unwrap();
    state.catalog.load_all().await.unwrap();
    let id = camiseta.id_string();

    add_once(&state, "user:ana", &id).await.unwrap();
    add_once(&state, "user:luis", &id).await.unwrap();

    let cleared = state.carts.clear("user:ana");
    assert!(cleared.is_empty());
    assert_eq!(cleared.grand_total, Decimal::ZERO);

    // 其他用户的购物车不受影响
    assert_eq!(state.carts.snapshot("user:luis").items.len(), 1);
}

#[tokio::test]
async fn test_deleted_product_line_survives_in_cart() {
    let state = state().await;
    let repo = ProductRepository::new(state.get_db());

    let zapatos = repo.create(payload("Zapatos", 5999, 5)).await.unwrap();
    state.catalog.load_all().await.unwrap();
    let id = zapatos.id_string();

    add_once(&state, "user:ana", &id).await.unwrap();

    // 管理员删除商品：目录可见性消失，已有行项目保留快照价
    repo.delete(&id).await.unwrap();
    state.catalog.remove(&id);

    assert!(state.catalog.get(&id).is_none());
    let snapshot = state.carts.snapshot("user:ana");
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].unit_price, Decimal::new(5999, 2));

    // 之后的加购按不存在处理
    let err = add_once(&state, "user:ana", &id).await.unwrap_err();
    assert!(matches!(err, ReserveError::NotFound(_)));
}

#[tokio::test]
async fn test_admin_gate_follows_database_role() {
    let state = state().await;
    let users = UserRepository::new(state.get_db());

    let ana = users
        .create("ana@example.com", "Ana", None, "client")
        .await
        .unwrap();
    let ana_id = ana.id_string();

    // client 角色被拒
    let err = state.gate.ensure_admin(&ana_id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // 角色提升后立即生效 (每次请求重新查库)
    users.set_role(&ana_id, "admin").await.unwrap();
    state.gate.ensure_admin(&ana_id).await.unwrap();

    // 数据库中不存在的用户一律拒绝
    let err = state.gate.ensure_admin("user:ghost").await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}
