//! 嵌入式数据库落盘测试 (RocksDB 后端)

use rust_decimal::Decimal;
use tienda_server::db::DbService;
use tienda_server::db::models::ProductCreate;
use tienda_server::db::repository::ProductRepository;

#[tokio::test]
async fn test_products_survive_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("tienda.db");
    let db_path_str = db_path.to_string_lossy().to_string();

    let id = {
        let service = DbService::new(&db_path_str).await.unwrap();
        let repo = ProductRepository::new(service.db.clone());
        let created = repo
            .create(ProductCreate {
                name: "Camiseta".to_string(),
                price: Decimal::new(1999, 2),
                stock: 10,
                category: None,
                image_url: None,
                description: None,
            })
            .await
            .unwrap();
        created.id_string()
        // service 在此析构，释放 RocksDB 锁
    };

    let reopened = DbService::new(&db_path_str).await.unwrap();
    let repo = ProductRepository::new(reopened.db.clone());

    let stored = repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Camiseta");
    assert_eq!(stored.stock, 10);
    assert_eq!(stored.price, Decimal::new(1999, 2));
}
