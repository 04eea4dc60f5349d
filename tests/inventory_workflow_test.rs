//! PostgreSQL integration tests for the intake/withdrawal workflows.
//!
//! Ignored by default because they need a real database:
//! `TEST_DATABASE_URL=postgres://localhost/inventario_test cargo test -- --ignored`

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use bigdecimal::BigDecimal;
use inventario_api::models::{
    IntakeCommand, InventoryKey, NewProduct, NewSupplier, WithdrawalCommand,
};
use inventario_api::{build_router, AppConfig, AppError, CatalogService, InventoryService, Operation};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const SCHEMA: &str = include_str!("../schema.sql");

struct Fixture {
    pool: PgPool,
    catalog: CatalogService,
    inventory: Arc<InventoryService>,
    product_id: i32,
    color_id: i32,
    size_id: i32,
    supplier_id: i32,
}

fn database_url() -> String {
    std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/inventario_test".to_string())
}

/// 加锁执行建表脚本，避免并行测试同时建表
async fn ensure_schema(url: &str) {
    let mut conn = PgConnection::connect(url).await.expect("connect");
    conn.execute("SELECT pg_advisory_lock(727274)").await.expect("lock");
    conn.execute(SCHEMA).await.expect("apply schema");
    conn.execute("SELECT pg_advisory_unlock(727274)").await.expect("unlock");
    conn.close().await.expect("close");
}

/// 每个测试使用独立的产品/颜色/尺码/供应商，互不干扰
async fn fixture() -> Fixture {
    let url = database_url();
    ensure_schema(&url).await;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&url)
        .await
        .expect("pool");

    let category_id: i32 =
        sqlx::query_scalar("INSERT INTO Categoria (nombre) VALUES ('Ropa') RETURNING id_categoria")
            .fetch_one(&pool)
            .await
            .expect("category");

    let catalog = CatalogService::new(pool.clone());
    let product_id = catalog
        .create_product(&NewProduct {
            nombre: "Camiseta básica".to_string(),
            id_categoria: category_id,
        })
        .await
        .expect("product");
    let color_id = catalog.create_color("Azul").await.expect("color");
    let size_id = catalog.create_size("M").await.expect("size");
    let supplier_id = catalog
        .create_supplier(&NewSupplier {
            nombre: "Textiles del Norte".to_string(),
            telefono: "555-0101".to_string(),
        })
        .await
        .expect("supplier");

    let inventory = Arc::new(InventoryService::new(pool.clone(), Duration::from_secs(30)));

    Fixture {
        pool,
        catalog,
        inventory,
        product_id,
        color_id,
        size_id,
        supplier_id,
    }
}

impl Fixture {
    fn key(&self) -> InventoryKey {
        InventoryKey {
            product_id: self.product_id,
            color_id: Some(self.color_id),
            size_id: Some(self.size_id),
        }
    }

    fn intake(&self, quantity: i32, price: &str) -> IntakeCommand {
        IntakeCommand {
            key: self.key(),
            quantity,
            purchase_price: Some(BigDecimal::from_str(price).unwrap()),
            supplier_id: self.supplier_id,
        }
    }

    async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE id_producto = $1",
            table
        ))
        .bind(self.product_id)
        .fetch_one(&self.pool)
        .await
        .expect("count")
    }

    async fn quantity(&self) -> Option<i32> {
        sqlx::query_scalar(
            "SELECT cantidad FROM Inventario WHERE id_producto = $1 AND id_color = $2 AND id_talla = $3",
        )
        .bind(self.product_id)
        .bind(self.color_id)
        .bind(self.size_id)
        .fetch_optional(&self.pool)
        .await
        .expect("quantity")
    }
}

#[tokio::test]
#[ignore]
async fn intake_writes_one_row_per_table() {
    let fx = fixture().await;

    let receipt = fx.inventory.record_intake(&fx.intake(10, "5.0")).await.unwrap();
    assert_eq!(receipt.quantity_on_hand, 10);

    assert_eq!(fx.count("Movimiento_Producto").await, 1);
    assert_eq!(fx.count("Inventario").await, 1);
    assert_eq!(fx.count("Producto_Proveedor").await, 1);
    assert_eq!(fx.count("Historial_Precios").await, 1);

    let (tipo, cantidad, precio): (String, i32, Option<BigDecimal>) = sqlx::query_as(
        "SELECT tipo_movimiento, cantidad, precio_compra FROM Movimiento_Producto WHERE id_movimiento = $1",
    )
    .bind(receipt.movement_id)
    .fetch_one(&fx.pool)
    .await
    .unwrap();
    assert_eq!(tipo, "Ingreso");
    assert_eq!(cantidad, 10);
    assert_eq!(precio, Some(BigDecimal::from_str("5.0").unwrap()));

    let (precio, proveedor): (Option<BigDecimal>, i32) = sqlx::query_as(
        "SELECT precio, id_proveedor FROM Historial_Precios WHERE id_producto = $1",
    )
    .bind(fx.product_id)
    .fetch_one(&fx.pool)
    .await
    .unwrap();
    assert_eq!(precio, Some(BigDecimal::from_str("5").unwrap()));
    assert_eq!(proveedor, fx.supplier_id);
}

#[tokio::test]
#[ignore]
async fn repeated_intakes_accumulate_and_keep_price_history() {
    let fx = fixture().await;

    fx.inventory.record_intake(&fx.intake(10, "5.0")).await.unwrap();
    let second = fx.inventory.record_intake(&fx.intake(5, "5.5")).await.unwrap();

    assert_eq!(second.quantity_on_hand, 15);
    assert_eq!(fx.quantity().await, Some(15));
    assert_eq!(fx.count("Inventario").await, 1);
    assert_eq!(fx.count("Historial_Precios").await, 2);

    // 按时间倒序
    let history = fx.catalog.list_price_history(fx.product_id).await.unwrap();
    let prices: Vec<_> = history.iter().map(|h| h.precio_compra.clone()).collect();
    assert_eq!(
        prices,
        vec![
            Some(BigDecimal::from_str("5.5").unwrap()),
            Some(BigDecimal::from_str("5.0").unwrap()),
        ]
    );
    assert!(history[0].fecha >= history[1].fecha);
    assert_eq!(history[0].nombre, "Camiseta básica");
}

#[tokio::test]
#[ignore]
async fn withdrawal_decrements_exact_amount() {
    let fx = fixture().await;
    fx.inventory.record_intake(&fx.intake(10, "5.0")).await.unwrap();

    let receipt = fx
        .inventory
        .record_withdrawal(&WithdrawalCommand {
            key: fx.key(),
            quantity: 4,
        })
        .await
        .unwrap();

    assert_eq!(receipt.quantity_on_hand, 6);
    assert_eq!(fx.quantity().await, Some(6));
    assert_eq!(fx.count("Movimiento_Producto").await, 2);

    // 出库不出现在价格历史中
    let history = fx.catalog.list_price_history(fx.product_id).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
#[ignore]
async fn withdrawal_beyond_stock_is_rejected_and_rolled_back() {
    let fx = fixture().await;
    fx.inventory.record_intake(&fx.intake(3, "5.0")).await.unwrap();

    let err = fx
        .inventory
        .record_withdrawal(&WithdrawalCommand {
            key: fx.key(),
            quantity: 5,
        })
        .await
        .unwrap_err();

    match err {
        AppError::InsufficientStock {
            requested,
            available,
            ..
        } => {
            assert_eq!(requested, 5);
            assert_eq!(available, 3);
        }
        other => panic!("expected InsufficientStock, got {:?}", other),
    }
    assert_eq!(fx.quantity().await, Some(3));
    assert_eq!(fx.count("Movimiento_Producto").await, 1);
}

#[tokio::test]
#[ignore]
async fn withdrawal_without_inventory_row_is_insufficient_stock() {
    let fx = fixture().await;

    let err = fx
        .inventory
        .record_withdrawal(&WithdrawalCommand {
            key: fx.key(),
            quantity: 1,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock { available: 0, .. }));
    assert_eq!(fx.count("Movimiento_Producto").await, 0);
}

#[tokio::test]
#[ignore]
async fn failing_supplier_link_rolls_back_earlier_steps() {
    let fx = fixture().await;
    let mut cmd = fx.intake(10, "5.0");
    cmd.supplier_id = i32::MAX;

    let err = fx.inventory.record_intake(&cmd).await.unwrap_err();
    match err {
        AppError::Storage { operation, .. } => assert_eq!(operation, Operation::LinkSupplier),
        other => panic!("expected storage error, got {:?}", other),
    }

    assert_eq!(fx.count("Movimiento_Producto").await, 0);
    assert_eq!(fx.count("Inventario").await, 0);
    assert_eq!(fx.count("Producto_Proveedor").await, 0);
    assert_eq!(fx.count("Historial_Precios").await, 0);
}

#[tokio::test]
#[ignore]
async fn concurrent_intakes_do_not_lose_updates() {
    let fx = fixture().await;

    let tasks: Vec<_> = (1..=20)
        .map(|quantity| {
            let inventory = fx.inventory.clone();
            let cmd = fx.intake(quantity, "4.25");
            tokio::spawn(async move { inventory.record_intake(&cmd).await })
        })
        .collect();

    for result in futures::future::join_all(tasks).await {
        result.expect("task panicked").expect("intake failed");
    }

    assert_eq!(fx.quantity().await, Some((1..=20).sum()));
    assert_eq!(fx.count("Movimiento_Producto").await, 20);
    assert_eq!(fx.count("Inventario").await, 1);
}

#[tokio::test]
#[ignore]
async fn concurrent_withdrawals_never_oversell() {
    let fx = fixture().await;
    fx.inventory.record_intake(&fx.intake(10, "5.0")).await.unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let inventory = fx.inventory.clone();
            let cmd = WithdrawalCommand {
                key: fx.key(),
                quantity: 3,
            };
            tokio::spawn(async move { inventory.record_withdrawal(&cmd).await })
        })
        .collect();

    let mut succeeded = 0i64;
    let mut insufficient = 0;
    for result in futures::future::join_all(tasks).await {
        match result.expect("task panicked") {
            Ok(_) => succeeded += 1,
            Err(AppError::InsufficientStock { .. }) => insufficient += 1,
            Err(other) => panic!("unexpected withdrawal error: {:?}", other),
        }
    }

    let remaining = fx.quantity().await.expect("inventory row");
    assert!(remaining >= 0);
    assert_eq!(succeeded, 3);
    assert_eq!(insufficient, 5);
    assert_eq!(succeeded * 3 + i64::from(remaining), 10);

    let salidas: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM Movimiento_Producto WHERE id_producto = $1 AND tipo_movimiento = 'Salida'",
    )
    .bind(fx.product_id)
    .fetch_one(&fx.pool)
    .await
    .unwrap();
    assert_eq!(salidas, succeeded);
}

#[tokio::test]
#[ignore]
async fn stalled_intake_times_out_and_rolls_back() {
    let fx = fixture().await;
    fx.inventory.record_intake(&fx.intake(1, "5.0")).await.unwrap();

    // 另一个事务锁住库存行，使入库流程在第 2 步阻塞
    let mut blocker = fx.pool.begin().await.unwrap();
    let _: i32 = sqlx::query_scalar(
        "SELECT cantidad FROM Inventario WHERE id_producto = $1 AND id_color = $2 AND id_talla = $3 FOR UPDATE",
    )
    .bind(fx.product_id)
    .bind(fx.color_id)
    .bind(fx.size_id)
    .fetch_one(&mut *blocker)
    .await
    .unwrap();

    let impatient = InventoryService::new(fx.pool.clone(), Duration::from_secs(1));
    let err = impatient
        .record_intake(&fx.intake(5, "6.0"))
        .await
        .unwrap_err();
    match err {
        AppError::Timeout { operation } => assert_eq!(operation, Operation::RecordIntake),
        other => panic!("expected timeout, got {:?}", other),
    }

    blocker.rollback().await.unwrap();

    assert_eq!(fx.quantity().await, Some(1));
    assert_eq!(fx.count("Movimiento_Producto").await, 1);
    assert_eq!(fx.count("Historial_Precios").await, 1);

    // 连接池仍可用
    let receipt = fx.inventory.record_intake(&fx.intake(2, "5.0")).await.unwrap();
    assert_eq!(receipt.quantity_on_hand, 3);
}

#[tokio::test]
#[ignore]
async fn inventory_view_uses_placeholders_for_missing_dimensions() {
    let fx = fixture().await;
    let cmd = IntakeCommand {
        key: InventoryKey {
            product_id: fx.product_id,
            color_id: None,
            size_id: None,
        },
        quantity: 2,
        purchase_price: None,
        supplier_id: fx.supplier_id,
    };

    fx.inventory.record_intake(&cmd).await.unwrap();
    fx.inventory.record_intake(&cmd).await.unwrap();

    let rows = fx.catalog.list_inventory().await.unwrap();
    let row = rows
        .iter()
        .find(|r| r.id_producto == fx.product_id)
        .expect("inventory row");
    assert_eq!(row.color, "Sin color");
    assert_eq!(row.talla, "Sin talla");
    assert_eq!(row.cantidad, 4);
    assert_eq!(rows.iter().filter(|r| r.id_producto == fx.product_id).count(), 1);
}

#[tokio::test]
#[ignore]
async fn http_intake_without_supplier_writes_nothing() {
    let fx = fixture().await;
    let app = build_router(fx.pool.clone(), &AppConfig::default());

    let body = json!({
        "idProducto": fx.product_id,
        "idColor": fx.color_id,
        "idTalla": fx.size_id,
        "cantidad": 10,
        "precioCompra": "5.0"
    });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/agregarProducto")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fx.count("Movimiento_Producto").await, 0);
    assert_eq!(fx.count("Inventario").await, 0);
    assert_eq!(fx.count("Producto_Proveedor").await, 0);
    assert_eq!(fx.count("Historial_Precios").await, 0);
}

#[tokio::test]
#[ignore]
async fn http_intake_then_withdrawal_round_trip() {
    let fx = fixture().await;
    let app = build_router(fx.pool.clone(), &AppConfig::default());

    let intake = json!({
        "idProducto": fx.product_id,
        "idColor": fx.color_id,
        "idTalla": fx.size_id,
        "cantidad": 8,
        "precioCompra": "12.50",
        "idProveedor": fx.supplier_id
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/agregarProducto")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&intake).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let withdrawal = json!({
        "idProducto": fx.product_id,
        "idColor": fx.color_id,
        "idTalla": fx.size_id,
        "cantidad": 20
    });
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/quitarProducto")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&withdrawal).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(fx.quantity().await, Some(8));
}
