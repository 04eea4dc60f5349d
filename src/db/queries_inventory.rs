//! 库存流程中的单条语句。
//! 所有函数接收 `&mut PgConnection`，由调用方在同一事务内按顺序执行。

use crate::models::{InventoryKey, MovementType};
use bigdecimal::BigDecimal;
use sqlx::PgConnection;

/// 写入一条库存变动记录，返回变动 id
pub async fn insert_movement(
    conn: &mut PgConnection,
    key: &InventoryKey,
    quantity: i32,
    purchase_price: Option<&BigDecimal>,
    movement_type: MovementType,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO Movimiento_Producto
            (id_producto, id_color, id_talla, cantidad, precio_compra, tipo_movimiento)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id_movimiento
        "#,
    )
    .bind(key.product_id)
    .bind(key.color_id)
    .bind(key.size_id)
    .bind(quantity)
    .bind(purchase_price.cloned())
    .bind(movement_type.as_str())
    .fetch_one(conn)
    .await
}

/// 增加库存：不存在则插入，存在则累加 (单条原子语句)，返回最新数量
pub async fn upsert_inventory(
    conn: &mut PgConnection,
    key: &InventoryKey,
    quantity: i32,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO Inventario (id_producto, id_color, id_talla, cantidad)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id_producto, (COALESCE(id_color, 0)), (COALESCE(id_talla, 0)))
        DO UPDATE SET cantidad = Inventario.cantidad + EXCLUDED.cantidad
        RETURNING cantidad
        "#,
    )
    .bind(key.product_id)
    .bind(key.color_id)
    .bind(key.size_id)
    .bind(quantity)
    .fetch_one(conn)
    .await
}

/// 扣减库存，仅当现有数量足够时生效。库存不足或记录不存在时返回 None
pub async fn decrement_inventory(
    conn: &mut PgConnection,
    key: &InventoryKey,
    quantity: i32,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE Inventario
        SET cantidad = cantidad - $4
        WHERE id_producto = $1
          AND id_color IS NOT DISTINCT FROM $2
          AND id_talla IS NOT DISTINCT FROM $3
          AND cantidad >= $4
        RETURNING cantidad
        "#,
    )
    .bind(key.product_id)
    .bind(key.color_id)
    .bind(key.size_id)
    .bind(quantity)
    .fetch_optional(conn)
    .await
}

/// 查询库存键当前数量，记录不存在时返回 None
pub async fn current_quantity(
    conn: &mut PgConnection,
    key: &InventoryKey,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"
        SELECT cantidad
        FROM Inventario
        WHERE id_producto = $1
          AND id_color IS NOT DISTINCT FROM $2
          AND id_talla IS NOT DISTINCT FROM $3
        "#,
    )
    .bind(key.product_id)
    .bind(key.color_id)
    .bind(key.size_id)
    .fetch_optional(conn)
    .await
}

/// 记录产品与供应商的关联 (允许重复)
pub async fn insert_product_supplier(
    conn: &mut PgConnection,
    product_id: i32,
    supplier_id: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO Producto_Proveedor (id_producto, id_proveedor)
        VALUES ($1, $2)
        "#,
    )
    .bind(product_id)
    .bind(supplier_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// 写入价格历史，返回记录 id
pub async fn insert_price_history(
    conn: &mut PgConnection,
    product_id: i32,
    price: Option<&BigDecimal>,
    supplier_id: i32,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO Historial_Precios (id_producto, precio, id_proveedor)
        VALUES ($1, $2, $3)
        RETURNING id_historial
        "#,
    )
    .bind(product_id)
    .bind(price.cloned())
    .bind(supplier_id)
    .fetch_one(conn)
    .await
}
