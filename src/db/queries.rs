use crate::models::{
    Categoria, Color, InventarioRow, NewProduct, NewSupplier, PrecioHistorialRow, Producto,
    Proveedor, Talla,
};
use sqlx::PgPool;

/// 新增产品，返回生成的 id
pub async fn insert_product(pool: &PgPool, product: &NewProduct) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO Producto (nombre, id_categoria)
        VALUES ($1, $2)
        RETURNING id_producto
        "#,
    )
    .bind(&product.nombre)
    .bind(product.id_categoria)
    .fetch_one(pool)
    .await
}

pub async fn list_products(pool: &PgPool) -> Result<Vec<Producto>, sqlx::Error> {
    sqlx::query_as::<_, Producto>(
        r#"
        SELECT id_producto, nombre, id_categoria
        FROM Producto
        ORDER BY id_producto
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn list_categories(pool: &PgPool) -> Result<Vec<Categoria>, sqlx::Error> {
    sqlx::query_as::<_, Categoria>("SELECT id_categoria, nombre FROM Categoria ORDER BY id_categoria")
        .fetch_all(pool)
        .await
}

pub async fn list_colors(pool: &PgPool) -> Result<Vec<Color>, sqlx::Error> {
    sqlx::query_as::<_, Color>("SELECT id_color, nombre FROM Color ORDER BY id_color")
        .fetch_all(pool)
        .await
}

pub async fn list_sizes(pool: &PgPool) -> Result<Vec<Talla>, sqlx::Error> {
    sqlx::query_as::<_, Talla>("SELECT id_talla, nombre FROM Talla ORDER BY id_talla")
        .fetch_all(pool)
        .await
}

pub async fn list_suppliers(pool: &PgPool) -> Result<Vec<Proveedor>, sqlx::Error> {
    sqlx::query_as::<_, Proveedor>(
        "SELECT id_proveedor, nombre, telefono FROM Proveedor ORDER BY id_proveedor",
    )
    .fetch_all(pool)
    .await
}

/// 新增供应商，返回生成的 id
pub async fn insert_supplier(pool: &PgPool, supplier: &NewSupplier) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO Proveedor (nombre, telefono)
        VALUES ($1, $2)
        RETURNING id_proveedor
        "#,
    )
    .bind(&supplier.nombre)
    .bind(&supplier.telefono)
    .fetch_one(pool)
    .await
}

pub async fn insert_color(pool: &PgPool, nombre: &str) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>("INSERT INTO Color (nombre) VALUES ($1) RETURNING id_color")
        .bind(nombre)
        .fetch_one(pool)
        .await
}

pub async fn insert_size(pool: &PgPool, nombre: &str) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>("INSERT INTO Talla (nombre) VALUES ($1) RETURNING id_talla")
        .bind(nombre)
        .fetch_one(pool)
        .await
}

/// 库存视图：缺失的颜色/尺码显示为 'Sin color' / 'Sin talla'
pub async fn list_inventory(pool: &PgPool) -> Result<Vec<InventarioRow>, sqlx::Error> {
    sqlx::query_as::<_, InventarioRow>(
        r#"
        SELECT i.id_producto,
               p.nombre AS producto,
               COALESCE(c.nombre, 'Sin color') AS color,
               COALESCE(t.nombre, 'Sin talla') AS talla,
               i.cantidad
        FROM Inventario i
        INNER JOIN Producto p ON i.id_producto = p.id_producto
        LEFT JOIN Color c ON i.id_color = c.id_color
        LEFT JOIN Talla t ON i.id_talla = t.id_talla
        ORDER BY i.id_producto, i.id_inventario
        "#,
    )
    .fetch_all(pool)
    .await
}

/// 产品的进货价格历史 (仅 'Ingreso' 类型变动，按时间倒序)
pub async fn list_price_history(
    pool: &PgPool,
    product_id: i32,
) -> Result<Vec<PrecioHistorialRow>, sqlx::Error> {
    sqlx::query_as::<_, PrecioHistorialRow>(
        r#"
        SELECT m.precio_compra, m.fecha, p.nombre
        FROM Movimiento_Producto m
        JOIN Producto p ON m.id_producto = p.id_producto
        WHERE m.id_producto = $1
          AND m.tipo_movimiento = 'Ingreso'
        ORDER BY m.fecha DESC, m.id_movimiento DESC
        "#,
    )
    .bind(product_id)
    .fetch_all(pool)
    .await
}
