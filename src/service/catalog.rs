use crate::db::queries;
use crate::error::{AppError, Operation, StorageContext};
use crate::models::{
    Categoria, Color, InventarioRow, NewProduct, NewSupplier, PrecioHistorialRow, Producto,
    Proveedor, Talla,
};
use sqlx::PgPool;

/// 目录服务：单条语句的增查操作
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<i32, AppError> {
        let id = queries::insert_product(&self.pool, product)
            .await
            .during(Operation::CreateProduct)?;
        tracing::info!("Product {} created: {}", id, product.nombre);
        Ok(id)
    }

    pub async fn list_products(&self) -> Result<Vec<Producto>, AppError> {
        queries::list_products(&self.pool)
            .await
            .during(Operation::ListProducts)
    }

    pub async fn list_categories(&self) -> Result<Vec<Categoria>, AppError> {
        queries::list_categories(&self.pool)
            .await
            .during(Operation::ListCategories)
    }

    pub async fn list_colors(&self) -> Result<Vec<Color>, AppError> {
        queries::list_colors(&self.pool)
            .await
            .during(Operation::ListColors)
    }

    pub async fn list_sizes(&self) -> Result<Vec<Talla>, AppError> {
        queries::list_sizes(&self.pool)
            .await
            .during(Operation::ListSizes)
    }

    pub async fn list_suppliers(&self) -> Result<Vec<Proveedor>, AppError> {
        queries::list_suppliers(&self.pool)
            .await
            .during(Operation::ListSuppliers)
    }

    pub async fn create_supplier(&self, supplier: &NewSupplier) -> Result<i32, AppError> {
        let id = queries::insert_supplier(&self.pool, supplier)
            .await
            .during(Operation::CreateSupplier)?;
        tracing::info!("Supplier {} created: {}", id, supplier.nombre);
        Ok(id)
    }

    pub async fn create_color(&self, nombre: &str) -> Result<i32, AppError> {
        let id = queries::insert_color(&self.pool, nombre)
            .await
            .during(Operation::CreateColor)?;
        tracing::info!("Color {} created: {}", id, nombre);
        Ok(id)
    }

    pub async fn create_size(&self, nombre: &str) -> Result<i32, AppError> {
        let id = queries::insert_size(&self.pool, nombre)
            .await
            .during(Operation::CreateSize)?;
        tracing::info!("Size {} created: {}", id, nombre);
        Ok(id)
    }

    pub async fn list_inventory(&self) -> Result<Vec<InventarioRow>, AppError> {
        queries::list_inventory(&self.pool)
            .await
            .during(Operation::ListInventory)
    }

    pub async fn list_price_history(
        &self,
        product_id: i32,
    ) -> Result<Vec<PrecioHistorialRow>, AppError> {
        queries::list_price_history(&self.pool, product_id)
            .await
            .during(Operation::ListPriceHistory)
    }
}
