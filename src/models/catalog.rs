use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 产品 (Producto)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Producto {
    pub id_producto: i32,
    pub nombre: String,
    pub id_categoria: i32,
}

/// 分类 (Categoria)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categoria {
    pub id_categoria: i32,
    pub nombre: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub id_color: i32,
    pub nombre: String,
}

/// 尺码 (Talla)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Talla {
    pub id_talla: i32,
    pub nombre: String,
}

/// 供应商 (Proveedor)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proveedor {
    pub id_proveedor: i32,
    pub nombre: String,
    pub telefono: String,
}

/// 新建产品 (已校验)
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub nombre: String,
    pub id_categoria: i32,
}

/// 新建供应商 (已校验)
#[derive(Debug, Clone)]
pub struct NewSupplier {
    pub nombre: String,
    pub telefono: String,
}
