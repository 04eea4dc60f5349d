use crate::error::AppError;
use crate::models::{
    IntakeCommand, InventoryKey, NewProduct, NewSupplier, WithdrawalCommand,
};
use crate::service::{CatalogService, InventoryService};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Json, Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

/// 请求体: 新建产品
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrearProductoRequest {
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub id_categoria: Option<i32>,
}

/// 请求体: 入库
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgregarProductoRequest {
    #[serde(default, deserialize_with = "number_or_text")]
    pub id_producto: Option<i32>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub id_color: Option<i32>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub id_talla: Option<i32>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub cantidad: Option<i32>,
    pub precio_compra: Option<BigDecimal>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub id_proveedor: Option<i32>,
}

/// 请求体: 出库
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuitarProductoRequest {
    #[serde(default, deserialize_with = "number_or_text")]
    pub id_producto: Option<i32>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub id_color: Option<i32>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub id_talla: Option<i32>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub cantidad: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CrearProveedorRequest {
    pub nombre: Option<String>,
    pub telefono: Option<String>,
}

/// 请求体: 新建颜色或尺码
#[derive(Debug, Deserialize)]
pub struct NombreRequest {
    pub nombre: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeResponse {
    pub message: String,
    pub id_movimiento: i32,
}

#[derive(Debug, Serialize)]
pub struct MensajeResponse {
    pub mensaje: String,
}

/// 数字字段同时接受 JSON 数字和数字字符串 ("7")；空字符串视为缺失
fn number_or_text<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(i32),
        Text(String),
    }

    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<i32>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("valor numérico inválido: {:?}", text)))
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn positive(value: Option<i32>) -> Option<i32> {
    value.filter(|v| *v > 0)
}

impl CrearProductoRequest {
    pub fn validate(self) -> Result<NewProduct, AppError> {
        match (non_empty(self.nombre), positive(self.id_categoria)) {
            (Some(nombre), Some(id_categoria)) => Ok(NewProduct {
                nombre,
                id_categoria,
            }),
            _ => Err(AppError::validation(
                "El nombre y la categoría son necesarios",
            )),
        }
    }
}

impl AgregarProductoRequest {
    /// 供应商必填；产品和正数数量同样必填，颜色/尺码/进货价可为空
    pub fn validate(self) -> Result<IntakeCommand, AppError> {
        let supplier_id = positive(self.id_proveedor)
            .ok_or_else(|| AppError::validation("El proveedor es obligatorio"))?;
        let product_id = positive(self.id_producto)
            .ok_or_else(|| AppError::validation("El producto es obligatorio"))?;
        let quantity = positive(self.cantidad)
            .ok_or_else(|| AppError::validation("La cantidad debe ser mayor que cero"))?;

        Ok(IntakeCommand {
            key: InventoryKey {
                product_id,
                color_id: self.id_color,
                size_id: self.id_talla,
            },
            quantity,
            purchase_price: self.precio_compra,
            supplier_id,
        })
    }
}

impl QuitarProductoRequest {
    pub fn validate(self) -> Result<WithdrawalCommand, AppError> {
        let product_id = positive(self.id_producto)
            .ok_or_else(|| AppError::validation("El producto es obligatorio"))?;
        let quantity = positive(self.cantidad)
            .ok_or_else(|| AppError::validation("La cantidad debe ser mayor que cero"))?;

        Ok(WithdrawalCommand {
            key: InventoryKey {
                product_id,
                color_id: self.id_color,
                size_id: self.id_talla,
            },
            quantity,
        })
    }
}

impl CrearProveedorRequest {
    pub fn validate(self) -> Result<NewSupplier, AppError> {
        match (non_empty(self.nombre), non_empty(self.telefono)) {
            (Some(nombre), Some(telefono)) => Ok(NewSupplier { nombre, telefono }),
            _ => Err(AppError::validation("Todos los campos son necesarios")),
        }
    }
}

impl NombreRequest {
    pub fn validate(self) -> Result<String, AppError> {
        non_empty(self.nombre).ok_or_else(|| AppError::validation("El nombre es obligatorio"))
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn crear_producto(
    State(catalog): State<Arc<CatalogService>>,
    payload: Result<Json<CrearProductoRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;
    let product = req.validate()?;
    let id = catalog.create_product(&product).await?;

    let response = CreatedResponse {
        message: "Producto agregado exitosamente".to_string(),
        id,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

pub async fn listar_productos(
    State(catalog): State<Arc<CatalogService>>,
) -> Result<Response, AppError> {
    Ok(Json(catalog.list_products().await?).into_response())
}

pub async fn listar_categorias(
    State(catalog): State<Arc<CatalogService>>,
) -> Result<Response, AppError> {
    Ok(Json(catalog.list_categories().await?).into_response())
}

pub async fn listar_colores(
    State(catalog): State<Arc<CatalogService>>,
) -> Result<Response, AppError> {
    Ok(Json(catalog.list_colors().await?).into_response())
}

pub async fn listar_tallas(
    State(catalog): State<Arc<CatalogService>>,
) -> Result<Response, AppError> {
    Ok(Json(catalog.list_sizes().await?).into_response())
}

pub async fn listar_proveedores(
    State(catalog): State<Arc<CatalogService>>,
) -> Result<Response, AppError> {
    Ok(Json(catalog.list_suppliers().await?).into_response())
}

pub async fn crear_proveedor(
    State(catalog): State<Arc<CatalogService>>,
    payload: Result<Json<CrearProveedorRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;
    let supplier = req.validate()?;
    let id = catalog.create_supplier(&supplier).await?;

    let response = CreatedResponse {
        message: "Proveedor agregado exitosamente".to_string(),
        id,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

pub async fn crear_color(
    State(catalog): State<Arc<CatalogService>>,
    payload: Result<Json<NombreRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;
    let nombre = req.validate()?;
    catalog.create_color(&nombre).await?;

    let response = MensajeResponse {
        mensaje: "Color agregado exitosamente".to_string(),
    };
    Ok(Json(response).into_response())
}

pub async fn crear_talla(
    State(catalog): State<Arc<CatalogService>>,
    payload: Result<Json<NombreRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;
    let nombre = req.validate()?;
    catalog.create_size(&nombre).await?;

    let response = MensajeResponse {
        mensaje: "Talla agregada exitosamente".to_string(),
    };
    Ok(Json(response).into_response())
}

pub async fn listar_inventario(
    State(catalog): State<Arc<CatalogService>>,
) -> Result<Response, AppError> {
    Ok(Json(catalog.list_inventory().await?).into_response())
}

pub async fn historial_precios(
    State(catalog): State<Arc<CatalogService>>,
    producto_id: Result<Path<i32>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(producto_id) = producto_id?;
    Ok(Json(catalog.list_price_history(producto_id).await?).into_response())
}

/// 入库接口：四步写入在同一事务内完成
pub async fn agregar_producto(
    State(inventory): State<Arc<InventoryService>>,
    payload: Result<Json<AgregarProductoRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;
    let cmd = req.validate()?;
    let receipt = inventory.record_intake(&cmd).await?;

    let response = IntakeResponse {
        message: "Producto agregado al inventario, asociado con el proveedor, y actualizado en el historial de precios exitosamente".to_string(),
        id_movimiento: receipt.movement_id,
    };
    Ok(Json(response).into_response())
}

/// 出库接口
pub async fn quitar_producto(
    State(inventory): State<Arc<InventoryService>>,
    payload: Result<Json<QuitarProductoRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;
    let cmd = req.validate()?;
    inventory.record_withdrawal(&cmd).await?;

    let response = MessageResponse {
        message: "Producto quitado del inventario exitosamente".to_string(),
    };
    Ok(Json(response).into_response())
}
