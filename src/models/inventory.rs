use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 库存变动类型，数据库中以 'Ingreso' / 'Salida' 存储
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementType {
    #[serde(rename = "Ingreso")]
    Intake,
    #[serde(rename = "Salida")]
    Withdrawal,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Intake => "Ingreso",
            MovementType::Withdrawal => "Salida",
        }
    }
}

/// 库存键: (产品, 颜色, 尺码)；颜色和尺码可为空
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InventoryKey {
    pub product_id: i32,
    pub color_id: Option<i32>,
    pub size_id: Option<i32>,
}

/// 入库命令 (已校验)
#[derive(Debug, Clone)]
pub struct IntakeCommand {
    pub key: InventoryKey,
    pub quantity: i32,
    pub purchase_price: Option<BigDecimal>,
    pub supplier_id: i32,
}

/// 出库命令 (已校验)
#[derive(Debug, Clone)]
pub struct WithdrawalCommand {
    pub key: InventoryKey,
    pub quantity: i32,
}

/// 入库结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeReceipt {
    pub movement_id: i32,
    /// 入库后的库存数量
    pub quantity_on_hand: i32,
}

/// 出库结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalReceipt {
    pub movement_id: i32,
    pub quantity_on_hand: i32,
}

/// 库存视图行 (GET /api/inventario)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventarioRow {
    pub id_producto: i32,
    pub producto: String,
    pub color: String,
    pub talla: String,
    pub cantidad: i32,
}

/// 价格历史行 (GET /api/historial-precios/:productoId)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecioHistorialRow {
    pub precio_compra: Option<BigDecimal>,
    pub fecha: DateTime<Utc>,
    pub nombre: String,
}
