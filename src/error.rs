use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// 数据库操作标识，失败时用于定位出错的步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateProduct,
    ListProducts,
    ListCategories,
    ListColors,
    ListSizes,
    ListSuppliers,
    CreateSupplier,
    CreateColor,
    CreateSize,
    ListInventory,
    ListPriceHistory,
    BeginTransaction,
    CommitTransaction,
    RecordIntake,
    InsertIntakeMovement,
    IncrementInventory,
    LinkSupplier,
    InsertPriceHistory,
    RecordWithdrawal,
    InsertWithdrawalMovement,
    DecrementInventory,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateProduct => "create_product",
            Operation::ListProducts => "list_products",
            Operation::ListCategories => "list_categories",
            Operation::ListColors => "list_colors",
            Operation::ListSizes => "list_sizes",
            Operation::ListSuppliers => "list_suppliers",
            Operation::CreateSupplier => "create_supplier",
            Operation::CreateColor => "create_color",
            Operation::CreateSize => "create_size",
            Operation::ListInventory => "list_inventory",
            Operation::ListPriceHistory => "list_price_history",
            Operation::BeginTransaction => "begin_transaction",
            Operation::CommitTransaction => "commit_transaction",
            Operation::RecordIntake => "record_intake",
            Operation::InsertIntakeMovement => "insert_intake_movement",
            Operation::IncrementInventory => "increment_inventory",
            Operation::LinkSupplier => "link_supplier",
            Operation::InsertPriceHistory => "insert_price_history",
            Operation::RecordWithdrawal => "record_withdrawal",
            Operation::InsertWithdrawalMovement => "insert_withdrawal_movement",
            Operation::DecrementInventory => "decrement_inventory",
        }
    }

    /// 返回给调用方的通用错误信息 (不含数据库细节)
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::CreateProduct => "Error al agregar producto",
            Operation::ListProducts => "Error al obtener los productos",
            Operation::ListCategories => "Error al obtener las categorías",
            Operation::ListColors => "Error al obtener colores",
            Operation::ListSizes => "Error al obtener tallas",
            Operation::ListSuppliers => "Error al obtener proveedores",
            Operation::CreateSupplier => "Error al agregar proveedor",
            Operation::CreateColor => "Error al agregar el color",
            Operation::CreateSize => "Error al agregar la talla",
            Operation::ListInventory => "Error al obtener inventario",
            Operation::ListPriceHistory => "Error al obtener historial de precios",
            Operation::BeginTransaction | Operation::CommitTransaction => {
                "Error al registrar el movimiento de inventario"
            }
            Operation::RecordIntake | Operation::InsertIntakeMovement => {
                "Error al agregar producto al inventario"
            }
            Operation::IncrementInventory | Operation::DecrementInventory => {
                "Error al actualizar inventario"
            }
            Operation::LinkSupplier => "Error al asociar el proveedor con el producto",
            Operation::InsertPriceHistory => "Error al actualizar el historial de precios",
            Operation::RecordWithdrawal | Operation::InsertWithdrawalMovement => {
                "Error al quitar producto del inventario"
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 请求级错误
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error(
        "Stock insuficiente para el producto {product_id}: disponible {available}, solicitado {requested}"
    )]
    InsufficientStock {
        product_id: i32,
        requested: i32,
        available: i32,
    },

    #[error("{operation} failed: {source}")]
    Storage {
        operation: Operation,
        #[source]
        source: sqlx::Error,
    },

    #[error("{operation} timed out")]
    Timeout { operation: Operation },
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientStock { .. } => StatusCode::CONFLICT,
            AppError::Storage { .. } | AppError::Timeout { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 响应体中的信息；存储错误只返回通用文案
    pub fn response_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::InsufficientStock { .. } => self.to_string(),
            AppError::Storage { operation, .. } | AppError::Timeout { operation } => {
                operation.failure_message().to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Storage { operation, source } => {
                tracing::error!(operation = %operation, error = ?source, "database operation failed");
            }
            AppError::Timeout { operation } => {
                tracing::error!(operation = %operation, "database operation timed out");
            }
            AppError::InsufficientStock { .. } => tracing::warn!("{}", self),
            AppError::Validation(msg) => tracing::debug!("rejected request: {}", msg),
        }

        let status = self.status_code();
        (status, Json(json!({ "error": self.response_message() }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Cuerpo de la solicitud inválido: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(format!("Parámetro de ruta inválido: {}", rejection.body_text()))
    }
}

/// 为 sqlx 结果附加失败的操作标识
pub trait StorageContext<T> {
    fn during(self, operation: Operation) -> Result<T, AppError>;
}

impl<T> StorageContext<T> for Result<T, sqlx::Error> {
    fn during(self, operation: Operation) -> Result<T, AppError> {
        self.map_err(|source| AppError::Storage { operation, source })
    }
}
