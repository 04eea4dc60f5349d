pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use api::build_router;
pub use config::AppConfig;
pub use db::{create_lazy_pool, create_pool};
pub use error::{AppError, Operation};
pub use service::{CatalogService, InventoryService};
