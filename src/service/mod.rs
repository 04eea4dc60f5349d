pub mod catalog;
pub mod inventory;

pub use catalog::CatalogService;
pub use inventory::InventoryService;
