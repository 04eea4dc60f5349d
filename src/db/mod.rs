pub mod pool;
pub mod queries;
pub mod queries_inventory;

pub use pool::{create_lazy_pool, create_pool};
pub use queries::*;
