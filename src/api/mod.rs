pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::build_router;
