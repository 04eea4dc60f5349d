use crate::api::handlers;
use crate::config::AppConfig;
use crate::service::{CatalogService, InventoryService};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// 构建完整路由
pub fn build_router(pool: PgPool, config: &AppConfig) -> Router {
    let catalog = Arc::new(CatalogService::new(pool.clone()));
    let inventory = Arc::new(InventoryService::new(
        pool,
        config.database.workflow_timeout(),
    ));

    // 目录路由 (单条语句)
    let catalog_routes = Router::new()
        .route(
            "/api/productos",
            get(handlers::listar_productos).post(handlers::crear_producto),
        )
        .route("/api/categorias", get(handlers::listar_categorias))
        .route("/api/colores", get(handlers::listar_colores))
        .route("/api/tallas", get(handlers::listar_tallas))
        .route(
            "/api/proveedores",
            get(handlers::listar_proveedores).post(handlers::crear_proveedor),
        )
        .route("/api/color", post(handlers::crear_color))
        .route("/api/talla", post(handlers::crear_talla))
        .route("/api/inventario", get(handlers::listar_inventario))
        .route(
            "/api/historial-precios/:producto_id",
            get(handlers::historial_precios),
        )
        .with_state(catalog);

    // 库存流程路由 (事务)
    let inventory_routes = Router::new()
        .route("/api/agregarProducto", post(handlers::agregar_producto))
        .route("/api/quitarProducto", post(handlers::quitar_producto))
        .with_state(inventory);

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(catalog_routes)
        .merge(inventory_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config)),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            let origin = origin.trim();
            match HeaderValue::from_str(origin) {
                Ok(value) if !origin.is_empty() => Some(value),
                _ => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
