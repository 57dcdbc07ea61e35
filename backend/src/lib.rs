//! Warehouse inventory backend
//!
//! Catalog, supplier and purchase order management around a stock engine that
//! keeps on-hand quantities and the stock ledger in step.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub stock: Arc<dyn store::StockStore>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: Config) -> Self {
        Self {
            stock: Arc::new(store::PgStockStore::new(db.clone())),
            db,
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_dir = state.config.server.static_dir.clone();

    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()));

    // Browser client, if configured, otherwise a plain banner at `/`
    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.route("/", get(handlers::root)),
    };

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
