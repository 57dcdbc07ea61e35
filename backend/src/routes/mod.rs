//! Route definitions for the warehouse inventory API

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::{
    handlers,
    middleware::{admin_only, auth_middleware},
    AppState,
};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes
        .nest("/auth", auth_routes(state.clone()))
        // Admin routes
        .merge(admin_routes(state))
}

/// Login is public; verify accepts any signed-in role
fn auth_routes(state: AppState) -> Router<AppState> {
    let verify = Router::new()
        .route("/verify", get(handlers::verify))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/login", post(handlers::login))
        .merge(verify)
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/orders", order_routes())
        .nest("/stock-movements", stock_movement_routes())
        // Layers run bottom-up: authenticate first, then check the role
        .route_layer(middleware::from_fn(admin_only))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/:category_id", axum::routing::delete(handlers::delete_category))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route(
            "/:order_id",
            get(handlers::get_order).delete(handlers::delete_order),
        )
        .route("/:order_id/status", patch(handlers::update_order_status))
}

fn stock_movement_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::list_stock_movements).post(handlers::create_stock_movement),
    )
}
