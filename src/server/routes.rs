use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/api/crawl", post(handlers::run_crawl))
        .route("/api/products", get(handlers::list_products))
        .route("/api/products/:product_id", get(handlers::get_product))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
