//! JSON API over the product store.
//!
//! Exposes the crawl trigger and the query endpoints:
//! - `POST /api/crawl`: run one full crawl and replace the store
//! - `GET /api/products`: filtered, paginated product listing
//! - `GET /api/products/:id`: single product
//! - `GET /`: health check

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::app::AppContext;
use crate::crawler::CrawlConfig;
use crate::store::SqliteStore;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub crawl_config: CrawlConfig,
    /// Held for the duration of a crawl; a second request is rejected while
    /// the first still owns the browser page.
    pub crawl_guard: Arc<Mutex<()>>,
}

/// Start the web server.
pub async fn serve(ctx: &AppContext, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState {
        store: ctx.store.clone(),
        crawl_config: ctx.config.crawl.clone(),
        crawl_guard: ctx.crawl_guard.clone(),
    };
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::domain::{Availability, ProductRecord};
    use crate::store::ProductStore;

    fn record(name: &str, price: Option<f64>, availability: Availability) -> ProductRecord {
        let mut r = ProductRecord::new(name);
        r.price = price;
        r.availability = availability;
        r
    }

    fn test_state() -> AppState {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store
            .replace_all(&[
                record("Atta 10lb", Some(12.99), Availability::InStock),
                record("Ghee 1L", Some(18.50), Availability::InStock),
                record("Basmati Rice", Some(24.00), Availability::SoldOut),
            ])
            .unwrap();

        AppState {
            store,
            crawl_config: CrawlConfig::default(),
            crawl_guard: Arc::new(Mutex::new(())),
        }
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_products_default_listing() {
        let app = create_router(test_state());
        let (status, json) = get_json(app, "/api/products").await;

        assert_eq!(status, StatusCode::OK);
        let products = json.as_array().unwrap();
        assert_eq!(products.len(), 3);
        assert_eq!(products[0]["name"], "Atta 10lb");
        assert_eq!(products[0]["availability"], "In Stock");
        assert!(products[0]["id"].is_i64());
    }

    #[tokio::test]
    async fn test_products_name_filter() {
        let app = create_router(test_state());
        let (status, json) = get_json(app, "/api/products?q=rice").await;

        assert_eq!(status, StatusCode::OK);
        let products = json.as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["name"], "Basmati Rice");
    }

    #[tokio::test]
    async fn test_products_availability_filter() {
        let app = create_router(test_state());
        let (status, json) = get_json(app, "/api/products?availability=Sold%20Out").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_products_unknown_availability_matches_nothing() {
        let app = create_router(test_state());
        let (status, json) = get_json(app, "/api/products?availability=Backordered").await;

        assert_eq!(status, StatusCode::OK);
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_products_price_range_and_pagination() {
        let app = create_router(test_state());
        let (status, json) = get_json(app.clone(), "/api/products?min_price=13").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 2);

        let (status, json) = get_json(app, "/api/products?skip=1&limit=1").await;
        assert_eq!(status, StatusCode::OK);
        let products = json.as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["name"], "Ghee 1L");
    }

    #[tokio::test]
    async fn test_products_bad_price_is_rejected() {
        let app = create_router(test_state());
        let (status, json) = get_json(app, "/api/products?min_price=abc").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "min_price must be a number");
    }

    #[tokio::test]
    async fn test_product_by_id_and_not_found() {
        let app = create_router(test_state());
        let (_, listing) = get_json(app.clone(), "/api/products?limit=1").await;
        let id = listing[0]["id"].as_i64().unwrap();

        let (status, json) = get_json(app.clone(), &format!("/api/products/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Atta 10lb");

        let (status, json) = get_json(app, "/api/products/424242").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Product not found");
    }

    #[tokio::test]
    async fn test_crawl_rejected_while_one_is_running() {
        let state = test_state();
        let guard = state.crawl_guard.clone();
        let app = create_router(state);

        let _held = guard.try_lock().unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/crawl")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
