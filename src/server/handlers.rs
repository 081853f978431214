use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::crawler;
use crate::domain::Availability;
use crate::store::{ProductQuery, ProductStore};

use super::AppState;

pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

#[derive(Debug, Deserialize)]
pub struct ProductParams {
    /// Substring match on the product name.
    q: Option<String>,
    category: Option<String>,
    availability: Option<String>,
    // Kept as strings so a malformed number is a 400, not a silently
    // dropped filter.
    min_price: Option<String>,
    max_price: Option<String>,
    skip: Option<usize>,
    limit: Option<usize>,
}

fn parse_price_param(raw: &Option<String>, field: &str) -> Result<Option<f64>, impl IntoResponse> {
    match raw {
        None => Ok(None),
        Some(s) => match s.parse::<f64>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("{} must be a number", field)})),
            )),
        },
    }
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductParams>,
) -> impl IntoResponse {
    let min_price = match parse_price_param(&params.min_price, "min_price") {
        Ok(v) => v,
        Err(e) => return e.into_response(),
    };
    let max_price = match parse_price_param(&params.max_price, "max_price") {
        Ok(v) => v,
        Err(e) => return e.into_response(),
    };

    // An availability value outside the known set can match nothing, so
    // short-circuit instead of querying.
    let availability = match params.availability.as_deref() {
        None => None,
        Some(raw) => match Availability::parse(raw) {
            Some(a) => Some(a),
            None => return Json(json!([])).into_response(),
        },
    };

    let query = ProductQuery {
        name: params.q,
        category: params.category,
        availability,
        min_price,
        max_price,
        skip: params.skip.unwrap_or(0),
        limit: params.limit.unwrap_or(10),
    };

    match state.store.query(&query) {
        Ok(products) => Json(products).into_response(),
        Err(e) => {
            error!("Product query failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Query failed"})),
            )
                .into_response()
        }
    }
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> impl IntoResponse {
    match state.store.get(product_id) {
        Ok(Some(product)) => Json(product).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Product not found"})),
        )
            .into_response(),
        Err(e) => {
            error!("Product lookup failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Lookup failed"})),
            )
                .into_response()
        }
    }
}

pub async fn run_crawl(State(state): State<AppState>) -> impl IntoResponse {
    // Only one browser session at a time; reject rather than queue so the
    // caller gets an immediate answer.
    let Ok(_guard) = state.crawl_guard.try_lock() else {
        return (
            StatusCode::CONFLICT,
            Json(json!({"error": "A crawl is already in progress"})),
        )
            .into_response();
    };

    info!("Crawl requested via API");
    match crawler::run_once(&state.crawl_config, state.store.as_ref(), None).await {
        Ok(summary) => Json(json!({
            "message": format!("Indexed {} products", summary.stored),
            "stop_reason": summary.reason.to_string(),
        }))
        .into_response(),
        Err(e) => {
            error!("Crawl failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": format!("Crawl failed: {}", e)})),
            )
                .into_response()
        }
    }
}
