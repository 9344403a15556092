//! HTTP entry point
//!
//! Thin transport over the scraping core: parse the `q` parameter, run the
//! aggregation driver, serialize the ranked results. Browser-side comparison
//! widgets call this from arbitrary origins, hence the permissive CORS
//! layer; the preflight OPTIONS short-circuits inside the layer before any
//! scraping state is touched.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::aggregate;
use crate::browser::BrowserManager;
use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::scrape;
use crate::stores::{self, StoreDefinition, StoreResult};

#[derive(Clone)]
pub struct AppState {
    pub browser: BrowserManager,
    pub config: Arc<ScrapeConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PriceQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct PricesResponse {
    pub items: Vec<StoreResult>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/prices", get(get_prices).post(post_prices))
        .layer(build_cors())
        .with_state(state)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn get_prices(
    State(state): State<AppState>,
    Query(params): Query<PriceQuery>,
) -> Response {
    run_query(state, params.q).await
}

/// A missing, malformed or mis-typed body degrades to the default (empty)
/// query instead of surfacing axum's plain-text rejection, so every failure
/// keeps the `{error}` JSON shape.
async fn post_prices(
    State(state): State<AppState>,
    body: Result<Json<PriceQuery>, JsonRejection>,
) -> Response {
    let params = body.map(|Json(params)| params).unwrap_or_default();
    run_query(state, params.q).await
}

/// Shared GET/POST path: validate the query, acquire the browser, fan out
/// across the registry, rank, respond.
async fn run_query(state: AppState, raw_query: String) -> Response {
    let query = raw_query.trim().to_string();
    if query.is_empty() {
        // Rejected before the browser is touched: an empty query must have
        // no scraping side effects.
        return error_response(StatusCode::BAD_REQUEST, &ScrapeError::EmptyQuery);
    }

    let handle = match state.browser.get_or_launch().await {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "browser runtime unavailable");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ScrapeError::Runtime(e.to_string()),
            );
        }
    };

    let guard = handle.lock().await;
    let Some(wrapper) = guard.as_ref() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &ScrapeError::Runtime("browser slot empty after launch".to_string()),
        );
    };

    let browser = wrapper.browser();
    let config = state.config.as_ref();
    let items = match aggregate::scrape_all(
        stores::registry(),
        config.max_concurrent_stores,
        constrain(|def: &StoreDefinition| {
            let def = *def;
            let query = query.as_str();
            async move { scrape::scrape_store(browser, &def, query, config).await }.boxed()
        }),
    )
    .await
    {
        Ok(items) => items,
        Err(e) => {
            // Only fatal faults escape the per-store containment; the dead
            // browser makes every remaining store pointless.
            error!(error = %e, "request aborted by browser runtime fault");
            return error_response(status_for(&e), &e);
        }
    };

    (StatusCode::OK, Json(PricesResponse { items })).into_response()
}

/// Identity helper that forces the scrape closure to be inferred with a
/// higher-ranked lifetime, which the handler's `Send` proof requires.
fn constrain<F, Fut>(f: F) -> F
where
    F: for<'a> Fn(&'a StoreDefinition) -> Fut,
{
    f
}

fn status_for(error: &ScrapeError) -> StatusCode {
    if error.is_fatal() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    }
}

fn error_response(status: StatusCode, error: &ScrapeError) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}
