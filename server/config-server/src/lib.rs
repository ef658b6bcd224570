//! Rate Alert Config Server
//!
//! HTTP resource for per-category alerting policies: retrieve the current
//! policy, create or update one. Bind to 127.0.0.1 by default (internal only).

mod handlers;
mod state;
mod types;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

pub use handlers::{fetch, fetch_text, health, list, upsert};
pub use state::AppState;
pub use types::{ApiError, ErrorBody};

pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/config", get(list).put(upsert).post(upsert))
    .route("/config/:category", get(fetch))
    .route("/config/:category/text", get(fetch_text))
    .layer(CorsLayer::permissive())
    .with_state(state)
}
