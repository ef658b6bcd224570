//! HTTP handlers for the policy resource.

use std::sync::Arc;

use axum::{
  extract::{rejection::JsonRejection, Path, State},
  Json,
};
use rate_alert::{Category, Policy, PolicyDraft};
use tracing::{info, warn};

use crate::state::AppState;
use crate::types::ApiError;

pub async fn health() -> &'static str {
  "ok"
}

/// All policies, ordered by category.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Policy>> {
  Json(state.policies.all())
}

pub async fn fetch(
  State(state): State<Arc<AppState>>,
  Path(category): Path<String>,
) -> Result<Json<Policy>, ApiError> {
  lookup(&state, &category).map(Json)
}

/// Textual form, e.g. `[ critical, 10, 100, 100 ]`.
pub async fn fetch_text(
  State(state): State<Arc<AppState>>,
  Path(category): Path<String>,
) -> Result<String, ApiError> {
  lookup(&state, &category).map(|p| p.to_string())
}

/// Create or update the policy for the body's category.
pub async fn upsert(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<PolicyDraft>, JsonRejection>,
) -> Result<Json<Policy>, ApiError> {
  let Json(draft) = payload.map_err(|rejection| {
    let message = rejection.body_text();
    warn!("upsert: rejected body: {}", message);
    ApiError::BadRequest {
      message,
      field: None,
    }
  })?;
  let policy = draft.validate().map_err(|e| {
    warn!("upsert: invalid policy: {}", e);
    ApiError::from(e)
  })?;

  let previous = state.policies.upsert(policy);
  info!(
    category = %policy.category(),
    created = previous.is_none(),
    "policy stored: {}",
    policy
  );
  Ok(Json(policy))
}

fn lookup(state: &AppState, raw: &str) -> Result<Policy, ApiError> {
  let category = Category::parse(raw).ok_or_else(|| ApiError::BadRequest {
    message: format!("unknown category {:?}", raw),
    field: Some("category".into()),
  })?;
  state
    .policies
    .get(category)
    .ok_or_else(|| ApiError::NotFound(format!("no policy for {}", category)))
}
