//! Request handlers.
//!
//! - `POST /api/submit` - validate an answer set and append it to the sheet
//! - `GET /api/catalog` - the flattened question sequence
//! - `GET /api/health` - liveness and sheet configuration

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use serde::Serialize;
use serde_json::{Value, json};
use stepwise::Step;

use crate::{ApiError, AppState};

const FORWARDED_FOR: &str = "x-forwarded-for";

/// POST /api/submit
///
/// Bodies that aren't JSON are validated as `null`, which fails with a
/// root-level validation error.
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let candidate: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let forwarded_for = headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok());

    state.service.submit(&candidate, forwarded_for).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    prelude: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    epilogue: Option<&'a str>,
    steps: &'a [Step],
}

/// GET /api/catalog
pub async fn catalog(State(state): State<AppState>) -> Json<Value> {
    let survey = &state.survey;
    let response = CatalogResponse {
        prelude: survey.prelude.as_deref(),
        epilogue: survey.epilogue.as_deref(),
        steps: survey.sequence().steps(),
    };
    Json(serde_json::to_value(response).unwrap_or(Value::Null))
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "sheetsConfigured": state.service.is_configured(),
        "questions": state.survey.sequence().len(),
    }))
}
