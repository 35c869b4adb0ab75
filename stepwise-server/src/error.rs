use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use stepwise::SubmitError;

/// A failed submission, rendered as a JSON error body.
#[derive(Debug)]
pub struct ApiError(pub SubmitError);

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            SubmitError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "details": details }),
            ),
            SubmitError::Server { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                json!({ "error": message }),
            ),
            SubmitError::InFlight | SubmitError::AlreadySubmitted => {
                (StatusCode::CONFLICT, json!({ "error": self.0.to_string() }))
            }
            SubmitError::Configuration { .. } | SubmitError::Transport(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": self.0.to_string() }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
