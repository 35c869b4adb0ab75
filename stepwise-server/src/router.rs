use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use stepwise::Survey;
use stepwise_sheets::SubmissionService;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;

/// Shared state of every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub survey: Arc<Survey>,
    pub service: SubmissionService,
}

impl AppState {
    pub fn new(survey: Arc<Survey>, service: SubmissionService) -> Self {
        Self { survey, service }
    }
}

/// Build the router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/submit", post(handlers::submit))
        .route("/api/catalog", get(handlers::catalog))
        .route("/api/health", get(handlers::health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}
