//! Router tests against an in-memory sheet.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use stepwise::Survey;
use stepwise_server::{AppState, build_router};
use stepwise_sheets::{
    ConfigError, MemorySheet, SHEET_HEADERS, SheetLayout, SubmissionService, sample_answers,
};
use tower::ServiceExt;

fn app_with(service: SubmissionService, survey: Arc<Survey>) -> axum::Router {
    build_router(AppState::new(survey, service))
}

fn test_app() -> (axum::Router, Arc<MemorySheet>, Arc<Survey>) {
    let survey = Arc::new(Survey::builtin().unwrap());
    let sheet = Arc::new(MemorySheet::with_headers(SHEET_HEADERS.iter().copied()));
    let service = SubmissionService::new(
        survey.schema().clone(),
        SheetLayout::default(),
        sheet.clone(),
    );
    (app_with(service, survey.clone()), sheet, survey)
}

fn post_submit(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/submit")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "203.0.113.5, 10.0.0.1")
        .body(body.into())
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_submit_valid_answers() {
    let (app, sheet, survey) = test_app();
    let body = sample_answers(&survey).to_json().to_string();

    let resp = app.oneshot(post_submit(body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "success": true }));
    let rows = sheet.data_rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1], "203.0.113.5");
}

#[tokio::test]
async fn test_submit_invalid_answers_is_400_with_details() {
    let (app, sheet, _) = test_app();
    let body = json!({ "member_status_check": "Maybe", "age_group": "" }).to_string();

    let resp = app.oneshot(post_submit(body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "Validation failed");
    assert_eq!(
        json["details"]["member_status_check"],
        "Please select if you are a member."
    );
    assert_eq!(json["details"]["age_group"], "Please select an option");
    assert_eq!(json["details"]["gender"], "Required");
    assert!(sheet.data_rows().await.is_empty());
}

#[tokio::test]
async fn test_submit_malformed_body_is_400() {
    let (app, _, _) = test_app();

    let resp = app.oneshot(post_submit("not json")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["details"]["$"], "Expected an object");
}

#[tokio::test]
async fn test_submit_without_credentials_is_500() {
    let survey = Arc::new(Survey::builtin().unwrap());
    let service = SubmissionService::unconfigured(
        survey.schema().clone(),
        SheetLayout::default(),
        ConfigError::Missing("GOOGLE_PRIVATE_KEY"),
    );
    let app = app_with(service, survey.clone());

    let resp = app
        .oneshot(post_submit(sample_answers(&survey).to_json().to_string()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp).await,
        json!({ "error": "Server configuration error" })
    );
}

#[tokio::test]
async fn test_submit_sheet_failure_is_500_with_message() {
    let (app, sheet, survey) = test_app();
    sheet.fail_with("quota exceeded").await;

    let resp = app
        .oneshot(post_submit(sample_answers(&survey).to_json().to_string()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp).await["error"],
        "Server Error: Sheet is unavailable: quota exceeded"
    );
}

#[tokio::test]
async fn test_catalog_lists_steps() {
    let (app, _, _) = test_app();

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/catalog")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 77);
    assert_eq!(steps[0]["id"], "member_status_check");
    assert!(json["prelude"].as_str().unwrap().contains("anonymous"));
}

#[tokio::test]
async fn test_health() {
    let (app, _, _) = test_app();

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["sheetsConfigured"], true);
}
