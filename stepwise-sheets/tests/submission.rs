//! End-to-end submission tests against an in-memory sheet.

use std::sync::Arc;

use serde_json::json;
use stepwise::{Session, SubmitError, Survey};
use stepwise_sheets::{
    ConfigError, MemorySheet, SHEET_HEADERS, SheetLayout, SubmissionService, VerifyError,
    sample_answers, sync_headers, verify,
};

fn service(survey: &Survey) -> (SubmissionService, Arc<MemorySheet>) {
    let sheet = Arc::new(MemorySheet::with_headers(SHEET_HEADERS.iter().copied()));
    let service = SubmissionService::new(
        survey.schema().clone(),
        SheetLayout::default(),
        sheet.clone(),
    );
    (service, sheet)
}

#[tokio::test]
async fn test_valid_submission_appends_one_full_row() {
    let survey = Survey::builtin().unwrap();
    let (service, sheet) = service(&survey);

    let receipt = service
        .submit(
            &sample_answers(&survey).to_json(),
            Some("203.0.113.5, 10.0.0.1"),
        )
        .await
        .unwrap();

    let rows = sheet.data_rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), SHEET_HEADERS.len());
    assert_eq!(rows[0][1], "203.0.113.5");
    assert_eq!(rows[0][2], "Yes");
    assert_eq!(rows[0], receipt.row);
    assert!(receipt.timestamp.ends_with('Z'));
}

#[tokio::test]
async fn test_missing_forwarded_header_records_unknown() {
    let survey = Survey::builtin().unwrap();
    let (service, sheet) = service(&survey);

    service
        .submit(&sample_answers(&survey).to_json(), None)
        .await
        .unwrap();
    assert_eq!(sheet.data_rows().await[0][1], "unknown");
}

#[tokio::test]
async fn test_hidden_question_becomes_empty_cell() {
    let survey = Survey::builtin().unwrap();
    let (service, sheet) = service(&survey);

    let mut answers = sample_answers(&survey);
    answers.insert("has_children", "No");
    let mut body = answers.to_json();
    body.as_object_mut().unwrap().remove("number_of_children");

    service.submit(&body, None).await.unwrap();

    let column = SHEET_HEADERS
        .iter()
        .position(|h| *h == "number_of_children")
        .unwrap();
    assert_eq!(sheet.data_rows().await[0][column], "");
}

#[tokio::test]
async fn test_invalid_submission_writes_nothing() {
    let survey = Survey::builtin().unwrap();
    let (service, sheet) = service(&survey);

    let err = service
        .submit(&json!({ "member_status_check": "Maybe" }), None)
        .await
        .unwrap_err();

    let SubmitError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(
        errors.get("member_status_check"),
        Some("Please select if you are a member.")
    );
    assert_eq!(errors.get("gender"), Some("Required"));
    assert!(sheet.data_rows().await.is_empty());
}

#[tokio::test]
async fn test_unconfigured_service_still_validates_first() {
    let survey = Survey::builtin().unwrap();
    let service = SubmissionService::unconfigured(
        survey.schema().clone(),
        SheetLayout::default(),
        ConfigError::Missing("GOOGLE_SHEET_ID"),
    );

    let invalid = service.submit(&json!({}), None).await.unwrap_err();
    assert_eq!(invalid.kind(), "validation");

    let valid = service
        .submit(&sample_answers(&survey).to_json(), None)
        .await
        .unwrap_err();
    assert_eq!(valid.to_string(), "Server configuration error");
    assert!(!valid.is_retryable());
}

#[tokio::test]
async fn test_transport_failure_writes_nothing_and_is_retryable() {
    let survey = Survey::builtin().unwrap();
    let (service, sheet) = service(&survey);
    sheet.fail_with("quota exceeded").await;

    let err = service
        .submit(&sample_answers(&survey).to_json(), None)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Server Error: Sheet is unavailable: quota exceeded"
    );
    assert!(err.is_retryable());

    sheet.recover().await;
    assert!(sheet.data_rows().await.is_empty());
}

#[tokio::test]
async fn test_session_submits_through_service() {
    let survey = Survey::builtin().unwrap();
    let (service, sheet) = service(&survey);
    let mut session = Session::with_answers(&survey, sample_answers(&survey));

    session.submit(&service).await.unwrap();

    assert!(session.submission().is_submitted());
    assert_eq!(sheet.data_rows().await.len(), 1);
    assert_eq!(
        session.submit(&service).await,
        Err(SubmitError::AlreadySubmitted)
    );
}

#[tokio::test]
async fn test_sync_headers_then_verify() {
    let survey = Survey::builtin().unwrap();
    let sheet = Arc::new(MemorySheet::with_headers(["timestamp"]));
    let service = SubmissionService::new(
        survey.schema().clone(),
        SheetLayout::default(),
        sheet.clone(),
    );

    let err = verify(&service, &survey).await.unwrap_err();
    assert!(matches!(
        err,
        VerifyError::MissingHeaders(ref missing) if missing.len() == SHEET_HEADERS.len() - 1
    ));

    sync_headers(sheet.as_ref(), service.layout()).await.unwrap();
    let report = verify(&service, &survey).await.unwrap();
    assert_eq!(report.rows_before, 1);
    assert_eq!(report.rows_after, 2);
    assert!(report.receipt.ip_address.starts_with("10.0.0."));
}
