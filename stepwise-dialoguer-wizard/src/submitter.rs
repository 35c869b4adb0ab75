//! Posting completed answer sets to a running `stepwise-server`.

use async_trait::async_trait;
use serde_json::Value;
use stepwise::{Responses, SubmitError, Submitter, ValidationErrors};

/// Error body of a `500` caused by missing or broken sheet credentials.
const CONFIGURATION_ERROR: &str = "Server configuration error";

/// Submits answer sets to `POST {base}/api/submit`.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubmitter {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/api/submit", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, answers: &Responses) -> Result<(), SubmitError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(answers)
            .send()
            .await
            .map_err(SubmitError::transport)?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(endpoint = %self.endpoint, "submission accepted");
            return Ok(());
        }

        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Err(error_from_response(status.as_u16(), &body))
    }
}

/// Map an error response of the submit endpoint back onto [`SubmitError`].
fn error_from_response(status: u16, body: &Value) -> SubmitError {
    if status == 400
        && let Some(details) = body.get("details").and_then(Value::as_object)
    {
        let mut errors = ValidationErrors::new();
        for (id, message) in details {
            errors.add(id.as_str(), message.as_str().unwrap_or("Invalid"));
        }
        return SubmitError::Validation(errors);
    }

    let message = body
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Submission failed (HTTP {status})"));
    if status == 500 && message == CONFIGURATION_ERROR {
        return SubmitError::Configuration { detail: message };
    }
    SubmitError::Server { status, message }
}
