use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use stepwise::{Responses, Schema, SubmitError, Submitter, Survey};

use crate::{
    ConfigError, GoogleSheets, SheetLayout, SheetSink, SheetsConfig, SubmissionRecord, client_ip,
};

/// What was written for an accepted submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub timestamp: String,
    pub ip_address: String,
    pub row: Vec<String>,
}

/// Validates candidate answer sets and appends them to a sheet.
///
/// A service without a sink still validates, but every valid submission
/// fails with [`SubmitError::Configuration`].
#[derive(Clone)]
pub struct SubmissionService {
    schema: Schema,
    layout: SheetLayout,
    sink: Result<Arc<dyn SheetSink>, ConfigError>,
}

impl std::fmt::Debug for SubmissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionService")
            .field("layout", &self.layout)
            .field("configured", &self.is_configured())
            .finish_non_exhaustive()
    }
}

impl SubmissionService {
    pub fn new(schema: Schema, layout: SheetLayout, sink: Arc<dyn SheetSink>) -> Self {
        Self {
            schema,
            layout,
            sink: Ok(sink),
        }
    }

    /// A service whose sheet credentials are missing or broken.
    pub fn unconfigured(schema: Schema, layout: SheetLayout, reason: ConfigError) -> Self {
        Self {
            schema,
            layout,
            sink: Err(reason),
        }
    }

    /// Build a Google Sheets backed service for `survey` from the environment.
    ///
    /// Missing credentials don't fail here; they surface on the first submit.
    pub fn from_env(survey: &Survey) -> Self {
        let schema = survey.schema().clone();
        let layout = SheetLayout::default();
        match SheetsConfig::from_env().and_then(GoogleSheets::new) {
            Ok(sheets) => {
                tracing::info!(
                    sheet_id = %sheets.config().sheet_id,
                    tab = %sheets.config().tab,
                    "Submissions go to Google Sheets"
                );
                Self::new(schema, layout, Arc::new(sheets))
            }
            Err(err) => {
                tracing::warn!(error = %err, "Google Sheets is not configured");
                Self::unconfigured(schema, layout, err)
            }
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    pub fn sink(&self) -> Result<&Arc<dyn SheetSink>, &ConfigError> {
        self.sink.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.sink.is_ok()
    }

    /// Validate `body` and append it as one row.
    ///
    /// Nothing is written unless validation passes and the sink is
    /// configured. A failed append writes nothing either.
    pub async fn submit(
        &self,
        body: &Value,
        forwarded_for: Option<&str>,
    ) -> Result<Receipt, SubmitError> {
        let answers = self.schema.parse(body).map_err(|errors| {
            tracing::warn!(failed = errors.len(), %errors, "Rejected submission");
            SubmitError::Validation(errors)
        })?;

        let sink = self.sink.as_ref().map_err(|err| {
            tracing::error!(error = %err, "Cannot record submission");
            SubmitError::Configuration {
                detail: err.to_string(),
            }
        })?;

        let record = SubmissionRecord::new(answers, client_ip(forwarded_for));
        let row = self.layout.row(&record);
        sink.append_row(row.clone()).await.map_err(|err| {
            tracing::error!(error = %err, "Failed to append submission");
            SubmitError::transport(err)
        })?;

        tracing::info!(
            ip = %record.ip_address,
            timestamp = %record.timestamp,
            "Recorded submission"
        );
        Ok(Receipt {
            timestamp: record.timestamp,
            ip_address: record.ip_address,
            row,
        })
    }
}

#[async_trait]
impl Submitter for SubmissionService {
    async fn submit(&self, answers: &Responses) -> Result<(), SubmitError> {
        SubmissionService::submit(self, &answers.to_json(), None)
            .await
            .map(|_| ())
    }
}
