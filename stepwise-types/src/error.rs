use std::{collections::BTreeMap, fmt};

use serde::Serialize;

use crate::QuestionId;

/// Error type for running a survey through a backend.
#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    /// User cancelled the survey (Ctrl+C, closed window, etc.)
    #[error("Survey cancelled by user")]
    Cancelled,

    /// Backend-specific failure (I/O, terminal crash, etc.)
    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl SurveyError {
    /// Create a backend error from any error type.
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        Self::Backend(err.into())
    }

    /// Check if this error represents user cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A catalog document that can't be used.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Question '{label}' has an empty id")]
    EmptyId { label: String },

    #[error("Question id '{0}' is used more than once")]
    DuplicateId(QuestionId),

    #[error("Question '{question}' depends on unknown question '{field}'")]
    UnknownDependency {
        question: QuestionId,
        field: QuestionId,
    },

    #[error("Question '{question}' is a {kind} question without options")]
    MissingOptions {
        question: QuestionId,
        kind: &'static str,
    },
}

/// Field-level validation failures of a candidate answer set, keyed by question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<QuestionId, String>,
}

impl ValidationErrors {
    /// Create an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for a question. The first message per question wins.
    pub fn add(&mut self, id: impl Into<QuestionId>, message: impl Into<String>) {
        self.fields
            .entry(id.into())
            .or_insert_with(|| message.into());
    }

    /// Get the message for a question, if it failed.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.fields.get(id).map(String::as_str)
    }

    /// Iterate over failures in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &str)> {
        self.fields.iter().map(|(id, msg)| (id, msg.as_str()))
    }

    /// Get the number of failed questions.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(value)` if nothing failed, the errors otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.fields.len();
        write!(
            f,
            "{count} field{} failed validation",
            if count == 1 { "" } else { "s" }
        )?;
        for (i, (id, message)) in self.fields.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{id}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Why a submission did not reach the sheet.
///
/// Every variant leaves the answer set untouched. Only `Configuration`
/// is fatal for the request; the others may be retried by submitting again.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    /// The answer set failed schema validation. Nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The submission collaborator is missing credentials.
    #[error("Server configuration error")]
    Configuration { detail: String },

    /// The request could not be delivered, or the sheet rejected it.
    #[error("Server Error: {0}")]
    Transport(String),

    /// A remote submit endpoint answered with an error status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A submission from this session is still pending.
    #[error("A submission is already in progress")]
    InFlight,

    /// This session was already submitted successfully.
    #[error("The survey has already been submitted")]
    AlreadySubmitted,
}

impl SubmitError {
    /// Short machine-readable name of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Configuration { .. } => "configuration",
            Self::Transport(_) => "transport",
            Self::Server { .. } => "server",
            Self::InFlight => "in_flight",
            Self::AlreadySubmitted => "already_submitted",
        }
    }

    /// Whether submitting the same answers again may succeed.
    ///
    /// Guard rejections ([`InFlight`](Self::InFlight),
    /// [`AlreadySubmitted`](Self::AlreadySubmitted)) are not failed
    /// submissions and are never retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Server { .. })
    }

    pub fn transport(err: impl fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<ValidationErrors> for SubmitError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
