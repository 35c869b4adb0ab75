//! Test backend for running surveys without user interaction.
//!
//! `TestBackend` answers prompts from pre-defined responses keyed by question
//! id, and can be told to go back at given steps. It records every prompt it
//! saw, so tests can assert on the exact path through the sequence.
//!
//! # Example
//!
//! ```rust
//! use stepwise::{Session, Survey, TestBackend, run};
//!
//! let survey = Survey::builtin().unwrap();
//! let mut session = Session::new(&survey);
//! let mut backend = TestBackend::new().with_response("member_status_check", "Yes");
//!
//! // The backend runs out of responses at the second question.
//! assert!(run(&mut session, &mut backend).is_err());
//! assert_eq!(backend.visited()[0].as_str(), "member_status_check");
//! ```

use std::collections::{HashMap, HashSet};

use stepwise_types::{QuestionId, ResponseValue};

use crate::{Prompt, Reply, SurveyBackend};

/// A backend that replies with pre-configured responses.
#[derive(Debug, Clone, Default)]
pub struct TestBackend {
    responses: HashMap<QuestionId, ResponseValue>,
    back_at: HashSet<QuestionId>,
    cancel_at: Option<QuestionId>,
    visited: Vec<QuestionId>,
    errors: Vec<String>,
}

/// Error type for TestBackend.
#[derive(Debug, thiserror::Error)]
pub enum TestBackendError {
    #[error("Missing response for question: {0}")]
    MissingResponse(QuestionId),

    #[error("Answer for '{id}' rejected: {message}")]
    Rejected { id: QuestionId, message: String },

    #[error("Cancelled at question: {0}")]
    Cancelled(QuestionId),
}

impl TestBackend {
    /// Create a new empty test backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for a question.
    pub fn with_response(
        mut self,
        id: impl Into<QuestionId>,
        value: impl Into<ResponseValue>,
    ) -> Self {
        self.responses.insert(id.into(), value.into());
        self
    }

    /// Add responses for several questions.
    pub fn with_responses<I, K, V>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<QuestionId>,
        V: Into<ResponseValue>,
    {
        self.responses
            .extend(responses.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Reply "back" the first time this question is shown.
    pub fn with_back_at(mut self, id: impl Into<QuestionId>) -> Self {
        self.back_at.insert(id.into());
        self
    }

    /// Cancel the survey when this question is shown.
    pub fn with_cancel_at(mut self, id: impl Into<QuestionId>) -> Self {
        self.cancel_at = Some(id.into());
        self
    }

    /// Question ids in the order they were presented.
    pub fn visited(&self) -> &[QuestionId] {
        &self.visited
    }

    /// Error messages the session reported back.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl SurveyBackend for TestBackend {
    type Error = TestBackendError;

    fn present(&mut self, prompt: &Prompt<'_>) -> Result<Reply, Self::Error> {
        let id = prompt.step.id();
        self.visited.push(id.clone());

        if self.cancel_at.as_ref() == Some(id) {
            return Err(TestBackendError::Cancelled(id.clone()));
        }

        // Responses are fixed, so a rejected answer would be rejected forever.
        if let Some(message) = &prompt.error {
            self.errors.push(message.clone());
            return Err(TestBackendError::Rejected {
                id: id.clone(),
                message: message.clone(),
            });
        }

        if prompt.can_go_back && self.back_at.remove(id) {
            return Ok(Reply::Back);
        }

        self.responses
            .get(id)
            .cloned()
            .map(Reply::Answer)
            .ok_or_else(|| TestBackendError::MissingResponse(id.clone()))
    }

    fn is_cancellation(error: &Self::Error) -> bool {
        matches!(error, TestBackendError::Cancelled(_))
    }
}
