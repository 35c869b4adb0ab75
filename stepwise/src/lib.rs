//! # stepwise
//!
//! One-question-at-a-time surveys with conditional skips and back-navigation.
//! Backend-agnostic.
//!
//! A [`Survey`] is built once from a static catalog. Each respondent gets a
//! [`Session`], which holds their answers and navigation history and
//! decides which question comes next.
//!
//! ## Usage
//!
//! ```rust
//! use stepwise::{Advance, Session, Survey};
//!
//! let survey = Survey::builtin().unwrap();
//! let mut session = Session::new(&survey);
//!
//! session.answer("Yes");
//! assert_eq!(session.next(), Ok(Advance::Moved(1)));
//!
//! session.back();
//! assert_eq!(session.current_step().unwrap().id().as_str(), "member_status_check");
//! ```
//!
//! ## Conditional questions
//!
//! A question with a `conditional { field, value }` rule is only shown when
//! the answer to `field` is exactly `value`. Hidden questions are skipped
//! when moving forward and ignored when deciding whether the current
//! question is the last one.
//!
//! ## Backends
//!
//! Backends render one [`Prompt`] at a time and implement [`SurveyBackend`];
//! [`run`] drives a session through them:
//! - `stepwise-dialoguer-wizard` - CLI prompts via dialoguer
//! - [`TestBackend`] - canned answers for tests

// Re-export all types from stepwise-types
pub use stepwise_types::*;

mod flow;
pub use flow::{Navigation, Position, Sequence, Step};

mod validate;
pub use validate::{StepError, validate_step};

mod schema;
pub use schema::{ROOT_KEY, Schema};

mod survey;
pub use survey::{BUILTIN_CATALOG, Survey};

mod session;
pub use session::{Advance, Session, SubmissionState};

mod backend;
pub use backend::{Prompt, Reply, SurveyBackend, run};

// Test backend for running surveys without user interaction
mod test_backend;
pub use test_backend::{TestBackend, TestBackendError};
