//! Core types for stepwise.
//!
//! This crate provides the foundational types for defining surveys:
//! - `Catalog`, `Section` - The static, ordered question catalog
//! - `Question`, `QuestionKind` and `Condition` - Individual questions and their visibility
//! - `Responses`, `ResponseValue` and `QuestionId` - The answer set
//! - `SubmitError` and the `Submitter` trait - The submission boundary

mod question_id;
pub use question_id::QuestionId;

mod response_value;
pub use response_value::ResponseValue;

mod responses;
pub use responses::Responses;

mod question;
pub use question::{Condition, Question, QuestionKind};

mod catalog;
pub use catalog::{Catalog, Section};

mod error;
pub use error::{CatalogError, SubmitError, SurveyError, ValidationErrors};

mod traits;
pub use traits::Submitter;
