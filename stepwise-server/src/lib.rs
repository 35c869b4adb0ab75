//! HTTP surface for stepwise: accepts completed answer sets and records
//! them through [`SubmissionService`](stepwise_sheets::SubmissionService).

mod error;
pub use error::ApiError;

pub mod handlers;

mod router;
pub use router::{AppState, build_router};
