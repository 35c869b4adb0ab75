use async_trait::async_trait;

use crate::{Responses, SubmitError};

/// Something that accepts a complete answer set and stores it.
///
/// Implemented by the sheet-backed submission service (direct mode) and by
/// the HTTP client that posts to the submit endpoint. Callers submit at most
/// once at a time per session; implementations don't need to guard against
/// overlapping calls from the same session.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Submit the answers. On error nothing has been written.
    async fn submit(&self, answers: &Responses) -> Result<(), SubmitError>;
}
