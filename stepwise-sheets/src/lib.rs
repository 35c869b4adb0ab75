//! # stepwise-sheets
//!
//! Records completed stepwise answer sets as rows of a Google spreadsheet.
//!
//! [`SubmissionService`] is the single entry point: it validates a candidate
//! against the survey [`Schema`](stepwise::Schema), maps it onto the fixed
//! [`SheetLayout`] and appends one row through a [`SheetSink`].
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use stepwise::Survey;
//! use stepwise_sheets::{MemorySheet, SheetLayout, SubmissionService, sample_answers};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let survey = Survey::builtin().unwrap();
//! let sheet = Arc::new(MemorySheet::new());
//! let service = SubmissionService::new(
//!     survey.schema().clone(),
//!     SheetLayout::default(),
//!     sheet.clone(),
//! );
//!
//! let receipt = service
//!     .submit(&sample_answers(&survey).to_json(), Some("203.0.113.5, 10.0.0.1"))
//!     .await
//!     .unwrap();
//! assert_eq!(receipt.ip_address, "203.0.113.5");
//! assert_eq!(sheet.data_rows().await.len(), 1);
//! # }
//! ```

mod config;
pub use config::{
    CLIENT_EMAIL_VAR, DEFAULT_SHEET_TAB, PRIVATE_KEY_VAR, SHEET_ID_VAR, SHEET_TAB_VAR,
    SheetsConfig,
};

mod error;
pub use error::{ConfigError, SheetsError};

mod layout;
pub use layout::{
    IP_ADDRESS, SHEET_HEADERS, SheetLayout, SubmissionRecord, TIMESTAMP, UNKNOWN_IP, client_ip,
    iso_timestamp,
};

mod sink;
pub use sink::{MemorySheet, SheetSink};

mod google;
pub use google::GoogleSheets;

mod service;
pub use service::{Receipt, SubmissionService};

mod maintenance;
pub use maintenance::{VerifyError, VerifyReport, sample_answers, sync_headers, verify};
