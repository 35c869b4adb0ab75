//! # stepwise-dialoguer-wizard
//!
//! Dialoguer wizard backend for stepwise.
//!
//! Questions are presented one at a time in a classic CLI wizard style.
//! Choice questions get a "← Back" entry; in text prompts, typing `<` goes
//! back.
//!
//! ## Example
//!
//! ```rust,no_run
//! use stepwise::{Session, Survey, run};
//! use stepwise_dialoguer_wizard::DialoguerBackend;
//!
//! fn main() -> anyhow::Result<()> {
//!     let survey = Survey::builtin()?;
//!     let mut session = Session::new(&survey);
//!     run(&mut session, &mut DialoguerBackend::new())?;
//!     println!("{} answers collected", session.answers().len());
//!     Ok(())
//! }
//! ```

mod backend;
pub use backend::{BACK_INPUT, BACK_ITEM, DialoguerBackend, DialoguerError};

mod submitter;
pub use submitter::HttpSubmitter;
