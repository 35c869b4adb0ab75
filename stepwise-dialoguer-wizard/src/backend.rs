//! Dialoguer backend implementation for SurveyBackend trait.

use dialoguer::{
    Input, Select,
    theme::{ColorfulTheme, SimpleTheme, Theme},
};
use stepwise::{Prompt, Reply, ResponseValue, Step, SurveyBackend};
use thiserror::Error;

/// Label of the extra entry that returns to the previous question.
pub const BACK_ITEM: &str = "← Back";

/// Typed into a text prompt to return to the previous question.
pub const BACK_INPUT: &str = "<";

/// Error type for the Dialoguer backend.
#[derive(Debug, Error)]
pub enum DialoguerError {
    /// User cancelled the survey (e.g., pressed Ctrl+C or Escape).
    #[error("Survey cancelled by user")]
    Cancelled,

    /// An I/O error occurred during prompting.
    #[error("Dialoguer error: {0}")]
    Dialoguer(#[from] dialoguer::Error),
}

/// Helper to check if a dialoguer error is a cancellation (Ctrl+C / Escape)
fn is_cancelled(err: &dialoguer::Error) -> bool {
    matches!(err, dialoguer::Error::IO(io_err) if io_err.kind() == std::io::ErrorKind::Interrupted)
}

impl DialoguerError {
    fn from_prompt(err: dialoguer::Error) -> Self {
        if is_cancelled(&err) {
            Self::Cancelled
        } else {
            Self::Dialoguer(err)
        }
    }
}

/// Dialoguer backend for interactive CLI prompts.
///
/// Shows one question at a time with a progress indicator. Section headings
/// are printed when the respondent enters a new section.
#[derive(Debug, Default, Clone)]
pub struct DialoguerBackend {
    /// Use colorful theme for prompts.
    colorful: bool,

    /// Title of the section whose heading was printed last.
    section: Option<String>,
}

impl DialoguerBackend {
    /// Create a new Dialoguer backend with default (colorful) theme.
    pub fn new() -> Self {
        Self {
            colorful: true,
            section: None,
        }
    }

    /// Create a backend with plain (no color) theme.
    pub fn plain() -> Self {
        Self {
            colorful: false,
            section: None,
        }
    }

    fn theme(&self) -> Box<dyn Theme> {
        if self.colorful {
            Box::new(ColorfulTheme::default())
        } else {
            Box::new(SimpleTheme)
        }
    }

    fn print_section(&mut self, step: &Step) {
        if self.section.as_deref() == Some(step.section_title()) {
            return;
        }
        println!();
        println!("== {} ==", step.section_title());
        if let Some(description) = step.section_description() {
            println!("{description}");
        }
        println!();
        self.section = Some(step.section_title().to_string());
    }

    fn ask_choice(
        &self,
        label: &str,
        options: &[String],
        prompt: &Prompt<'_>,
    ) -> Result<Reply, DialoguerError> {
        let theme = self.theme();
        let items = choice_items(options, prompt.can_go_back);
        let default = default_index(options, prompt.answer);

        let selection = Select::with_theme(theme.as_ref())
            .with_prompt(label)
            .items(&items)
            .default(default)
            .interact()
            .map_err(DialoguerError::from_prompt)?;

        Ok(match options.get(selection) {
            Some(option) => Reply::Answer(ResponseValue::from(option.as_str())),
            None => Reply::Back,
        })
    }

    fn ask_text(&self, label: &str, prompt: &Prompt<'_>) -> Result<Reply, DialoguerError> {
        let theme = self.theme();
        let label = if prompt.can_go_back {
            format!("{label} ('{BACK_INPUT}' to go back)")
        } else {
            label.to_string()
        };

        let mut input = Input::<String>::with_theme(theme.as_ref())
            .with_prompt(label)
            .allow_empty(true);
        if let Some(previous) = prompt.answer {
            input = input.with_initial_text(previous.to_string());
        }

        let text = input.interact_text().map_err(DialoguerError::from_prompt)?;
        Ok(text_reply(text, prompt.can_go_back))
    }
}

/// The options, followed by the back entry when going back is possible.
fn choice_items(options: &[String], can_go_back: bool) -> Vec<&str> {
    let mut items: Vec<&str> = options.iter().map(String::as_str).collect();
    if can_go_back {
        items.push(BACK_ITEM);
    }
    items
}

/// Preselect the stored answer, or the first option.
fn default_index(options: &[String], answer: Option<&ResponseValue>) -> usize {
    answer
        .and_then(ResponseValue::as_str)
        .and_then(|answer| options.iter().position(|option| option == answer))
        .unwrap_or(0)
}

fn text_reply(text: String, can_go_back: bool) -> Reply {
    let trimmed = text.trim();
    if can_go_back && trimmed == BACK_INPUT {
        Reply::Back
    } else {
        Reply::Answer(ResponseValue::from(trimmed))
    }
}

impl SurveyBackend for DialoguerBackend {
    type Error = DialoguerError;

    fn prelude(&mut self, message: &str) -> Result<(), Self::Error> {
        println!("{message}");
        Ok(())
    }

    fn present(&mut self, prompt: &Prompt<'_>) -> Result<Reply, Self::Error> {
        let step = prompt.step;
        self.print_section(step);

        if let Some(message) = &prompt.error {
            println!("Error: {message}");
        }

        let label = format!("[{:>3.0}%] {}", prompt.progress, step.label());
        match step.options() {
            Some(options) if step.kind().is_choice() => self.ask_choice(&label, options, prompt),
            _ => self.ask_text(&label, prompt),
        }
    }

    fn is_cancellation(error: &Self::Error) -> bool {
        matches!(error, DialoguerError::Cancelled)
    }
}
