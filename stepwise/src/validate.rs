use stepwise_types::{QuestionId, QuestionKind, ResponseValue};

use crate::Step;

/// Why the current step can't be left yet.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StepError {
    #[error("Please answer this question")]
    Missing { id: QuestionId },

    #[error("Please enter a number")]
    NotANumber { id: QuestionId },

    #[error("Please choose one of the listed options")]
    UnknownOption { id: QuestionId, value: String },

    #[error("A submission is in progress")]
    SubmissionPending,
}

/// Check that `value` is an acceptable answer to `step`.
///
/// An answer must be present: non-blank text, or a finite number. Numeric
/// questions also accept numeric text, and choice questions only accept
/// one of their options.
pub fn validate_step(step: &Step, value: Option<&ResponseValue>) -> Result<(), StepError> {
    let Some(value) = value.filter(|v| v.is_present()) else {
        return Err(StepError::Missing {
            id: step.id().clone(),
        });
    };

    match step.kind() {
        QuestionKind::Number if value.as_number().is_none() => Err(StepError::NotANumber {
            id: step.id().clone(),
        }),
        kind if kind.is_choice() => {
            let text = value.to_string();
            match step.options() {
                Some(options) if !options.iter().any(|o| *o == text) => {
                    Err(StepError::UnknownOption {
                        id: step.id().clone(),
                        value: text,
                    })
                }
                _ => Ok(()),
            }
        }
        _ => Ok(()),
    }
}
