use stepwise_types::{ResponseValue, SurveyError};

use crate::{Advance, Session, Step};

/// Everything a backend needs to render the current step.
#[derive(Debug, Clone)]
pub struct Prompt<'a> {
    /// The step to ask.
    pub step: &'a Step,

    /// The answer stored for this step, if the respondent was here before.
    pub answer: Option<&'a ResponseValue>,

    /// Progress through the full sequence in percent.
    pub progress: f32,

    /// Whether a "back" action leads anywhere.
    pub can_go_back: bool,

    /// Whether this is the last visible step (the "next" action submits).
    pub is_last: bool,

    /// Why the previous reply was not accepted.
    pub error: Option<String>,
}

/// What the respondent did with a prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Answer the step and move on.
    Answer(ResponseValue),

    /// Return to the previously shown step.
    Back,
}

/// Trait for backends that render one step at a time.
///
/// Backends only present prompts and report replies. Visibility, history
/// and validation stay in the [`Session`], so every backend behaves the same.
pub trait SurveyBackend {
    /// The error type for this backend.
    type Error: Into<anyhow::Error>;

    /// Show a message before the first step.
    fn prelude(&mut self, _message: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Present a step and wait for the respondent's reply.
    fn present(&mut self, prompt: &Prompt<'_>) -> Result<Reply, Self::Error>;

    /// Whether `error` means the respondent walked away (Ctrl+C, closed window).
    fn is_cancellation(_error: &Self::Error) -> bool {
        false
    }
}

fn survey_error<B: SurveyBackend>(err: B::Error) -> SurveyError {
    if B::is_cancellation(&err) {
        SurveyError::Cancelled
    } else {
        SurveyError::backend(err)
    }
}

/// Drive `session` with `backend` until the last visible step is answered.
///
/// Rejected answers are presented again with the error message. A backend
/// cancellation ends the run with [`SurveyError::Cancelled`]. Submission is
/// left to the caller.
pub fn run<B: SurveyBackend>(
    session: &mut Session<'_>,
    backend: &mut B,
) -> Result<(), SurveyError> {
    if let Some(prelude) = &session.survey().prelude {
        backend.prelude(prelude).map_err(survey_error::<B>)?;
    }

    let mut error = None;
    while let Some(step) = session.current_step() {
        let prompt = Prompt {
            step,
            answer: session.current_answer(),
            progress: session.progress(),
            can_go_back: session.can_go_back(),
            is_last: session.is_last(),
            error: error.take(),
        };

        match backend.present(&prompt).map_err(survey_error::<B>)? {
            Reply::Back => {
                session.back();
            }
            Reply::Answer(value) => {
                session.answer(value);
                match session.next() {
                    Ok(Advance::Moved(_)) => {}
                    Ok(Advance::Finished) => return Ok(()),
                    Err(err) => error = Some(err.to_string()),
                }
            }
        }
    }

    Ok(())
}
