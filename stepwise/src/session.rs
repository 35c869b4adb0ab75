//! A single respondent's pass through a survey.

use stepwise_types::{ResponseValue, Responses, SubmitError, Submitter};

use crate::{Navigation, Position, Step, StepError, Survey, validate_step};

/// Outcome of [`Session::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the step at this index.
    Moved(usize),

    /// The current step is the last visible one; the session is ready to submit.
    Finished,
}

/// Where the session's submission stands.
#[derive(Debug, Clone, Default)]
pub enum SubmissionState {
    #[default]
    Idle,

    /// Waiting for the submitter. Input is disabled.
    Pending,

    /// Stored successfully. Further submissions are rejected.
    Submitted,

    /// The last attempt failed. Answers are kept and submit is enabled again.
    Failed(SubmitError),
}

impl SubmissionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted)
    }

    /// The message to show after a failed attempt.
    pub fn error(&self) -> Option<&SubmitError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Answers plus navigation state for one respondent.
///
/// Answers are only ever overwritten by answering the same question again;
/// navigating back or changing an earlier answer never clears them.
#[derive(Debug, Clone)]
pub struct Session<'s> {
    survey: &'s Survey,
    answers: Responses,
    navigation: Navigation,
    submission: SubmissionState,
}

impl<'s> Session<'s> {
    /// Start a session at the first visible step.
    pub fn new(survey: &'s Survey) -> Self {
        Self::with_answers(survey, Responses::new())
    }

    /// Start a session with answers already filled in.
    pub fn with_answers(survey: &'s Survey, answers: Responses) -> Self {
        let start = survey.sequence().start(&answers);
        Self {
            survey,
            answers,
            navigation: Navigation::new(start),
            submission: SubmissionState::Idle,
        }
    }

    pub fn survey(&self) -> &'s Survey {
        self.survey
    }

    pub fn answers(&self) -> &Responses {
        &self.answers
    }

    pub fn into_answers(self) -> Responses {
        self.answers
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn position(&self) -> Position {
        self.navigation.current()
    }

    /// The step being shown, unless the sequence is exhausted.
    pub fn current_step(&self) -> Option<&'s Step> {
        let index = self.position().index()?;
        self.survey.sequence().get(index)
    }

    /// The stored answer to the current step.
    pub fn current_answer(&self) -> Option<&ResponseValue> {
        self.current_step()
            .and_then(|step| self.answers.get(step.id()))
    }

    /// Store an answer to the current step, replacing any earlier one.
    ///
    /// Ignored while a submission is pending or once the sequence is exhausted.
    pub fn answer(&mut self, value: impl Into<ResponseValue>) -> bool {
        if self.submission.is_pending() {
            return false;
        }
        let Some(step) = self.current_step() else {
            return false;
        };
        self.answers.insert(step.id(), value);
        true
    }

    /// Check whether the current answer allows moving on.
    pub fn check_current(&self) -> Result<(), StepError> {
        if self.submission.is_pending() {
            return Err(StepError::SubmissionPending);
        }
        match self.current_step() {
            Some(step) => validate_step(step, self.current_answer()),
            None => Ok(()),
        }
    }

    /// Whether the "next" control should be enabled.
    pub fn can_advance(&self) -> bool {
        self.check_current().is_ok()
    }

    /// Whether the current step is the last visible one.
    pub fn is_last(&self) -> bool {
        match self.position() {
            Position::At(index) => self.survey.sequence().is_last(index, &self.answers),
            Position::Exhausted => true,
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.submission.is_pending() && self.navigation.can_go_back()
    }

    /// Move to the next visible step.
    ///
    /// The current answer is re-checked even if the caller already did so.
    pub fn next(&mut self) -> Result<Advance, StepError> {
        self.check_current()?;
        let Position::At(current) = self.position() else {
            return Ok(Advance::Finished);
        };
        match self.survey.sequence().advance(current, &self.answers) {
            Position::At(next) => {
                self.navigation.forward(next);
                tracing::trace!(from = current, to = next, "advanced");
                Ok(Advance::Moved(next))
            }
            Position::Exhausted => Ok(Advance::Finished),
        }
    }

    /// Return to the previously shown step. No-op on the first step.
    pub fn back(&mut self) -> Option<usize> {
        if self.submission.is_pending() {
            return None;
        }
        let previous = self.navigation.back()?;
        tracing::trace!(to = previous, "went back");
        Some(previous)
    }

    /// Progress through the full sequence in percent.
    pub fn progress(&self) -> f32 {
        let total = self.survey.sequence().len();
        match self.position() {
            Position::At(index) if total > 0 => (index + 1) as f32 / total as f32 * 100.0,
            _ => 100.0,
        }
    }

    /// Enter the pending state and return the validated payload.
    ///
    /// Fails without changing state if a submission is already pending or
    /// done. Validation failures are recorded as the last error.
    pub fn begin_submit(&mut self) -> Result<Responses, SubmitError> {
        match self.submission {
            SubmissionState::Pending => return Err(SubmitError::InFlight),
            SubmissionState::Submitted => return Err(SubmitError::AlreadySubmitted),
            SubmissionState::Idle | SubmissionState::Failed(_) => {}
        }

        let payload = self
            .current_step()
            .map_or(Ok(()), |step| {
                validate_step(step, self.current_answer()).map_err(|err| {
                    let mut errors = stepwise_types::ValidationErrors::new();
                    errors.add(step.id(), err.to_string());
                    errors
                })
            })
            .and_then(|()| self.survey.schema().check(&self.answers));

        match payload {
            Ok(payload) => {
                self.submission = SubmissionState::Pending;
                tracing::debug!(answers = payload.len(), "submission started");
                Ok(payload)
            }
            Err(errors) => {
                let err = SubmitError::Validation(errors);
                self.submission = SubmissionState::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Leave the pending state with the submitter's outcome.
    pub fn finish_submit(&mut self, outcome: Result<(), SubmitError>) -> Result<(), SubmitError> {
        match &outcome {
            Ok(()) => {
                tracing::info!("submission stored");
                self.submission = SubmissionState::Submitted;
            }
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "submission failed");
                self.submission = SubmissionState::Failed(err.clone());
            }
        }
        outcome
    }

    /// Validate, hand the answers to `submitter` and record the outcome.
    ///
    /// On failure the answers stay intact and submit can be invoked again.
    pub async fn submit(&mut self, submitter: &dyn Submitter) -> Result<(), SubmitError> {
        let payload = self.begin_submit()?;
        let outcome = submitter.submit(&payload).await;
        self.finish_submit(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use stepwise_types::{Catalog, Question, QuestionKind, Section};

    use super::*;

    fn survey() -> Survey {
        Survey::from_catalog(&Catalog::new(vec![Section::new(
            "Demographics",
            vec![
                Question::new("has_children", "Children?", QuestionKind::Radio)
                    .with_options(["Yes", "No"]),
                Question::new("number_of_children", "How many?", QuestionKind::Number)
                    .shown_when("has_children", "Yes"),
                Question::new("member_status", "Status", QuestionKind::Select)
                    .with_options(["Lifelong", "Convert"]),
            ],
        )]))
        .unwrap()
    }

    struct Recorder {
        fail_with: Option<SubmitError>,
        seen: Mutex<Vec<Responses>>,
    }

    impl Recorder {
        fn ok() -> Self {
            Self {
                fail_with: None,
                seen: Mutex::new(vec![]),
            }
        }

        fn failing(err: SubmitError) -> Self {
            Self {
                fail_with: Some(err),
                seen: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait::async_trait]
    impl Submitter for Recorder {
        async fn submit(&self, answers: &Responses) -> Result<(), SubmitError> {
            self.seen.lock().unwrap().push(answers.clone());
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn next_is_blocked_without_answer() {
        let survey = survey();
        let mut session = Session::new(&survey);
        assert!(!session.can_advance());
        assert!(matches!(session.next(), Err(StepError::Missing { .. })));
        assert_eq!(session.position(), Position::At(0));
    }

    #[test]
    fn skips_conditional_question() {
        let survey = survey();
        let mut session = Session::new(&survey);
        session.answer("No");
        assert_eq!(session.next(), Ok(Advance::Moved(2)));
        assert!(session.is_last());
    }

    #[test]
    fn finishing_does_not_move() {
        let survey = survey();
        let mut session = Session::new(&survey);
        session.answer("No");
        session.next().unwrap();
        session.answer("Convert");
        assert_eq!(session.next(), Ok(Advance::Finished));
        assert_eq!(session.position(), Position::At(2));
        assert_eq!(session.navigation().history(), [0]);
    }

    #[test]
    fn back_keeps_answers() {
        let survey = survey();
        let mut session = Session::new(&survey);
        session.answer("Yes");
        session.next().unwrap();
        session.answer("3");
        session.next().unwrap();

        assert_eq!(session.back(), Some(1));
        assert_eq!(session.current_answer(), Some(&ResponseValue::from("3")));
        assert_eq!(session.back(), Some(0));
        assert_eq!(session.back(), None);
        assert_eq!(session.answers().cell("number_of_children"), "3");
    }

    #[test]
    fn changing_dependency_keeps_orphaned_answer() {
        let survey = survey();
        let mut session = Session::new(&survey);
        session.answer("Yes");
        session.next().unwrap();
        session.answer("2");
        session.back();
        session.answer("No");

        assert_eq!(session.next(), Ok(Advance::Moved(2)));
        assert_eq!(session.answers().cell("number_of_children"), "2");
    }

    #[test]
    fn progress_counts_full_sequence() {
        let survey = survey();
        let mut session = Session::new(&survey);
        assert!((session.progress() - 100.0 / 3.0).abs() < 0.01);
        session.answer("No");
        session.next().unwrap();
        assert_eq!(session.progress(), 100.0);
    }

    #[test]
    fn incomplete_answers_fail_validation() {
        let survey = survey();
        let mut session = Session::new(&survey);
        session.answer("No");
        let err = session.begin_submit().unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert!(!session.submission().is_pending());
        assert!(session.submission().error().is_some());
    }

    #[test]
    fn second_begin_is_rejected_while_pending() {
        let survey = survey();
        let mut session = Session::new(&survey);
        session.answer("No");
        session.next().unwrap();
        session.answer("Lifelong");

        session.begin_submit().unwrap();
        let err = session.begin_submit().unwrap_err();
        assert_eq!(err, SubmitError::InFlight);
        assert!(!err.is_retryable());
        assert!(!session.answer("Convert"));
        assert!(session.next().is_err());
        assert_eq!(session.back(), None);
    }

    #[tokio::test]
    async fn successful_submit_sends_answers_once() {
        let survey = survey();
        let mut session = Session::new(&survey);
        session.answer("No");
        session.next().unwrap();
        session.answer("Lifelong");

        let recorder = Recorder::ok();
        session.submit(&recorder).await.unwrap();
        assert!(session.submission().is_submitted());
        assert!(matches!(
            session.submit(&recorder).await,
            Err(SubmitError::AlreadySubmitted)
        ));

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].cell("member_status"), "Lifelong");
    }

    #[tokio::test]
    async fn failed_submit_keeps_answers_and_allows_retry() {
        let survey = survey();
        let mut session = Session::new(&survey);
        session.answer("No");
        session.next().unwrap();
        session.answer("Lifelong");
        let before = session.answers().clone();

        let failing = Recorder::failing(SubmitError::transport("connection refused"));
        let err = session.submit(&failing).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(session.answers(), &before);
        assert!(!session.submission().is_pending());

        session.submit(&Recorder::ok()).await.unwrap();
        assert!(session.submission().is_submitted());
    }
}
