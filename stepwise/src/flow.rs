//! The flow engine: flattening a catalog and moving through it.
//!
//! Visibility is decided in exactly one place, [`Step::is_visible`]. Both the
//! forward move and the "is this the last question" lookahead go through
//! [`Sequence::advance`], so they can't disagree about which steps are hidden.

use serde::Serialize;
use stepwise_types::{Catalog, Question, QuestionId, QuestionKind, Responses, Section};

/// A question together with the section context it is shown in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    #[serde(flatten)]
    question: Question,

    #[serde(rename = "sectionTitle")]
    section_title: String,

    #[serde(rename = "sectionDescription", skip_serializing_if = "Option::is_none")]
    section_description: Option<String>,

    #[serde(rename = "sectionScale", skip_serializing_if = "Option::is_none")]
    section_scale: Option<Vec<String>>,
}

impl Step {
    fn new(section: &Section, question: &Question) -> Self {
        Self {
            question: question.clone(),
            section_title: section.title.clone(),
            section_description: section.description.clone(),
            section_scale: section.scale.clone(),
        }
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn id(&self) -> &QuestionId {
        self.question.id()
    }

    pub fn label(&self) -> &str {
        self.question.label()
    }

    pub fn kind(&self) -> QuestionKind {
        self.question.kind()
    }

    pub fn section_title(&self) -> &str {
        &self.section_title
    }

    pub fn section_description(&self) -> Option<&str> {
        self.section_description.as_deref()
    }

    /// The options to offer: the question's own list, or the section scale
    /// for scale questions without one.
    pub fn options(&self) -> Option<&[String]> {
        match (self.question.options(), self.question.kind()) {
            (Some(own), _) => Some(own),
            (None, QuestionKind::Scale) => self.section_scale.as_deref(),
            (None, _) => None,
        }
    }

    /// Whether this step is shown given the answers so far.
    pub fn is_visible(&self, answers: &Responses) -> bool {
        self.question.is_visible(answers)
    }
}

/// Where a session currently stands in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Showing the step at this index.
    At(usize),

    /// No further visible step.
    #[default]
    Exhausted,
}

impl Position {
    /// The index, unless exhausted.
    pub fn index(self) -> Option<usize> {
        match self {
            Self::At(index) => Some(index),
            Self::Exhausted => None,
        }
    }

    pub fn is_exhausted(self) -> bool {
        self == Self::Exhausted
    }
}

/// The catalog's questions in display order, ignoring section boundaries.
///
/// Built once from an immutable catalog and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Sequence {
    steps: Vec<Step>,
}

impl Sequence {
    /// Flatten a catalog, annotating each question with its section.
    pub fn flatten(catalog: &Catalog) -> Self {
        let steps = catalog
            .sections()
            .iter()
            .flat_map(|section| section.questions.iter().map(|q| Step::new(section, q)))
            .collect();
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The first visible step at or after `from`.
    fn first_visible_from(&self, from: usize, answers: &Responses) -> Position {
        self.steps
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, step)| step.is_visible(answers))
            .map_or(Position::Exhausted, |(index, _)| Position::At(index))
    }

    /// Where a fresh session begins.
    pub fn start(&self, answers: &Responses) -> Position {
        self.first_visible_from(0, answers)
    }

    /// The next visible step after `current`.
    ///
    /// Steps whose condition is unmet by `answers` are skipped. An
    /// out-of-range `current` yields [`Position::Exhausted`].
    pub fn advance(&self, current: usize, answers: &Responses) -> Position {
        if current >= self.steps.len() {
            return Position::Exhausted;
        }
        self.first_visible_from(current + 1, answers)
    }

    /// Whether no visible step follows `current`.
    pub fn is_last(&self, current: usize, answers: &Responses) -> bool {
        self.advance(current, answers).is_exhausted()
    }
}

/// Current position plus the stack of previously shown indices.
///
/// "Back" pops the stack rather than stepping to `current - 1`, because
/// forward skips make positions non-contiguous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    current: Position,
    history: Vec<usize>,
}

impl Navigation {
    pub fn new(start: Position) -> Self {
        Self {
            current: start,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> Position {
        self.current
    }

    /// Previously shown indices, oldest first.
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Move to `next`, remembering the step being left.
    pub fn forward(&mut self, next: usize) {
        if let Position::At(current) = self.current {
            self.history.push(current);
        }
        self.current = Position::At(next);
    }

    /// Return to the most recently shown step. No-op on an empty history.
    ///
    /// The restored step is not re-checked against current answers.
    pub fn back(&mut self) -> Option<usize> {
        let previous = self.history.pop()?;
        self.current = Position::At(previous);
        Some(previous)
    }
}
