use serde::{Deserialize, Serialize};

use crate::{QuestionId, ResponseValue, Responses};

/// A single question in a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// The key this question's answer is stored under.
    id: QuestionId,

    /// The prompt text shown to the user.
    label: String,

    /// The kind of question (determines the input control).
    #[serde(rename = "type")]
    kind: QuestionKind,

    /// Fixed option list. Scale questions without one inherit the section scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,

    /// Visibility rule. Unconditional questions are always shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    conditional: Option<Condition>,
}

impl Question {
    /// Create a new unconditional question without options.
    pub fn new(id: impl Into<QuestionId>, label: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            options: None,
            conditional: None,
        }
    }

    /// Set the fixed option list.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Only show this question when `field` was answered with exactly `value`.
    pub fn shown_when(mut self, field: impl Into<QuestionId>, value: impl Into<String>) -> Self {
        self.conditional = Some(Condition::new(field, value));
        self
    }

    /// Get the question identifier.
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    /// Get the prompt text.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get the question kind.
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    /// Get the question's own option list, if any.
    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }

    /// Get the visibility rule, if any.
    pub fn conditional(&self) -> Option<&Condition> {
        self.conditional.as_ref()
    }

    /// Check whether this question is shown given the answers so far.
    pub fn is_visible(&self, answers: &Responses) -> bool {
        self.conditional
            .as_ref()
            .is_none_or(|condition| condition.is_met(answers))
    }
}

/// The kind of question, determining the input control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Free text input.
    Text,

    /// Numeric input.
    Number,

    /// Single choice from a dropdown.
    Select,

    /// Single choice from radio buttons.
    Radio,

    /// Single choice on an ordinal scale.
    Scale,
}

impl QuestionKind {
    /// Check if this kind picks one value out of an option list.
    pub fn is_choice(self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::Scale)
    }

    /// The name used in catalog documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Scale => "scale",
        }
    }
}

/// A visibility rule: the question is shown only when the answer to `field`
/// is exactly the text `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// The question whose answer is inspected.
    pub field: QuestionId,

    /// The answer that makes the question visible.
    pub value: String,
}

impl Condition {
    /// Create a new condition.
    pub fn new(field: impl Into<QuestionId>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Strict equality against a text answer. A missing answer or a numeric
    /// answer never satisfies the condition.
    pub fn is_met(&self, answers: &Responses) -> bool {
        matches!(answers.get(&self.field), Some(ResponseValue::Text(s)) if *s == self.value)
    }
}
