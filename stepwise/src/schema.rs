//! Whole-submission validation.
//!
//! The schema is derived from the sequence: every unconditional question is a
//! required non-empty string, conditional questions are optional. Numeric
//! questions may also be posted as JSON numbers. Keys that aren't questions
//! are dropped from the parsed result.

use serde_json::Value;
use stepwise_types::{QuestionId, QuestionKind, ResponseValue, Responses, ValidationErrors};

use crate::Sequence;

const REQUIRED: &str = "Required";
const EMPTY: &str = "Please select an option";
const NOT_A_STRING: &str = "Expected a string";
const NOT_AN_OBJECT: &str = "Expected an object";

/// The key under which a non-object candidate is reported.
pub const ROOT_KEY: &str = "$";

#[derive(Debug, Clone, PartialEq)]
struct FieldRule {
    id: QuestionId,
    required: bool,
    accepts_number: bool,
    choices: Option<Choices>,
}

#[derive(Debug, Clone, PartialEq)]
struct Choices {
    allowed: Vec<String>,
    message: String,
}

/// Validation rules for a complete answer set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<FieldRule>,
}

impl Schema {
    /// Derive the rules from a flattened sequence.
    pub fn for_sequence(sequence: &Sequence) -> Self {
        let fields = sequence
            .steps()
            .iter()
            .map(|step| FieldRule {
                id: step.id().clone(),
                required: step.question().conditional().is_none(),
                accepts_number: step.kind() == QuestionKind::Number,
                choices: None,
            })
            .collect();
        Self { fields }
    }

    /// Restrict a field to a fixed set of values.
    pub fn restrict<I, S>(mut self, id: &str, allowed: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(rule) = self.fields.iter_mut().find(|f| f.id.as_str() == id) {
            rule.choices = Some(Choices {
                allowed: allowed.into_iter().map(Into::into).collect(),
                message: message.into(),
            });
        }
        self
    }

    /// Identifiers the schema knows about, in sequence order.
    pub fn field_ids(&self) -> impl Iterator<Item = &QuestionId> {
        self.fields.iter().map(|f| &f.id)
    }

    /// Whether a field must be answered.
    pub fn is_required(&self, id: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.required && f.id.as_str() == id)
    }

    /// Validate a JSON candidate and return the accepted answers.
    pub fn parse(&self, candidate: &Value) -> Result<Responses, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let Some(object) = candidate.as_object() else {
            errors.add(ROOT_KEY, NOT_AN_OBJECT);
            return Err(errors);
        };

        let mut accepted = Responses::new();
        for rule in &self.fields {
            match (object.get(rule.id.as_str()), rule.required) {
                (None | Some(Value::Null), true) => errors.add(rule.id.clone(), REQUIRED),
                (None | Some(Value::Null), false) => {}
                (Some(Value::String(s)), _) => {
                    if rule.required && s.is_empty() {
                        errors.add(rule.id.clone(), EMPTY);
                    } else if let Some(choices) = &rule.choices
                        && !choices.allowed.contains(s)
                    {
                        errors.add(rule.id.clone(), choices.message.clone());
                    } else {
                        accepted.insert(rule.id.clone(), s.as_str());
                    }
                }
                (Some(Value::Number(n)), _) if rule.accepts_number => match n.as_f64() {
                    Some(n) => accepted.insert(rule.id.clone(), ResponseValue::Number(n)),
                    None => errors.add(rule.id.clone(), NOT_A_STRING),
                },
                (Some(_), _) => errors.add(rule.id.clone(), NOT_A_STRING),
            }
        }

        errors.into_result(accepted)
    }

    /// Validate an in-memory answer set.
    pub fn check(&self, answers: &Responses) -> Result<Responses, ValidationErrors> {
        self.parse(&answers.to_json())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stepwise_types::{Catalog, Question, Section};

    use super::*;

    fn schema() -> Schema {
        let catalog = Catalog::new(vec![Section::new(
            "Demographics",
            vec![
                Question::new("member_status_check", "Member?", QuestionKind::Radio)
                    .with_options(["Yes", "No"]),
                Question::new("has_children", "Children?", QuestionKind::Radio)
                    .with_options(["Yes", "No"]),
                Question::new("number_of_children", "How many?", QuestionKind::Number)
                    .shown_when("has_children", "Yes"),
            ],
        )]);
        Schema::for_sequence(&Sequence::flatten(&catalog)).restrict(
            "member_status_check",
            ["Yes", "No"],
            "Please select if you are a member.",
        )
    }

    #[test]
    fn accepts_complete_candidate_without_optional_field() {
        let parsed = schema()
            .parse(&json!({ "member_status_check": "Yes", "has_children": "No" }))
            .unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(!parsed.contains("number_of_children"));
    }

    #[test]
    fn optional_numeric_field_accepts_string_or_number() {
        let schema = schema();
        let as_text = schema
            .parse(&json!({
                "member_status_check": "No",
                "has_children": "Yes",
                "number_of_children": "2"
            }))
            .unwrap();
        assert_eq!(as_text.cell("number_of_children"), "2");

        let as_number = schema
            .parse(&json!({
                "member_status_check": "No",
                "has_children": "Yes",
                "number_of_children": 2
            }))
            .unwrap();
        assert_eq!(
            as_number.get("number_of_children"),
            Some(&ResponseValue::Number(2.0))
        );
    }

    #[test]
    fn reports_every_failing_field() {
        let errors = schema()
            .parse(&json!({ "member_status_check": "Maybe", "has_children": "" }))
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get("member_status_check"),
            Some("Please select if you are a member.")
        );
        assert_eq!(errors.get("has_children"), Some("Please select an option"));
    }

    #[test]
    fn missing_required_field() {
        let errors = schema()
            .parse(&json!({ "member_status_check": "Yes" }))
            .unwrap_err();
        assert_eq!(errors.get("has_children"), Some("Required"));
    }

    #[test]
    fn number_for_text_field_is_rejected() {
        let errors = schema()
            .parse(&json!({ "member_status_check": "Yes", "has_children": 1 }))
            .unwrap_err();
        assert_eq!(errors.get("has_children"), Some("Expected a string"));
    }

    #[test]
    fn unknown_keys_are_dropped() {
        let parsed = schema()
            .parse(&json!({
                "member_status_check": "Yes",
                "has_children": "No",
                "timestamp": "forged",
                "ip_address": "1.2.3.4"
            }))
            .unwrap();
        assert!(!parsed.contains("timestamp"));
        assert!(!parsed.contains("ip_address"));
    }

    #[test]
    fn non_object_is_rejected() {
        let errors = schema().parse(&json!(["Yes"])).unwrap_err();
        assert_eq!(errors.get(ROOT_KEY), Some("Expected an object"));
    }

    #[test]
    fn required_flags() {
        let schema = schema();
        assert!(schema.is_required("has_children"));
        assert!(!schema.is_required("number_of_children"));
    }
}
