use std::{borrow::Borrow, collections::HashMap, hash::Hash};

use serde::{Deserialize, Serialize};

use crate::{QuestionId, ResponseValue};

/// The answers collected so far, keyed by question identifier.
///
/// Keys are inserted lazily as the user answers and are only ever
/// overwritten. Navigation never removes an answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Responses {
    values: HashMap<QuestionId, ResponseValue>,
}

impl Responses {
    /// Create a new empty answer set.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Insert (or overwrite) the answer for a question.
    pub fn insert(&mut self, id: impl Into<QuestionId>, value: impl Into<ResponseValue>) {
        self.values.insert(id.into(), value.into());
    }

    /// Get the answer for a question.
    pub fn get<Q>(&self, id: &Q) -> Option<&ResponseValue>
    where
        QuestionId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.values.get(id)
    }

    /// Check if a question has an answer, blank or not.
    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        QuestionId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.values.contains_key(id)
    }

    /// Render an answer as a sheet cell: its text, or an empty string when absent.
    pub fn cell<Q>(&self, id: &Q) -> String
    where
        QuestionId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(id).map(ToString::to_string).unwrap_or_default()
    }

    /// Get an iterator over all id-value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &ResponseValue)> {
        self.values.iter()
    }

    /// Get the number of answers.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no answers.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encode the answers as a JSON object, the shape the submit endpoint accepts.
    pub fn to_json(&self) -> serde_json::Value {
        let object = self
            .values
            .iter()
            .map(|(id, value)| {
                let json = match value {
                    ResponseValue::Text(s) => serde_json::Value::String(s.clone()),
                    ResponseValue::Number(n) => serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null),
                };
                (id.as_str().to_string(), json)
            })
            .collect();
        serde_json::Value::Object(object)
    }
}

impl<K, V> FromIterator<(K, V)> for Responses
where
    K: Into<QuestionId>,
    V: Into<ResponseValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Responses {
    type Item = (QuestionId, ResponseValue);
    type IntoIter = std::collections::hash_map::IntoIter<QuestionId, ResponseValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Responses {
    type Item = (&'a QuestionId, &'a ResponseValue);
    type IntoIter = std::collections::hash_map::Iter<'a, QuestionId, ResponseValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
