use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{CatalogError, Question, QuestionKind};

/// A titled group of questions.
///
/// Sections only exist for presentation. Once a catalog is flattened, a
/// question keeps its section's title, description and default scale but the
/// boundaries themselves no longer matter for navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Heading shown above every question of this section.
    pub title: String,

    /// Optional instructions shown under the heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default options for scale questions that don't carry their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec<String>>,

    /// The questions in display order.
    pub questions: Vec<Question>,
}

impl Section {
    /// Create a new section with the given title and questions.
    pub fn new(title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            title: title.into(),
            description: None,
            scale: None,
            questions,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the default scale.
    pub fn with_scale<I, S>(mut self, scale: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scale = Some(scale.into_iter().map(Into::into).collect());
        self
    }

    /// The options a question of this section offers: its own list, or the
    /// section scale for scale questions that don't define one.
    pub fn options_for<'a>(&'a self, question: &'a Question) -> Option<&'a [String]> {
        match (question.options(), question.kind()) {
            (Some(own), _) => Some(own),
            (None, QuestionKind::Scale) => self.scale.as_deref(),
            (None, _) => None,
        }
    }
}

/// The ordered set of sections that make up a survey.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    sections: Vec<Section>,
}

impl Catalog {
    /// Create a catalog from sections without checking it.
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Parse a catalog document (a JSON array of sections) and check it.
    pub fn from_json(document: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(document)?;
        catalog.check()?;
        Ok(catalog)
    }

    /// Get the sections.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Iterate over all questions in display order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|s| s.questions.iter())
    }

    /// Check if the catalog has no questions.
    pub fn is_empty(&self) -> bool {
        self.questions().next().is_none()
    }

    /// Get the total number of questions.
    pub fn len(&self) -> usize {
        self.questions().count()
    }

    /// Check the structural rules a renderer relies on.
    ///
    /// - identifiers are non-empty and unique
    /// - conditions refer to a question of this catalog
    /// - choice questions resolve to a non-empty option list
    pub fn check(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for question in self.questions() {
            if question.id().is_empty() {
                return Err(CatalogError::EmptyId {
                    label: question.label().to_string(),
                });
            }
            if !seen.insert(question.id()) {
                return Err(CatalogError::DuplicateId(question.id().clone()));
            }
        }

        for section in &self.sections {
            for question in &section.questions {
                if let Some(condition) = question.conditional()
                    && !seen.contains(&condition.field)
                {
                    return Err(CatalogError::UnknownDependency {
                        question: question.id().clone(),
                        field: condition.field.clone(),
                    });
                }

                if question.kind().is_choice()
                    && section.options_for(question).is_none_or(<[_]>::is_empty)
                {
                    return Err(CatalogError::MissingOptions {
                        question: question.id().clone(),
                        kind: question.kind().as_str(),
                    });
                }
            }
        }

        Ok(())
    }
}
