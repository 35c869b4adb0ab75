use stepwise_types::{Catalog, CatalogError};

use crate::{Schema, Sequence};

/// The catalog document shipped with the crate.
pub const BUILTIN_CATALOG: &str = include_str!("../catalog/questions.json");

const PRELUDE: &str =
    "Please answer honestly. Your responses are anonymous.\nEstimated time: 4 minutes";
const EPILOGUE: &str = "Your responses have been recorded successfully.\n\
                        We appreciate your contribution to this research.";

/// Everything about a survey that is fixed for the process lifetime:
/// the flattened sequence, the submission schema and the framing messages.
///
/// Build one at startup and share it by reference; sessions borrow it.
#[derive(Debug, Clone)]
pub struct Survey {
    /// Optional message shown before the first question.
    pub prelude: Option<String>,

    sequence: Sequence,
    schema: Schema,

    /// Optional message shown after a successful submission.
    pub epilogue: Option<String>,
}

impl Survey {
    /// Build a survey from a catalog. The catalog is checked first.
    pub fn from_catalog(catalog: &Catalog) -> Result<Self, CatalogError> {
        catalog.check()?;
        let sequence = Sequence::flatten(catalog);
        let schema = Schema::for_sequence(&sequence);
        Ok(Self {
            prelude: None,
            sequence,
            schema,
            epilogue: None,
        })
    }

    /// The survey described by [`BUILTIN_CATALOG`].
    pub fn builtin() -> Result<Self, CatalogError> {
        let catalog = Catalog::from_json(BUILTIN_CATALOG)?;
        let survey = Self::from_catalog(&catalog)?
            .with_prelude(PRELUDE)
            .with_epilogue(EPILOGUE);
        tracing::debug!(questions = survey.sequence.len(), "loaded builtin catalog");
        Ok(survey.map_schema(|schema| {
            schema.restrict(
                "member_status_check",
                ["Yes", "No"],
                "Please select if you are a member.",
            )
        }))
    }

    /// Set the prelude message.
    pub fn with_prelude(mut self, prelude: impl Into<String>) -> Self {
        self.prelude = Some(prelude.into());
        self
    }

    /// Set the epilogue message.
    pub fn with_epilogue(mut self, epilogue: impl Into<String>) -> Self {
        self.epilogue = Some(epilogue.into());
        self
    }

    /// Adjust the derived schema, e.g. to restrict a field's values.
    pub fn map_schema(mut self, f: impl FnOnce(Schema) -> Schema) -> Self {
        self.schema = f(self.schema);
        self
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}
