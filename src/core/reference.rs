//! Condition variant references.
//!
//! A `ConditionRef` is the (module, category, id) triple that addresses
//! exactly one condition variant. It is the discriminator the registry
//! dispatches on, and the tag written into every persisted payload.
//!
//! The canonical text form is `"module:category:id"`, e.g.
//! `"class:barbarian:rage"`. Both directions (render and parse) round-trip.

use serde::{Deserialize, Serialize};

use super::error::EngineError;

/// Addresses exactly one condition variant for registry dispatch.
///
/// Serialized as its canonical `"module:category:id"` string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ConditionRef {
    /// Content module the variant ships in ("class", "spell", "maneuver").
    pub module: String,
    /// Grouping within the module ("barbarian", "enchantment").
    pub category: String,
    /// Variant name ("rage", "bless").
    pub id: String,
}

impl ConditionRef {
    /// Create a reference from its three segments.
    pub fn new(
        module: impl Into<String>,
        category: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            category: category.into(),
            id: id.into(),
        }
    }

    /// Parse the canonical `"module:category:id"` form.
    ///
    /// Fails with [`EngineError::InvalidArgument`] unless the string has
    /// exactly three non-empty colon-separated segments.
    pub fn parse(s: &str) -> Result<Self, EngineError> {
        let mut segments = s.split(':');
        let (module, category, id) = match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(m), Some(c), Some(i), None) => (m, c, i),
            _ => {
                return Err(EngineError::InvalidArgument(format!(
                    "condition ref `{s}` is not of the form module:category:id"
                )))
            }
        };

        if module.is_empty() || category.is_empty() || id.is_empty() {
            return Err(EngineError::InvalidArgument(format!(
                "condition ref `{s}` has an empty segment"
            )));
        }

        Ok(Self::new(module, category, id))
    }
}

impl std::fmt::Display for ConditionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.module, self.category, self.id)
    }
}

impl std::str::FromStr for ConditionRef {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ConditionRef> for String {
    fn from(r: ConditionRef) -> Self {
        r.to_string()
    }
}

impl TryFrom<String> for ConditionRef {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}
