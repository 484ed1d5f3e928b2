//! Modifier provenance records.
//!
//! Every contribution a modifier makes to an event (a damage component,
//! an advantage grant, an armor-class delta) carries a `ModifierSource`
//! so the final event explains itself: the host can render a breakdown
//! without the engine knowing what any modifier meant.

use serde::{Deserialize, Serialize};

use super::reference::ConditionRef;

/// Where a modifier contribution came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierSource {
    /// Display name, e.g. "Rage" or "Plate Armor".
    pub name: String,
    /// Machine-readable origin: a condition ref string, or a host-chosen
    /// marker such as "base".
    pub origin: String,
}

impl ModifierSource {
    /// Create a source record.
    pub fn new(name: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
        }
    }

    /// Source for a condition variant, using the ref string as the origin.
    pub fn condition(name: impl Into<String>, reference: &ConditionRef) -> Self {
        Self::new(name, reference.to_string())
    }

    /// Source for a host-provided base value.
    pub fn base(name: impl Into<String>) -> Self {
        Self::new(name, "base")
    }
}

impl std::fmt::Display for ModifierSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_source() {
        let r = ConditionRef::new("class", "barbarian", "rage");
        let source = ModifierSource::condition("Rage", &r);

        assert_eq!(source.name, "Rage");
        assert_eq!(source.origin, "class:barbarian:rage");
        assert_eq!(format!("{source}"), "Rage (class:barbarian:rage)");
    }

    #[test]
    fn test_base_source() {
        let source = ModifierSource::base("Longsword");
        assert_eq!(source.origin, "base");
    }
}
