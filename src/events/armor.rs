//! Armor-class events.

use serde::{Deserialize, Serialize};

use crate::core::{CharacterId, ModifierSource};

/// One sourced delta in an armor-class computation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorDelta {
    pub source: ModifierSource,
    pub delta: i32,
}

/// An armor-class value being assembled, with a running breakdown.
///
/// Every adjustment lands in both `total` and `breakdown`, so the final
/// value always equals the sum of its recorded parts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorClass {
    /// Whose armor class this is.
    pub defender: CharacterId,
    /// Running total.
    pub total: i32,
    /// Ordered record of every adjustment.
    pub breakdown: Vec<ArmorDelta>,
}

impl ArmorClass {
    /// Start an armor-class computation at zero.
    ///
    /// The host contributes the base value (armor, dexterity) as a
    /// Base-stage modifier so it shows up in the breakdown like anything
    /// else.
    pub fn new(defender: impl Into<CharacterId>) -> Self {
        Self {
            defender: defender.into(),
            total: 0,
            breakdown: Vec::new(),
        }
    }

    /// Apply a sourced adjustment.
    pub fn adjust(&mut self, source: ModifierSource, delta: i32) {
        self.total += delta;
        self.breakdown.push(ArmorDelta { source, delta });
    }
}
