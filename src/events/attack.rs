//! Attack-roll events.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{CharacterId, ModifierSource};

/// An attack roll being assembled, before the d20 is thrown.
///
/// Modifiers adjust the flat bonus and grant advantage or disadvantage;
/// the host resolves the grants (cancellation, actual rolling) after the
/// chain completes. Grants are recorded with their sources so the final
/// roll can be explained.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRoll {
    /// Who is attacking.
    pub attacker: CharacterId,
    /// Who is being attacked.
    pub target: CharacterId,
    /// Melee attack if true, ranged otherwise.
    pub melee: bool,
    /// Flat bonus added to the d20.
    pub bonus: i32,
    /// Everything granting advantage on this roll.
    pub advantage: SmallVec<[ModifierSource; 2]>,
    /// Everything imposing disadvantage on this roll.
    pub disadvantage: SmallVec<[ModifierSource; 2]>,
}

impl AttackRoll {
    /// Start an attack roll with no modifiers.
    pub fn new(attacker: impl Into<CharacterId>, target: impl Into<CharacterId>) -> Self {
        Self {
            attacker: attacker.into(),
            target: target.into(),
            melee: true,
            bonus: 0,
            advantage: SmallVec::new(),
            disadvantage: SmallVec::new(),
        }
    }

    /// Mark the attack as ranged (builder pattern).
    #[must_use]
    pub fn ranged(mut self) -> Self {
        self.melee = false;
        self
    }

    /// Set the starting bonus (builder pattern).
    #[must_use]
    pub fn with_bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
    }

    /// Add to the flat bonus.
    pub fn add_bonus(&mut self, delta: i32) {
        self.bonus += delta;
    }

    /// Grant advantage, recording who granted it.
    pub fn grant_advantage(&mut self, source: ModifierSource) {
        self.advantage.push(source);
    }

    /// Impose disadvantage, recording who imposed it.
    pub fn impose_disadvantage(&mut self, source: ModifierSource) {
        self.disadvantage.push(source);
    }

    /// Whether at least one source grants advantage.
    #[must_use]
    pub fn has_advantage(&self) -> bool {
        !self.advantage.is_empty()
    }

    /// Whether at least one source imposes disadvantage.
    #[must_use]
    pub fn has_disadvantage(&self) -> bool {
        !self.disadvantage.is_empty()
    }
}
