//! Saving-throw events.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{CharacterId, ModifierSource};

/// The six abilities a saving throw can be keyed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

/// A saving throw being assembled, before the d20 is thrown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingThrow {
    /// Who is saving.
    pub saver: CharacterId,
    /// Which ability the save is keyed to.
    pub ability: Ability,
    /// Flat bonus added to the d20.
    pub bonus: i32,
    /// Everything granting advantage on this save.
    pub advantage: SmallVec<[ModifierSource; 2]>,
    /// Everything imposing disadvantage on this save.
    pub disadvantage: SmallVec<[ModifierSource; 2]>,
}

impl SavingThrow {
    /// Start a saving throw with no modifiers.
    pub fn new(saver: impl Into<CharacterId>, ability: Ability) -> Self {
        Self {
            saver: saver.into(),
            ability,
            bonus: 0,
            advantage: SmallVec::new(),
            disadvantage: SmallVec::new(),
        }
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let save = SavingThrow::new("wizard-1", Ability::Dexterity).with_bonus(3);
        assert_eq!(save.ability, Ability::Dexterity);
        assert_eq!(save.bonus, 3);
        assert!(save.advantage.is_empty());
    }
}
