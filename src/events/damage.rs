//! Damage-roll events.
//!
//! A damage roll is an ordered list of components - dice to throw and
//! flat amounts - each tagged with the source that contributed it. The
//! engine never rolls dice; it assembles the component list and the host
//! rolls after the chain completes.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{CharacterId, ModifierSource};

/// A single element of a damage roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageAmount {
    /// One die with the given number of sides.
    Die { sides: u8 },
    /// A flat amount.
    Flat { amount: i32 },
}

/// One sourced entry in a damage roll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageComponent {
    /// Who contributed this component.
    pub source: ModifierSource,
    /// What it contributes.
    pub amount: DamageAmount,
}

/// A damage total being assembled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRoll {
    /// Who dealt the damage.
    pub attacker: CharacterId,
    /// Who takes it.
    pub target: CharacterId,
    /// Melee damage if true, ranged otherwise.
    pub melee: bool,
    /// Whether the triggering attack was a critical hit.
    pub critical: bool,
    /// Ordered component list. Modifiers append; the host rolls.
    pub components: SmallVec<[DamageComponent; 4]>,
}

impl DamageRoll {
    /// Start a damage roll with no components.
    pub fn new(attacker: impl Into<CharacterId>, target: impl Into<CharacterId>) -> Self {
        Self {
            attacker: attacker.into(),
            target: target.into(),
            melee: true,
            critical: false,
            components: SmallVec::new(),
        }
    }

    /// Mark the damage as ranged (builder pattern).
    #[must_use]
    pub fn ranged(mut self) -> Self {
        self.melee = false;
        self
    }

    /// Mark the triggering attack as a critical hit (builder pattern).
    #[must_use]
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    /// Seed a weapon die (builder pattern).
    #[must_use]
    pub fn with_die(mut self, source: ModifierSource, sides: u8) -> Self {
        self.add_die(source, sides);
        self
    }

    /// Append one die.
    pub fn add_die(&mut self, source: ModifierSource, sides: u8) {
        self.components.push(DamageComponent {
            source,
            amount: DamageAmount::Die { sides },
        });
    }

    /// Append a flat amount.
    pub fn add_flat(&mut self, source: ModifierSource, amount: i32) {
        self.components.push(DamageComponent {
            source,
            amount: DamageAmount::Flat { amount },
        });
    }

    /// The largest die already in the roll, if any.
    ///
    /// Bonus-dice effects mirror the weapon's biggest die rather than
    /// carrying their own die size.
    #[must_use]
    pub fn largest_die(&self) -> Option<u8> {
        self.components
            .iter()
            .filter_map(|c| match c.amount {
                DamageAmount::Die { sides } => Some(sides),
                DamageAmount::Flat { .. } => None,
            })
            .max()
    }

    /// Number of dice in the roll.
    #[must_use]
    pub fn dice_count(&self) -> usize {
        self.components
            .iter()
            .filter(|c| matches!(c.amount, DamageAmount::Die { .. }))
            .count()
    }

    /// Sum of the flat components.
    #[must_use]
    pub fn flat_total(&self) -> i32 {
        self.components
            .iter()
            .filter_map(|c| match c.amount {
                DamageAmount::Flat { amount } => Some(amount),
                DamageAmount::Die { .. } => None,
            })
            .sum()
    }

    /// Components contributed by a given origin.
    pub fn components_from<'a>(
        &'a self,
        origin: &'a str,
    ) -> impl Iterator<Item = &'a DamageComponent> {
        self.components
            .iter()
            .filter(move |c| c.source.origin == origin)
    }
}
