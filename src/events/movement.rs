//! Movement-check events.

use serde::{Deserialize, Serialize};

use crate::core::{CharacterId, ModifierSource};

/// A movement allowance being computed for one character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementCheck {
    /// Who is moving.
    pub mover: CharacterId,
    /// Remaining speed in feet.
    pub speed: i32,
    /// Set when something forbids movement entirely.
    pub blocked: Option<ModifierSource>,
}

impl MovementCheck {
    /// Start a movement check from a base speed in feet.
    pub fn new(mover: impl Into<CharacterId>, base_speed: i32) -> Self {
        Self {
            mover: mover.into(),
            speed: base_speed,
            blocked: None,
        }
    }

    /// Forbid movement, recording what blocked it. Speed drops to zero.
    /// The first blocker wins; later blocks keep the original source.
    pub fn block(&mut self, source: ModifierSource) {
        self.speed = 0;
        if self.blocked.is_none() {
            self.blocked = Some(source);
        }
    }

    /// Whether movement is forbidden outright.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.blocked.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_wins_and_sticks() {
        let mut check = MovementCheck::new("rogue-1", 30);
        check.block(ModifierSource::new("Grappled", "condition:grappled"));
        check.block(ModifierSource::new("Restrained", "condition:restrained"));

        assert!(check.is_blocked());
        assert_eq!(check.speed, 0);
        assert_eq!(check.blocked.as_ref().unwrap().name, "Grappled");
    }
}
