//! Plain notification payloads: turn boundaries, condition removal,
//! after-the-fact combat reports.
//!
//! Unlike chain events these are not assembled - handlers observe them
//! (and may react by expiring themselves) but the payload is the whole
//! story.

use serde::{Deserialize, Serialize};

use crate::core::{CharacterId, ConditionRef};

/// A turn boundary for one character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvent {
    /// Whose turn is starting or ending.
    pub character: CharacterId,
    /// 1-based combat round.
    pub round: u32,
}

impl TurnEvent {
    pub fn new(character: impl Into<CharacterId>, round: u32) -> Self {
        Self {
            character: character.into(),
            round,
        }
    }
}

/// Why a condition removed itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Expired when its bearer's turn started.
    TurnStart,
    /// Expired when its bearer's turn ended.
    TurnEnd,
    /// Ran out of rounds.
    DurationExpired,
    /// The bearer did nothing that sustains the condition.
    NoActivity,
    /// The bearer dropped unconscious.
    Unconscious,
}

/// Published by a condition immediately before it unsubscribes itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRemoved {
    /// The character the condition was bound to.
    pub character: CharacterId,
    /// Which variant removed itself.
    pub condition: ConditionRef,
    /// Why.
    pub reason: RemovalReason,
}

/// An attack was resolved (hit or miss).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOccurred {
    pub attacker: CharacterId,
    pub target: CharacterId,
    pub hit: bool,
}

/// Damage was applied to a character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReceived {
    pub attacker: CharacterId,
    pub target: CharacterId,
    /// Final rolled total after the host resolved the damage roll.
    pub total: i32,
    /// True when this damage dropped the target unconscious.
    pub dropped: bool,
}
