//! The fixed topic catalog.
//!
//! This is the seam between the engine and out-of-scope content: chain
//! topics carry events that modifiers assemble, notification topics
//! carry facts that already happened. Hosts and conditions address
//! topics through these constants; nothing stops a host from defining
//! additional topics of its own.

use crate::bus::{ChainTopic, Topic};

use super::armor::ArmorClass;
use super::attack::AttackRoll;
use super::damage::DamageRoll;
use super::movement::MovementCheck;
use super::notice::{AttackOccurred, ConditionRemoved, DamageReceived, TurnEvent};
use super::save::SavingThrow;

/// An attack roll is being assembled.
pub const ATTACK_ROLL: ChainTopic<AttackRoll> = ChainTopic::new("combat.attack-roll");

/// A damage roll is being assembled.
pub const DAMAGE_ROLL: ChainTopic<DamageRoll> = ChainTopic::new("combat.damage-roll");

/// An armor-class value is being assembled.
pub const ARMOR_CLASS: ChainTopic<ArmorClass> = ChainTopic::new("combat.armor-class");

/// A saving throw is being assembled.
pub const SAVING_THROW: ChainTopic<SavingThrow> = ChainTopic::new("combat.saving-throw");

/// A movement allowance is being computed.
pub const MOVEMENT: ChainTopic<MovementCheck> = ChainTopic::new("combat.movement");

/// A character's turn started.
pub const TURN_STARTED: Topic<TurnEvent> = Topic::new("time.turn-started");

/// A character's turn ended.
pub const TURN_ENDED: Topic<TurnEvent> = Topic::new("time.turn-ended");

/// A condition removed itself (published before it unsubscribes).
pub const CONDITION_REMOVED: Topic<ConditionRemoved> = Topic::new("conditions.removed");

/// An attack was resolved.
pub const ATTACK_OCCURRED: Topic<AttackOccurred> = Topic::new("combat.attack-occurred");

/// Damage was applied.
pub const DAMAGE_RECEIVED: Topic<DamageReceived> = Topic::new("combat.damage-received");
