//! Event payloads and the topic catalog.
//!
//! Chain events (`AttackRoll`, `DamageRoll`, `ArmorClass`, `SavingThrow`,
//! `MovementCheck`) are mutable records threaded through a staged chain;
//! notification events (`TurnEvent`, `ConditionRemoved`, ...) are plain
//! facts delivered to subscribers.

pub mod armor;
pub mod attack;
pub mod damage;
pub mod movement;
pub mod notice;
pub mod save;
pub mod topics;

pub use armor::{ArmorClass, ArmorDelta};
pub use attack::AttackRoll;
pub use damage::{DamageAmount, DamageComponent, DamageRoll};
pub use movement::MovementCheck;
pub use notice::{AttackOccurred, ConditionRemoved, DamageReceived, RemovalReason, TurnEvent};
pub use save::{Ability, SavingThrow};
