//! # rust-tactics
//!
//! A deterministic combat rules engine for tabletop RPGs.
//!
//! ## Design Principles
//!
//! 1. **Deterministic Combination**: Many independently-authored effects
//!    mutate one shared computation in a reproducible order - chain stage
//!    order first, registration order within a stage - without any effect
//!    knowing about any other.
//!
//! 2. **No Hidden State**: The bus is an owned value passed everywhere
//!    explicitly. Tests build isolated buses; hosts decide the lifetime.
//!
//! 3. **Synchronous and Single-Threaded**: Publishing runs every handler
//!    on the caller's stack before returning. No queues, no workers, no
//!    cross-process delivery.
//!
//! ## Architecture
//!
//! - **Events over calls**: Conditions never talk to each other. They
//!   subscribe to topics, contribute staged modifiers to in-flight
//!   computations, and observe turn boundaries to expire themselves.
//!
//! - **Explicit lifetimes**: A subscription id is the only credential
//!   that reverses a subscribe. Conditions record every id they hold and
//!   release them all on remove; losing ids leaks live handlers.
//!
//! - **Opaque persistence**: A condition serializes to a ref-tagged
//!   payload; the registry peeks the tag and dispatches to the one
//!   deserializer registered for it. A revived condition starts idle.
//!
//! ## Modules
//!
//! - `core`: Character ids, condition refs, modifier provenance, errors
//! - `bus`: Typed topics, subscriptions, synchronous publish/dispatch
//! - `chain`: Staged single-use modifier pipeline
//! - `events`: Combat event payloads and the fixed topic catalog
//! - `query`: Read-only ambient ports (attributes, grid, teams)
//! - `conditions`: The condition lifecycle and the shipped variants
//! - `registry`: Persisted payload records and loader/factory dispatch

pub mod bus;
pub mod chain;
pub mod conditions;
pub mod core;
pub mod events;
pub mod query;
pub mod registry;

// Re-export commonly used types
pub use crate::core::{CharacterId, ConditionRef, EngineError, ModifierSource};

pub use crate::bus::{ChainTopic, EventBus, SubscriptionId, Topic, TopicKey};

pub use crate::chain::{Chain, ChainError, Stage, BASE, COMBAT_STAGES, CONDITIONS, FEATURES, FINAL};

pub use crate::events::{
    Ability, ArmorClass, AttackOccurred, AttackRoll, ConditionRemoved, DamageAmount,
    DamageComponent, DamageReceived, DamageRoll, MovementCheck, RemovalReason, SavingThrow,
    TurnEvent,
};

pub use crate::query::{AttributeSource, GridIndex, QueryPorts, TeamIndex};

pub use crate::conditions::{
    Bless, BrutalCritical, Condition, DefensiveStance, ProtectiveAura, Rage, Slowed,
};

pub use crate::registry::{ConditionRecord, ConditionRegistry};
