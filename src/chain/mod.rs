//! The staged chain: a single-use, ordered pipeline threading one
//! mutable event through registered modifiers.
//!
//! Many independently-authored effects must combine deterministically
//! without coordinating with each other. Fixed stages give a coarse
//! deterministic order (base computation, then passive conditions, then
//! class features, then final clamping); within a stage, registration
//! order decides.

pub mod pipeline;
pub mod stage;

pub use pipeline::{Chain, ChainError, Modifier};
pub use stage::{Stage, BASE, COMBAT_STAGES, CONDITIONS, FEATURES, FINAL};
