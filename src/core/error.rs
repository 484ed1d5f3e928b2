//! Engine error taxonomy.
//!
//! Errors are structured for the host to map onto user-facing messages.
//! The engine never silently ignores an unrecognized type or reference.

use thiserror::Error;

use super::character::CharacterId;
use super::reference::ConditionRef;

/// Errors surfaced by the bus, chains, conditions, and the registry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Apply was called on a condition that already holds live
    /// subscriptions.
    #[error("{condition} is already applied to {character}")]
    AlreadyApplied {
        condition: ConditionRef,
        character: CharacterId,
    },

    /// Malformed reference, config payload, or stage name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Reference absent from the registry dispatch table.
    #[error("not found: {0}")]
    NotFound(String),

    /// Reference is recognized but the variant is intentionally
    /// unimplemented.
    #[error("not allowed: {0}")]
    NotAllowed(String),

    /// An event reached engine logic with a shape it does not understand.
    #[error("internal error: {0}")]
    Internal(String),
}
