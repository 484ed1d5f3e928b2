//! The condition lifecycle contract.
//!
//! A condition is idle or applied, never both: applied means it holds
//! live bus subscriptions, idle means it holds none. Everything else -
//! what it subscribes to, what it contributes, when it expires - is the
//! variant's business.

use std::rc::Rc;

use serde::de::DeserializeOwned;

use crate::bus::EventBus;
use crate::core::{CharacterId, ConditionRef, EngineError};
use crate::events::topics::CONDITION_REMOVED;
use crate::events::{ConditionRemoved, RemovalReason};
use crate::query::QueryPorts;
use crate::registry::ConditionRecord;

/// A stateful behavior unit bound to one character.
///
/// Held as `Rc<dyn Condition>`: the bus keeps a condition alive through
/// the handlers it subscribed, so an applied condition outlives the
/// host's handle until something calls [`remove`](Condition::remove).
pub trait Condition {
    /// The variant's registry reference.
    fn reference(&self) -> ConditionRef;

    /// The character this condition is bound to.
    fn character(&self) -> &CharacterId;

    /// Whether it currently holds live subscriptions.
    fn is_applied(&self) -> bool;

    /// Attach to the bus: subscribe every topic and chain the variant
    /// requires, recording every id.
    ///
    /// Fails [`EngineError::AlreadyApplied`] when already applied. A
    /// failure partway through rolls back the subscriptions already made
    /// by this call, so the condition is never left half-applied.
    fn apply(self: Rc<Self>, ports: &QueryPorts, bus: &EventBus) -> Result<(), EngineError>;

    /// Detach from the bus, releasing every recorded subscription.
    ///
    /// A no-op when already idle.
    fn remove(&self, bus: &EventBus);

    /// The durable snapshot: ref plus exactly the variant's durable
    /// fields. Never includes transient machinery; a loaded condition
    /// restarts idle and needs an explicit apply.
    fn record(&self) -> Result<ConditionRecord, EngineError>;
}

impl std::fmt::Debug for dyn Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Condition")
            .field("reference", &self.reference())
            .field("character", self.character())
            .field("is_applied", &self.is_applied())
            .finish()
    }
}

/// Self-expiry: publish exactly one removal notice, then detach.
///
/// Called from inside the variant's own turn-boundary (or damage)
/// handler; the notice goes out while the condition is still applied,
/// then the handler unsubscribes itself.
pub(crate) fn expire(
    condition: &dyn Condition,
    bus: &EventBus,
    reason: RemovalReason,
) -> Result<(), EngineError> {
    tracing::debug!(
        condition = %condition.reference(),
        character = %condition.character(),
        reason = ?reason,
        "condition expiring"
    );
    let mut notice = ConditionRemoved {
        character: condition.character().clone(),
        condition: condition.reference(),
        reason,
    };
    bus.publish(CONDITION_REMOVED, &mut notice)?;
    condition.remove(bus);
    Ok(())
}

/// Parse a variant's factory config payload.
///
/// An absent (`null`) config reads as an empty object so variants whose
/// parameters all have defaults accept it.
pub(crate) fn parse_config<T: DeserializeOwned>(
    reference: &ConditionRef,
    config: &serde_json::Value,
) -> Result<T, EngineError> {
    let value = match config {
        serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(value).map_err(|e| {
        EngineError::InvalidArgument(format!("malformed config for {reference}: {e}"))
    })
}
