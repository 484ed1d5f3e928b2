//! Slowed.
//!
//! Halves the bearer's movement speed for a fixed number of rounds,
//! counted down at the bearer's turn end.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::bus::EventBus;
use crate::chain::CONDITIONS;
use crate::core::{CharacterId, ConditionRef, EngineError, ModifierSource};
use crate::events::topics::{MOVEMENT, TURN_ENDED};
use crate::events::RemovalReason;
use crate::query::QueryPorts;
use crate::registry::ConditionRecord;

use super::lifecycle::{expire, parse_config, Condition};
use super::subscriptions::{Registrar, SubscriptionSet};

/// Default duration: a single round.
const DEFAULT_ROUNDS: u32 = 1;

/// Halved movement speed.
pub struct Slowed {
    character: CharacterId,
    rounds_remaining: Cell<u32>,
    provenance: Option<String>,
    subs: SubscriptionSet,
}

#[derive(Serialize, Deserialize)]
struct SlowedRecord {
    character: CharacterId,
    #[serde(default = "default_rounds")]
    rounds_remaining: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provenance: Option<String>,
}

#[derive(Deserialize)]
struct SlowedConfig {
    #[serde(default = "default_rounds")]
    rounds: u32,
}

fn default_rounds() -> u32 {
    DEFAULT_ROUNDS
}

impl Slowed {
    /// Registry reference for this variant.
    #[must_use]
    pub fn reference() -> ConditionRef {
        ConditionRef::new("spell", "transmutation", "slowed")
    }

    /// Create an idle slow lasting the default single round.
    pub fn new(character: impl Into<CharacterId>) -> Self {
        Self {
            character: character.into(),
            rounds_remaining: Cell::new(DEFAULT_ROUNDS),
            provenance: None,
            subs: SubscriptionSet::new(),
        }
    }

    /// Set the duration in rounds (builder pattern).
    #[must_use]
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds_remaining = Cell::new(rounds);
        self
    }

    /// Record who granted this condition (builder pattern).
    #[must_use]
    pub fn with_provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = Some(provenance.into());
        self
    }

    fn modifier_source(&self) -> ModifierSource {
        ModifierSource::condition("Slowed", &Self::reference())
    }

    pub(crate) fn load(record: &ConditionRecord) -> Result<Rc<dyn Condition>, EngineError> {
        let fields: SlowedRecord = record.parse_fields()?;
        Ok(Rc::new(Self {
            character: fields.character,
            rounds_remaining: Cell::new(fields.rounds_remaining),
            provenance: fields.provenance,
            subs: SubscriptionSet::new(),
        }))
    }

    pub(crate) fn build(
        config: &serde_json::Value,
        character: CharacterId,
        provenance: Option<String>,
    ) -> Result<Rc<dyn Condition>, EngineError> {
        let config: SlowedConfig = parse_config(&Self::reference(), config)?;
        let mut slowed = Self::new(character).with_rounds(config.rounds);
        slowed.provenance = provenance;
        Ok(Rc::new(slowed))
    }
}

impl Condition for Slowed {
    fn reference(&self) -> ConditionRef {
        Self::reference()
    }

    fn character(&self) -> &CharacterId {
        &self.character
    }

    fn is_applied(&self) -> bool {
        self.subs.is_applied()
    }

    fn apply(self: Rc<Self>, _ports: &QueryPorts, bus: &EventBus) -> Result<(), EngineError> {
        let mut registrar = Registrar::begin(bus, &self.subs, Self::reference(), &self.character)?;

        let me = Rc::clone(&self);
        registrar.subscribe_chain(MOVEMENT, move |_, event, chain| {
            if event.mover != me.character {
                return Ok(());
            }
            let source = me.modifier_source();
            chain.add(CONDITIONS, source, move |check| {
                check.speed /= 2;
                Ok(())
            })
        });

        let me = Rc::clone(&self);
        registrar.subscribe(TURN_ENDED, move |bus, event| {
            if event.character != me.character {
                return Ok(());
            }
            let left = me.rounds_remaining.get().saturating_sub(1);
            me.rounds_remaining.set(left);
            if left == 0 {
                return expire(me.as_ref(), bus, RemovalReason::DurationExpired);
            }
            Ok(())
        });

        registrar.commit();
        tracing::debug!(condition = %Self::reference(), character = %self.character, "applied");
        Ok(())
    }

    fn remove(&self, bus: &EventBus) {
        if self.subs.release(bus) > 0 {
            tracing::debug!(condition = %Self::reference(), character = %self.character, "removed");
        }
    }

    fn record(&self) -> Result<ConditionRecord, EngineError> {
        ConditionRecord::new(
            Self::reference(),
            &SlowedRecord {
                character: self.character.clone(),
                rounds_remaining: self.rounds_remaining.get(),
                provenance: self.provenance.clone(),
            },
        )
    }
}
