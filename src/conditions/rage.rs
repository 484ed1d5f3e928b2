//! Rage.
//!
//! Bonus melee damage while raging, sustained only by fighting. Rage
//! watches its bearer's attacks and the damage they take; at the
//! bearer's turn end it expires if nothing sustained it this round,
//! otherwise it counts its duration down. Dropping unconscious ends it
//! immediately.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::bus::EventBus;
use crate::chain::CONDITIONS;
use crate::core::{CharacterId, ConditionRef, EngineError, ModifierSource};
use crate::events::topics::{ATTACK_OCCURRED, DAMAGE_RECEIVED, DAMAGE_ROLL, TURN_ENDED};
use crate::events::RemovalReason;
use crate::query::QueryPorts;
use crate::registry::ConditionRecord;

use super::lifecycle::{expire, parse_config, Condition};
use super::subscriptions::{Registrar, SubscriptionSet};

/// How many rounds a rage lasts when nothing ends it sooner.
const DEFAULT_ROUNDS: u32 = 10;

/// Flat melee damage bonus while raging.
pub struct Rage {
    character: CharacterId,
    level: u32,
    rounds_remaining: Cell<u32>,
    active_this_round: Cell<bool>,
    provenance: Option<String>,
    subs: SubscriptionSet,
}

/// Durable fields. Everything else is rebuilt on apply.
#[derive(Serialize, Deserialize)]
struct RageRecord {
    character: CharacterId,
    level: u32,
    /// Omitted means a fresh full duration.
    #[serde(default = "default_rounds")]
    rounds_remaining: u32,
    /// Omitted means nothing has sustained the rage yet this round.
    #[serde(default)]
    active_this_round: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provenance: Option<String>,
}

#[derive(Deserialize)]
struct RageConfig {
    level: u32,
}

fn default_rounds() -> u32 {
    DEFAULT_ROUNDS
}

impl Rage {
    /// Registry reference for this variant.
    #[must_use]
    pub fn reference() -> ConditionRef {
        ConditionRef::new("class", "barbarian", "rage")
    }

    /// Start a fresh, idle rage for a barbarian of the given level.
    pub fn new(character: impl Into<CharacterId>, level: u32) -> Self {
        Self {
            character: character.into(),
            level,
            rounds_remaining: Cell::new(DEFAULT_ROUNDS),
            active_this_round: Cell::new(false),
            provenance: None,
            subs: SubscriptionSet::new(),
        }
    }

    /// Record who granted this condition (builder pattern).
    #[must_use]
    pub fn with_provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = Some(provenance.into());
        self
    }

    /// Flat melee damage bonus at the bearer's level.
    #[must_use]
    pub fn damage_bonus(&self) -> i32 {
        match self.level {
            0..=8 => 2,
            9..=15 => 3,
            _ => 4,
        }
    }

    fn modifier_source(&self) -> ModifierSource {
        ModifierSource::condition("Rage", &Self::reference())
    }

    pub(crate) fn load(record: &ConditionRecord) -> Result<Rc<dyn Condition>, EngineError> {
        let fields: RageRecord = record.parse_fields()?;
        Ok(Rc::new(Self {
            character: fields.character,
            level: fields.level,
            rounds_remaining: Cell::new(fields.rounds_remaining),
            active_this_round: Cell::new(fields.active_this_round),
            provenance: fields.provenance,
            subs: SubscriptionSet::new(),
        }))
    }

    pub(crate) fn build(
        config: &serde_json::Value,
        character: CharacterId,
        provenance: Option<String>,
    ) -> Result<Rc<dyn Condition>, EngineError> {
        let config: RageConfig = parse_config(&Self::reference(), config)?;
        let mut rage = Self::new(character, config.level);
        rage.provenance = provenance;
        Ok(Rc::new(rage))
    }
}

impl Condition for Rage {
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
        registrar.subscribe_chain(DAMAGE_ROLL, move |_, event, chain| {
            if event.attacker != me.character || !event.melee {
                return Ok(());
            }
            let source = me.modifier_source();
            let bonus = me.damage_bonus();
            chain.add(CONDITIONS, source.clone(), move |roll| {
                roll.add_flat(source, bonus);
                Ok(())
            })
        });

        let me = Rc::clone(&self);
        registrar.subscribe(ATTACK_OCCURRED, move |_, event| {
            if event.attacker == me.character {
                me.active_this_round.set(true);
            }
            Ok(())
        });

        let me = Rc::clone(&self);
        registrar.subscribe(DAMAGE_RECEIVED, move |bus, event| {
            if event.target != me.character {
                return Ok(());
            }
            me.active_this_round.set(true);
            if event.dropped {
                return expire(me.as_ref(), bus, RemovalReason::Unconscious);
            }
            Ok(())
        });

        let me = Rc::clone(&self);
        registrar.subscribe(TURN_ENDED, move |bus, event| {
            if event.character != me.character {
                return Ok(());
            }
            if !me.active_this_round.replace(false) {
                return expire(me.as_ref(), bus, RemovalReason::NoActivity);
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
            &RageRecord {
                character: self.character.clone(),
                level: self.level,
                rounds_remaining: self.rounds_remaining.get(),
                active_this_round: self.active_this_round.get(),
                provenance: self.provenance.clone(),
            },
        )
    }
}
