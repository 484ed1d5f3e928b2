//! Bless.
//!
//! A flat bonus to the bearer's attack rolls and saving throws for a
//! fixed number of rounds, counted down at the bearer's turn end.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::bus::EventBus;
use crate::chain::CONDITIONS;
use crate::core::{CharacterId, ConditionRef, EngineError, ModifierSource};
use crate::events::topics::{ATTACK_ROLL, SAVING_THROW, TURN_ENDED};
use crate::events::RemovalReason;
use crate::query::QueryPorts;
use crate::registry::ConditionRecord;

use super::lifecycle::{expire, parse_config, Condition};
use super::subscriptions::{Registrar, SubscriptionSet};

/// Default duration: ten rounds, a minute of combat.
const DEFAULT_ROUNDS: u32 = 10;

/// Default bonus to attack rolls and saving throws.
const DEFAULT_BONUS: i32 = 2;

/// Flat bonus to the bearer's attack rolls and saving throws.
pub struct Bless {
    character: CharacterId,
    bonus: i32,
    rounds_remaining: Cell<u32>,
    provenance: Option<String>,
    subs: SubscriptionSet,
}

#[derive(Serialize, Deserialize)]
struct BlessRecord {
    character: CharacterId,
    #[serde(default = "default_bonus")]
    bonus: i32,
    #[serde(default = "default_rounds")]
    rounds_remaining: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provenance: Option<String>,
}

#[derive(Deserialize)]
struct BlessConfig {
    #[serde(default = "default_bonus")]
    bonus: i32,
    #[serde(default = "default_rounds")]
    rounds: u32,
}

fn default_rounds() -> u32 {
    DEFAULT_ROUNDS
}

fn default_bonus() -> i32 {
    DEFAULT_BONUS
}

impl Bless {
    /// Registry reference for this variant.
    #[must_use]
    pub fn reference() -> ConditionRef {
        ConditionRef::new("spell", "enchantment", "bless")
    }

    /// Create an idle bless with the default bonus and duration.
    pub fn new(character: impl Into<CharacterId>) -> Self {
        Self {
            character: character.into(),
            bonus: DEFAULT_BONUS,
            rounds_remaining: Cell::new(DEFAULT_ROUNDS),
            provenance: None,
            subs: SubscriptionSet::new(),
        }
    }

    /// Set the flat bonus (builder pattern).
    #[must_use]
    pub fn with_bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
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
        ModifierSource::condition("Bless", &Self::reference())
    }

    pub(crate) fn load(record: &ConditionRecord) -> Result<Rc<dyn Condition>, EngineError> {
        let fields: BlessRecord = record.parse_fields()?;
        Ok(Rc::new(Self {
            character: fields.character,
            bonus: fields.bonus,
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
        let config: BlessConfig = parse_config(&Self::reference(), config)?;
        let mut bless = Self::new(character)
            .with_bonus(config.bonus)
            .with_rounds(config.rounds);
        bless.provenance = provenance;
        Ok(Rc::new(bless))
    }
}

impl Condition for Bless {
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
        registrar.subscribe_chain(ATTACK_ROLL, move |_, event, chain| {
            if event.attacker != me.character {
                return Ok(());
            }
            let source = me.modifier_source();
            let bonus = me.bonus;
            chain.add(CONDITIONS, source, move |roll| {
                roll.add_bonus(bonus);
                Ok(())
            })
        });

        let me = Rc::clone(&self);
        registrar.subscribe_chain(SAVING_THROW, move |_, event, chain| {
            if event.saver != me.character {
                return Ok(());
            }
            let source = me.modifier_source();
            let bonus = me.bonus;
            chain.add(CONDITIONS, source, move |save| {
                save.add_bonus(bonus);
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
            &BlessRecord {
                character: self.character.clone(),
                bonus: self.bonus,
                rounds_remaining: self.rounds_remaining.get(),
                provenance: self.provenance.clone(),
            },
        )
    }
}
