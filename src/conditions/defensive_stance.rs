//! Defensive Stance.
//!
//! A fighter maneuver: brace behind a shield for +2 armor class until
//! the bearer's next turn starts. The shield check runs at event time
//! through the attribute port; when the port cannot answer, the stance
//! declines to modify rather than guessing.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::bus::EventBus;
use crate::chain::CONDITIONS;
use crate::core::{CharacterId, ConditionRef, EngineError, ModifierSource};
use crate::events::topics::{ARMOR_CLASS, TURN_STARTED};
use crate::events::RemovalReason;
use crate::query::QueryPorts;
use crate::registry::ConditionRecord;

use super::lifecycle::{expire, parse_config, Condition};
use super::subscriptions::{Registrar, SubscriptionSet};

/// Armor-class bonus while braced.
const STANCE_BONUS: i32 = 2;

/// The item the stance requires.
const SHIELD: &str = "shield";

/// Shield-braced +2 armor class until the bearer's next turn.
pub struct DefensiveStance {
    character: CharacterId,
    provenance: Option<String>,
    subs: SubscriptionSet,
}

#[derive(Serialize, Deserialize)]
struct DefensiveStanceRecord {
    character: CharacterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provenance: Option<String>,
}

#[derive(Deserialize)]
struct DefensiveStanceConfig {}

impl DefensiveStance {
    /// Registry reference for this variant.
    #[must_use]
    pub fn reference() -> ConditionRef {
        ConditionRef::new("maneuver", "fighter", "defensive-stance")
    }

    /// Create an idle stance.
    pub fn new(character: impl Into<CharacterId>) -> Self {
        Self {
            character: character.into(),
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

    fn modifier_source(&self) -> ModifierSource {
        ModifierSource::condition("Defensive Stance", &Self::reference())
    }

    pub(crate) fn load(record: &ConditionRecord) -> Result<Rc<dyn Condition>, EngineError> {
        let fields: DefensiveStanceRecord = record.parse_fields()?;
        Ok(Rc::new(Self {
            character: fields.character,
            provenance: fields.provenance,
            subs: SubscriptionSet::new(),
        }))
    }

    pub(crate) fn build(
        config: &serde_json::Value,
        character: CharacterId,
        provenance: Option<String>,
    ) -> Result<Rc<dyn Condition>, EngineError> {
        let DefensiveStanceConfig {} = parse_config(&Self::reference(), config)?;
        let mut stance = Self::new(character);
        stance.provenance = provenance;
        Ok(Rc::new(stance))
    }
}

impl Condition for DefensiveStance {
    fn reference(&self) -> ConditionRef {
        Self::reference()
    }

    fn character(&self) -> &CharacterId {
        &self.character
    }

    fn is_applied(&self) -> bool {
        self.subs.is_applied()
    }

    fn apply(self: Rc<Self>, ports: &QueryPorts, bus: &EventBus) -> Result<(), EngineError> {
        let mut registrar = Registrar::begin(bus, &self.subs, Self::reference(), &self.character)?;

        let me = Rc::clone(&self);
        let ports = ports.clone();
        registrar.subscribe_chain(ARMOR_CLASS, move |_, event, chain| {
            if event.defender != me.character {
                return Ok(());
            }
            // Port unavailable or shield missing: decline to modify.
            if ports.has_equipped(&me.character, SHIELD) != Some(true) {
                return Ok(());
            }
            let source = me.modifier_source();
            chain.add(CONDITIONS, source.clone(), move |ac| {
                ac.adjust(source, STANCE_BONUS);
                Ok(())
            })
        });

        let me = Rc::clone(&self);
        registrar.subscribe(TURN_STARTED, move |bus, event| {
            if event.character != me.character {
                return Ok(());
            }
            expire(me.as_ref(), bus, RemovalReason::TurnStart)
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
            &DefensiveStanceRecord {
                character: self.character.clone(),
                provenance: self.provenance.clone(),
            },
        )
    }
}
