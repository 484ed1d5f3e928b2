//! Protective Aura.
//!
//! A paladin's aura: allies near the bearer save better. The predicate
//! combines two ports - the team index decides "ally", the grid index
//! decides "near" - and either answering "cannot verify" makes the aura
//! decline to modify that save. Permanent while applied.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::bus::EventBus;
use crate::chain::FEATURES;
use crate::core::{CharacterId, ConditionRef, EngineError, ModifierSource};
use crate::events::topics::SAVING_THROW;
use crate::query::QueryPorts;
use crate::registry::ConditionRecord;

use super::lifecycle::{parse_config, Condition};
use super::subscriptions::{Registrar, SubscriptionSet};

/// Default aura radius in feet.
const DEFAULT_RADIUS: u32 = 10;

/// Default saving-throw bonus inside the aura.
const DEFAULT_BONUS: i32 = 2;

/// Saving-throw bonus for allies near the bearer.
pub struct ProtectiveAura {
    character: CharacterId,
    radius_feet: u32,
    bonus: i32,
    provenance: Option<String>,
    subs: SubscriptionSet,
}

#[derive(Serialize, Deserialize)]
struct ProtectiveAuraRecord {
    character: CharacterId,
    #[serde(default = "default_radius")]
    radius_feet: u32,
    #[serde(default = "default_bonus")]
    bonus: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provenance: Option<String>,
}

#[derive(Deserialize)]
struct ProtectiveAuraConfig {
    #[serde(default = "default_radius")]
    radius_feet: u32,
    #[serde(default = "default_bonus")]
    bonus: i32,
}

fn default_radius() -> u32 {
    DEFAULT_RADIUS
}

fn default_bonus() -> i32 {
    DEFAULT_BONUS
}

impl ProtectiveAura {
    /// Registry reference for this variant.
    #[must_use]
    pub fn reference() -> ConditionRef {
        ConditionRef::new("class", "paladin", "protective-aura")
    }

    /// Create an idle aura with the default radius and bonus.
    pub fn new(character: impl Into<CharacterId>) -> Self {
        Self {
            character: character.into(),
            radius_feet: DEFAULT_RADIUS,
            bonus: DEFAULT_BONUS,
            provenance: None,
            subs: SubscriptionSet::new(),
        }
    }

    /// Set the radius in feet (builder pattern).
    #[must_use]
    pub fn with_radius(mut self, radius_feet: u32) -> Self {
        self.radius_feet = radius_feet;
        self
    }

    /// Set the saving-throw bonus (builder pattern).
    #[must_use]
    pub fn with_bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
    }

    /// Record who granted this condition (builder pattern).
    #[must_use]
    pub fn with_provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = Some(provenance.into());
        self
    }

    fn modifier_source(&self) -> ModifierSource {
        ModifierSource::condition("Protective Aura", &Self::reference())
    }

    pub(crate) fn load(record: &ConditionRecord) -> Result<Rc<dyn Condition>, EngineError> {
        let fields: ProtectiveAuraRecord = record.parse_fields()?;
        Ok(Rc::new(Self {
            character: fields.character,
            radius_feet: fields.radius_feet,
            bonus: fields.bonus,
            provenance: fields.provenance,
            subs: SubscriptionSet::new(),
        }))
    }

    pub(crate) fn build(
        config: &serde_json::Value,
        character: CharacterId,
        provenance: Option<String>,
    ) -> Result<Rc<dyn Condition>, EngineError> {
        let config: ProtectiveAuraConfig = parse_config(&Self::reference(), config)?;
        let mut aura = Self::new(character)
            .with_radius(config.radius_feet)
            .with_bonus(config.bonus);
        aura.provenance = provenance;
        Ok(Rc::new(aura))
    }
}

impl Condition for ProtectiveAura {
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
        registrar.subscribe_chain(SAVING_THROW, move |_, event, chain| {
            if ports.allied(&event.saver, &me.character) != Some(true) {
                return Ok(());
            }
            let in_range = ports
                .distance_feet(&event.saver, &me.character)
                .is_some_and(|d| d <= me.radius_feet);
            if !in_range {
                return Ok(());
            }
            let source = me.modifier_source();
            let bonus = me.bonus;
            chain.add(FEATURES, source, move |save| {
                save.add_bonus(bonus);
                Ok(())
            })
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
            &ProtectiveAuraRecord {
                character: self.character.clone(),
                radius_feet: self.radius_feet,
                bonus: self.bonus,
                provenance: self.provenance.clone(),
            },
        )
    }
}
