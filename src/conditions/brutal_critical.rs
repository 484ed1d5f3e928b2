//! Brutal Critical.
//!
//! On a critical hit, the bearer's melee damage roll gains extra weapon
//! dice, one to three of them depending on level. The extra dice mirror
//! the largest die already in the roll; a roll with no dice (pure flat
//! damage) gains nothing. Permanent while applied - no turn bookkeeping.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::bus::EventBus;
use crate::chain::FEATURES;
use crate::core::{CharacterId, ConditionRef, EngineError, ModifierSource};
use crate::events::topics::DAMAGE_ROLL;
use crate::query::QueryPorts;
use crate::registry::ConditionRecord;

use super::lifecycle::{parse_config, Condition};
use super::subscriptions::{Registrar, SubscriptionSet};

/// Extra weapon dice on critical hits.
pub struct BrutalCritical {
    character: CharacterId,
    level: u32,
    provenance: Option<String>,
    subs: SubscriptionSet,
}

#[derive(Serialize, Deserialize)]
struct BrutalCriticalRecord {
    character: CharacterId,
    level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provenance: Option<String>,
}

#[derive(Deserialize)]
struct BrutalCriticalConfig {
    level: u32,
}

impl BrutalCritical {
    /// Registry reference for this variant.
    #[must_use]
    pub fn reference() -> ConditionRef {
        ConditionRef::new("class", "barbarian", "brutal-critical")
    }

    /// Create an idle brutal critical for a barbarian of the given level.
    pub fn new(character: impl Into<CharacterId>, level: u32) -> Self {
        Self {
            character: character.into(),
            level,
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

    /// Extra dice at the bearer's level: one from 9, two from 13, three
    /// from 17. Below 9 the feature contributes nothing.
    #[must_use]
    pub fn extra_dice(&self) -> usize {
        match self.level {
            0..=8 => 0,
            9..=12 => 1,
            13..=16 => 2,
            _ => 3,
        }
    }

    fn modifier_source(&self) -> ModifierSource {
        ModifierSource::condition("Brutal Critical", &Self::reference())
    }

    pub(crate) fn load(record: &ConditionRecord) -> Result<Rc<dyn Condition>, EngineError> {
        let fields: BrutalCriticalRecord = record.parse_fields()?;
        Ok(Rc::new(Self {
            character: fields.character,
            level: fields.level,
            provenance: fields.provenance,
            subs: SubscriptionSet::new(),
        }))
    }

    pub(crate) fn build(
        config: &serde_json::Value,
        character: CharacterId,
        provenance: Option<String>,
    ) -> Result<Rc<dyn Condition>, EngineError> {
        let config: BrutalCriticalConfig = parse_config(&Self::reference(), config)?;
        let mut feature = Self::new(character, config.level);
        feature.provenance = provenance;
        Ok(Rc::new(feature))
    }
}

impl Condition for BrutalCritical {
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
            if event.attacker != me.character || !event.critical {
                return Ok(());
            }
            let extra = me.extra_dice();
            if extra == 0 {
                return Ok(());
            }
            let source = me.modifier_source();
            chain.add(FEATURES, source.clone(), move |roll| {
                // Mirror the weapon's biggest die. Registered at the
                // Features stage so condition-stage dice are already in.
                let Some(sides) = roll.largest_die() else {
                    return Ok(());
                };
                for _ in 0..extra {
                    roll.add_die(source.clone(), sides);
                }
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
            &BrutalCriticalRecord {
                character: self.character.clone(),
                level: self.level,
                provenance: self.provenance.clone(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::COMBAT_STAGES;
    use crate::events::{DamageAmount, DamageRoll};

    #[test]
    fn test_extra_dice_thresholds() {
        assert_eq!(BrutalCritical::new("b", 8).extra_dice(), 0);
        assert_eq!(BrutalCritical::new("b", 9).extra_dice(), 1);
        assert_eq!(BrutalCritical::new("b", 13).extra_dice(), 2);
        assert_eq!(BrutalCritical::new("b", 17).extra_dice(), 3);
    }

    #[test]
    fn test_extra_dice_mirror_largest_die() {
        let bus = EventBus::new();
        let feature = Rc::new(BrutalCritical::new("barbarian-1", 9));
        Rc::clone(&feature).apply(&QueryPorts::none(), &bus).unwrap();

        let roll = bus
            .dispatch(
                DAMAGE_ROLL,
                &COMBAT_STAGES,
                DamageRoll::new("barbarian-1", "goblin-3")
                    .critical()
                    .with_die(ModifierSource::base("Greataxe"), 12),
            )
            .unwrap();

        let bonus: Vec<_> = roll
            .components_from("class:barbarian:brutal-critical")
            .collect();
        assert_eq!(bonus.len(), 1);
        assert_eq!(bonus[0].amount, DamageAmount::Die { sides: 12 });
    }

    #[test]
    fn test_no_dice_in_roll_means_no_bonus() {
        let bus = EventBus::new();
        let feature = Rc::new(BrutalCritical::new("barbarian-1", 17));
        Rc::clone(&feature).apply(&QueryPorts::none(), &bus).unwrap();

        let mut event = DamageRoll::new("barbarian-1", "goblin-3").critical();
        event.add_flat(ModifierSource::base("Improvised"), 3);

        let roll = bus.dispatch(DAMAGE_ROLL, &COMBAT_STAGES, event).unwrap();
        assert_eq!(roll.dice_count(), 0);
    }

    #[test]
    fn test_record_round_trip() {
        let feature = BrutalCritical::new("barbarian-1", 13);
        let payload = feature.record().unwrap().to_value();

        let revived = BrutalCritical::load(&ConditionRecord::from_value(&payload).unwrap()).unwrap();
        assert!(!revived.is_applied());
        assert_eq!(revived.record().unwrap().to_value(), payload);
    }
}
