//! The condition registry: loader and factory dispatch.
//!
//! One table, two entry points. The loader revives a persisted payload
//! by peeking its ref and dispatching to that variant's deserializer;
//! the factory builds a fresh condition from a ref string and a small
//! config payload. Every supported ref is an explicit table entry - an
//! unregistered ref is always a hard failure, never a silent no-op, and
//! adding a variant means adding an entry, never touching dispatch.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::conditions::{
    Bless, BrutalCritical, Condition, DefensiveStance, ProtectiveAura, Rage, Slowed,
};
use crate::core::{CharacterId, ConditionRef, EngineError};

use super::record::ConditionRecord;

/// Revives a persisted record as an idle condition.
pub type LoadFn = fn(&ConditionRecord) -> Result<Rc<dyn Condition>, EngineError>;

/// Builds a fresh idle condition from (config, character, provenance).
pub type BuildFn =
    fn(&serde_json::Value, CharacterId, Option<String>) -> Result<Rc<dyn Condition>, EngineError>;

#[derive(Clone, Copy)]
struct RegistryEntry {
    load: Option<LoadFn>,
    build: Option<BuildFn>,
}

/// Dispatch table from [`ConditionRef`] to variant constructors.
///
/// ## Example
///
/// ```
/// use rust_tactics::conditions::Condition;
/// use rust_tactics::registry::ConditionRegistry;
/// use serde_json::json;
///
/// let registry = ConditionRegistry::standard();
///
/// let rage = registry
///     .create("class:barbarian:rage", &json!({"level": 5}), "barbarian-1", "player-choice")
///     .unwrap();
/// assert!(!rage.is_applied());
///
/// let revived = registry.load(&rage.record().unwrap().to_value()).unwrap();
/// assert_eq!(revived.reference(), rage.reference());
/// ```
#[derive(Default)]
pub struct ConditionRegistry {
    entries: FxHashMap<ConditionRef, RegistryEntry>,
}

impl ConditionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with every shipped variant.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Rage::reference(), Rage::load, Rage::build);
        registry.register(
            BrutalCritical::reference(),
            BrutalCritical::load,
            BrutalCritical::build,
        );
        registry.register(Bless::reference(), Bless::load, Bless::build);
        registry.register(
            DefensiveStance::reference(),
            DefensiveStance::load,
            DefensiveStance::build,
        );
        registry.register(
            ProtectiveAura::reference(),
            ProtectiveAura::load,
            ProtectiveAura::build,
        );
        registry.register(Slowed::reference(), Slowed::load, Slowed::build);
        // Recognized but intentionally unimplemented.
        registry.register_unimplemented(ConditionRef::new("class", "druid", "wild-shape"));
        registry
    }

    /// Register a variant's loader and constructor.
    ///
    /// Panics if the ref already has an entry.
    pub fn register(&mut self, reference: ConditionRef, load: LoadFn, build: BuildFn) {
        self.insert(
            reference,
            RegistryEntry {
                load: Some(load),
                build: Some(build),
            },
        );
    }

    /// Register a ref the registry recognizes but will not construct.
    ///
    /// Loading or creating it fails [`EngineError::NotAllowed`] instead
    /// of [`EngineError::NotFound`]. Panics if the ref already has an
    /// entry.
    pub fn register_unimplemented(&mut self, reference: ConditionRef) {
        self.insert(
            reference,
            RegistryEntry {
                load: None,
                build: None,
            },
        );
    }

    fn insert(&mut self, reference: ConditionRef, entry: RegistryEntry) {
        if self.entries.contains_key(&reference) {
            panic!("condition {reference} already registered");
        }
        self.entries.insert(reference, entry);
    }

    /// Revive a persisted payload as an idle condition.
    ///
    /// Peeks only the payload's `ref`, then dispatches to that variant's
    /// deserializer. Fails [`EngineError::InvalidArgument`] for an
    /// unparseable payload, [`EngineError::NotFound`] for an
    /// unrecognized ref, [`EngineError::NotAllowed`] for a recognized
    /// but unimplemented one.
    pub fn load(&self, payload: &serde_json::Value) -> Result<Rc<dyn Condition>, EngineError> {
        self.load_record(&ConditionRecord::from_value(payload)?)
    }

    /// [`load`](Self::load) for an already-peeked record.
    pub fn load_record(&self, record: &ConditionRecord) -> Result<Rc<dyn Condition>, EngineError> {
        let entry = self.entry(record.reference())?;
        let Some(load) = entry.load else {
            return Err(EngineError::NotAllowed(format!(
                "{} is recognized but not implemented",
                record.reference()
            )));
        };
        let condition = load(record)?;
        tracing::debug!(condition = %record.reference(), character = %condition.character(), "loaded");
        Ok(condition)
    }

    /// Construct a fresh, not-yet-applied condition.
    ///
    /// `reference` is the canonical `"module:category:id"` string;
    /// `config` is the variant-specific payload (`null` reads as empty);
    /// `provenance` records who granted the condition. Error taxonomy
    /// matches [`load`](Self::load), plus
    /// [`EngineError::InvalidArgument`] for a malformed ref or config.
    pub fn create(
        &self,
        reference: &str,
        config: &serde_json::Value,
        character: impl Into<CharacterId>,
        provenance: impl Into<String>,
    ) -> Result<Rc<dyn Condition>, EngineError> {
        let reference = ConditionRef::parse(reference)?;
        let entry = self.entry(&reference)?;
        let Some(build) = entry.build else {
            return Err(EngineError::NotAllowed(format!(
                "{reference} is recognized but not implemented"
            )));
        };
        let condition = build(config, character.into(), Some(provenance.into()))?;
        tracing::debug!(condition = %reference, character = %condition.character(), "created");
        Ok(condition)
    }

    fn entry(&self, reference: &ConditionRef) -> Result<&RegistryEntry, EngineError> {
        self.entries.get(reference).ok_or_else(|| {
            EngineError::NotFound(format!("no condition registered for {reference}"))
        })
    }

    /// Whether a ref has an entry.
    #[must_use]
    pub fn contains(&self, reference: &ConditionRef) -> bool {
        self.entries.contains_key(reference)
    }

    /// Number of registered refs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate the registered refs.
    pub fn refs(&self) -> impl Iterator<Item = &ConditionRef> {
        self.entries.keys()
    }
}

impl std::fmt::Debug for ConditionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_standard_knows_every_shipped_variant() {
        let registry = ConditionRegistry::standard();

        for reference in [
            Rage::reference(),
            BrutalCritical::reference(),
            Bless::reference(),
            DefensiveStance::reference(),
            ProtectiveAura::reference(),
            Slowed::reference(),
        ] {
            assert!(registry.contains(&reference), "missing {reference}");
        }
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn test_create_then_load_round_trip() {
        let registry = ConditionRegistry::standard();
        let bless = registry
            .create(
                "spell:enchantment:bless",
                &json!({"bonus": 1, "rounds": 3}),
                "cleric-1",
                "spell-cast",
            )
            .unwrap();

        let payload = bless.record().unwrap().to_value();
        let revived = registry.load(&payload).unwrap();

        assert!(!revived.is_applied());
        assert_eq!(revived.record().unwrap().to_value(), payload);
    }

    #[test]
    fn test_unknown_ref_is_not_found() {
        let registry = ConditionRegistry::standard();

        let err = registry
            .load(&json!({"ref": "spell:x:totally-unknown"}))
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));

        let err = registry
            .create("spell:x:totally-unknown", &json!({}), "cleric-1", "test")
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn test_malformed_ref_is_invalid_argument() {
        let registry = ConditionRegistry::standard();
        let err = registry
            .create("not-a-ref", &json!({}), "cleric-1", "test")
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn test_unimplemented_ref_is_not_allowed() {
        let registry = ConditionRegistry::standard();

        let err = registry
            .create("class:druid:wild-shape", &json!({}), "druid-1", "test")
            .unwrap_err();
        assert!(matches!(err, EngineError::NotAllowed(_)));

        let err = registry
            .load(&json!({"ref": "class:druid:wild-shape", "character": "druid-1"}))
            .unwrap_err();
        assert!(matches!(err, EngineError::NotAllowed(_)));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_registration_panics() {
        let mut registry = ConditionRegistry::standard();
        registry.register(Rage::reference(), Rage::load, Rage::build);
    }
}
