//! Read-only query ports.
//!
//! Conditions sometimes need game knowledge the engine does not own:
//! ability scores, equipped items, positions, team membership. Ports are
//! the seam - the host supplies implementations, the engine only ever
//! reads. Every answer is an `Option`: `None` means "cannot verify", and
//! a condition that cannot verify its predicate declines to modify the
//! event rather than failing the chain.

use std::rc::Rc;

use crate::core::CharacterId;
use crate::events::Ability;

/// Character attributes: scores, equipment, action economy.
pub trait AttributeSource {
    /// The character's score for one ability.
    fn ability_score(&self, character: &CharacterId, ability: Ability) -> Option<i32>;

    /// Whether the character has the named item equipped.
    fn has_equipped(&self, character: &CharacterId, item: &str) -> Option<bool>;

    /// Whether the character's reaction is still available this round.
    fn reaction_available(&self, character: &CharacterId) -> Option<bool>;
}

/// Spatial lookups over the battle grid.
pub trait GridIndex {
    /// Distance between two characters, in feet.
    fn distance_feet(&self, a: &CharacterId, b: &CharacterId) -> Option<u32>;
}

/// Team and ally relationships.
pub trait TeamIndex {
    /// Whether two characters count as allies.
    fn allied(&self, a: &CharacterId, b: &CharacterId) -> Option<bool>;
}

/// The bundle of ports a condition receives at apply time.
///
/// Cheap to clone (shared handles); conditions capture a clone in the
/// handlers they subscribe so predicates can be evaluated at event time.
/// Ports left unset answer `None` to everything.
#[derive(Clone, Default)]
pub struct QueryPorts {
    attributes: Option<Rc<dyn AttributeSource>>,
    grid: Option<Rc<dyn GridIndex>>,
    team: Option<Rc<dyn TeamIndex>>,
}

impl QueryPorts {
    /// Ports with nothing attached: every query answers `None`.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Attach an attribute source (builder pattern).
    #[must_use]
    pub fn with_attributes(mut self, source: impl AttributeSource + 'static) -> Self {
        self.attributes = Some(Rc::new(source));
        self
    }

    /// Attach a grid index (builder pattern).
    #[must_use]
    pub fn with_grid(mut self, grid: impl GridIndex + 'static) -> Self {
        self.grid = Some(Rc::new(grid));
        self
    }

    /// Attach a team index (builder pattern).
    #[must_use]
    pub fn with_team(mut self, team: impl TeamIndex + 'static) -> Self {
        self.team = Some(Rc::new(team));
        self
    }

    /// The character's score for one ability.
    pub fn ability_score(&self, character: &CharacterId, ability: Ability) -> Option<i32> {
        self.attributes
            .as_ref()
            .and_then(|a| a.ability_score(character, ability))
    }

    /// Whether the character has the named item equipped.
    pub fn has_equipped(&self, character: &CharacterId, item: &str) -> Option<bool> {
        self.attributes
            .as_ref()
            .and_then(|a| a.has_equipped(character, item))
    }

    /// Whether the character's reaction is still available.
    pub fn reaction_available(&self, character: &CharacterId) -> Option<bool> {
        self.attributes
            .as_ref()
            .and_then(|a| a.reaction_available(character))
    }

    /// Distance between two characters, in feet.
    pub fn distance_feet(&self, a: &CharacterId, b: &CharacterId) -> Option<u32> {
        self.grid.as_ref().and_then(|g| g.distance_feet(a, b))
    }

    /// Whether two characters count as allies.
    pub fn allied(&self, a: &CharacterId, b: &CharacterId) -> Option<bool> {
        self.team.as_ref().and_then(|t| t.allied(a, b))
    }
}

impl std::fmt::Debug for QueryPorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryPorts")
            .field("attributes", &self.attributes.is_some())
            .field("grid", &self.grid.is_some())
            .field("team", &self.team.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_ports_answer_none() {
        let ports = QueryPorts::none();
        let a = CharacterId::new("a");
        let b = CharacterId::new("b");

        assert_eq!(ports.ability_score(&a, Ability::Strength), None);
        assert_eq!(ports.has_equipped(&a, "shield"), None);
        assert_eq!(ports.reaction_available(&a), None);
        assert_eq!(ports.distance_feet(&a, &b), None);
        assert_eq!(ports.allied(&a, &b), None);
    }
}
