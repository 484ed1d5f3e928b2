//! Table-backed port implementations.
//!
//! Small in-memory implementations of the query ports, enough for hosts
//! that keep character sheets in plain maps and for deterministic tests.
//! Anything the tables were never told answers `None`.

use rustc_hash::FxHashMap;

use crate::core::CharacterId;
use crate::events::Ability;

use super::ports::{AttributeSource, GridIndex, TeamIndex};

/// Attribute port backed by per-character tables.
#[derive(Clone, Debug, Default)]
pub struct AttributeTable {
    scores: FxHashMap<(CharacterId, Ability), i32>,
    equipment: FxHashMap<CharacterId, Vec<String>>,
    reactions: FxHashMap<CharacterId, bool>,
}

impl AttributeTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an ability score (builder pattern).
    #[must_use]
    pub fn with_score(mut self, character: impl Into<CharacterId>, ability: Ability, score: i32) -> Self {
        self.scores.insert((character.into(), ability), score);
        self
    }

    /// Record an equipped item (builder pattern).
    #[must_use]
    pub fn with_equipped(mut self, character: impl Into<CharacterId>, item: impl Into<String>) -> Self {
        self.equipment
            .entry(character.into())
            .or_default()
            .push(item.into());
        self
    }

    /// Record whether the reaction is available (builder pattern).
    #[must_use]
    pub fn with_reaction(mut self, character: impl Into<CharacterId>, available: bool) -> Self {
        self.reactions.insert(character.into(), available);
        self
    }
}

impl AttributeSource for AttributeTable {
    fn ability_score(&self, character: &CharacterId, ability: Ability) -> Option<i32> {
        self.scores.get(&(character.clone(), ability)).copied()
    }

    fn has_equipped(&self, character: &CharacterId, item: &str) -> Option<bool> {
        // A character with no recorded loadout is unknown, not unequipped.
        self.equipment
            .get(character)
            .map(|items| items.iter().any(|i| i == item))
    }

    fn reaction_available(&self, character: &CharacterId) -> Option<bool> {
        self.reactions.get(character).copied()
    }
}

/// Grid port backed by square coordinates.
///
/// Positions are 5-foot grid squares; distance is the chessboard metric
/// in squares, times five.
#[derive(Clone, Debug, Default)]
pub struct GridTable {
    positions: FxHashMap<CharacterId, (i32, i32)>,
}

impl GridTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a character on a grid square (builder pattern).
    #[must_use]
    pub fn with_position(mut self, character: impl Into<CharacterId>, x: i32, y: i32) -> Self {
        self.positions.insert(character.into(), (x, y));
        self
    }
}

impl GridIndex for GridTable {
    fn distance_feet(&self, a: &CharacterId, b: &CharacterId) -> Option<u32> {
        let (ax, ay) = self.positions.get(a)?;
        let (bx, by) = self.positions.get(b)?;
        let squares = (ax - bx).unsigned_abs().max((ay - by).unsigned_abs());
        Some(squares * 5)
    }
}

/// Team port backed by a character-to-team map.
///
/// Two characters are allied when they are on the same team; a character
/// is always allied with itself, even one the table has never seen.
#[derive(Clone, Debug, Default)]
pub struct TeamTable {
    teams: FxHashMap<CharacterId, String>,
}

impl TeamTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a character to a team (builder pattern).
    #[must_use]
    pub fn with_member(mut self, team: impl Into<String>, character: impl Into<CharacterId>) -> Self {
        self.teams.insert(character.into(), team.into());
        self
    }
}

impl TeamIndex for TeamTable {
    fn allied(&self, a: &CharacterId, b: &CharacterId) -> Option<bool> {
        if a == b {
            return Some(true);
        }
        let team_a = self.teams.get(a)?;
        let team_b = self.teams.get(b)?;
        Some(team_a == team_b)
    }
}
