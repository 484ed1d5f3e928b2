//! Character identification.
//!
//! Every combatant is addressed by a `CharacterId`, an opaque string id
//! assigned by the host ("barbarian-1", "goblin-3"). The engine never
//! interprets ids beyond equality - conditions use them to decide whether
//! an in-flight event concerns their bound character.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a combatant.
///
/// The engine only ever compares ids for equality. Hosts are free to use
/// any scheme (slugs, UUIDs, save-file keys).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(String);

impl CharacterId {
    /// Create a new character id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CharacterId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CharacterId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
