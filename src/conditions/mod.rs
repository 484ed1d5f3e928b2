//! Conditions: character-bound behavior units with an applied/idle
//! lifecycle.
//!
//! The contract lives in [`lifecycle`]; [`subscriptions`] carries the
//! shared bookkeeping (the applied-state subscription set and the
//! rollback registrar). The remaining modules are the shipped variant
//! catalog, one per predicate family: identity plus a melee flag
//! ([`Rage`]), identity plus a critical flag ([`BrutalCritical`]),
//! plain identity ([`Bless`], [`Slowed`]), an equipment resource check
//! ([`DefensiveStance`]), and a spatial/relationship check
//! ([`ProtectiveAura`]).

pub mod bless;
pub mod brutal_critical;
pub mod defensive_stance;
pub mod lifecycle;
pub mod protective_aura;
pub mod rage;
pub mod slowed;
pub mod subscriptions;

pub use bless::Bless;
pub use brutal_critical::BrutalCritical;
pub use defensive_stance::DefensiveStance;
pub use lifecycle::Condition;
pub use protective_aura::ProtectiveAura;
pub use rage::Rage;
pub use slowed::Slowed;
pub use subscriptions::{Registrar, SubscriptionSet};
