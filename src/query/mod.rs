//! Read-only ambient query ports.
//!
//! The engine's seam to game knowledge it does not own. Hosts attach
//! implementations to a [`QueryPorts`] bundle; conditions query it by
//! character id and treat `None` as "cannot verify, decline to modify".

pub mod ports;
pub mod tables;

pub use ports::{AttributeSource, GridIndex, QueryPorts, TeamIndex};
pub use tables::{AttributeTable, GridTable, TeamTable};
