//! Proxim Core
//!
//! Contains the tick-scoped spatial primitives:
//! - Entity identity and position snapshots
//! - Deterministic tick clock and math
//! - Per-tick pairwise distance cache

pub mod distance;
pub mod entity;
pub mod math;
pub mod time;

pub use glam;

pub use entity::{EntityId, EntityRef, Positioned};
pub use time::{Tick, TickClock};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
