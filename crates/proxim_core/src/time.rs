//! Deterministic tick counter
//!
//! Ticks are turn-stepped and never go backwards within a session. All
//! tick-scoped caches compare against the current [`Tick`] to decide freshness.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete simulation step.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Tick(u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// The tick immediately after this one.
    #[inline]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u64> for Tick {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Session tick tracker
pub struct TickClock {
    current: Tick,
}

impl TickClock {
    pub fn new() -> Self {
        Self {
            current: Tick::ZERO,
        }
    }

    /// Start counting from an arbitrary tick (e.g. when joining a running session).
    pub fn starting_at(tick: Tick) -> Self {
        Self { current: tick }
    }

    pub fn current(&self) -> Tick {
        self.current
    }

    pub fn advance(&mut self) -> Tick {
        self.current = self.current.next();
        self.current
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}
