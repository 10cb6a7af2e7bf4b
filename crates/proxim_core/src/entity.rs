//! Entity identity and per-tick position snapshots.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity handle (opaque, stable for the lifetime of the entity)
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity:{}", self.0)
    }
}

/// Anything that can take part in distance queries: a stable identity plus a
/// 2D position read at snapshot time.
pub trait Positioned {
    fn id(&self) -> EntityId;

    fn position(&self) -> DVec2;
}

/// Plain snapshot record handed over by the simulation driver each tick.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub position: DVec2,
}

impl EntityRef {
    pub fn new(id: EntityId, position: DVec2) -> Self {
        Self { id, position }
    }

    pub fn at(raw_id: u64, x: f64, y: f64) -> Self {
        Self::new(EntityId::from_raw(raw_id), DVec2::new(x, y))
    }
}

impl Positioned for EntityRef {
    #[inline]
    fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    fn position(&self) -> DVec2 {
        self.position
    }
}

impl<T: Positioned + ?Sized> Positioned for &T {
    #[inline]
    fn id(&self) -> EntityId {
        (**self).id()
    }

    #[inline]
    fn position(&self) -> DVec2 {
        (**self).position()
    }
}
