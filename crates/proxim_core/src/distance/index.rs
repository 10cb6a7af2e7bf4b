//! Dense per-tick index assignment.

use super::error::DistanceError;
use crate::entity::{EntityId, Positioned};
use crate::time::Tick;
use std::collections::HashMap;

/// Mapping from entity identity to a dense index in `[0, n)` for one tick.
///
/// Indices follow the snapshot's iteration order, the same order the
/// condensed vector is built in.
#[derive(Debug, Clone, Default)]
pub struct IndexMap {
    tick: Option<Tick>,
    ids: Vec<EntityId>,
    lookup: HashMap<EntityId, usize>,
}

impl IndexMap {
    /// Tick this map was generated for, `None` before the first build.
    #[inline]
    pub fn tick(&self) -> Option<Tick> {
        self.tick
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.lookup.get(&id).copied()
    }

    #[inline]
    pub fn id_at(&self, index: usize) -> Option<EntityId> {
        self.ids.get(index).copied()
    }

    /// Identifiers in dense index order.
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, EntityId)> + '_ {
        self.ids.iter().copied().enumerate()
    }

    fn clear(&mut self) {
        self.tick = None;
        self.ids.clear();
        self.lookup.clear();
    }
}

/// Assigns dense indices once per tick and serves the cached map otherwise.
#[derive(Debug, Default)]
pub struct IndexAssigner {
    map: IndexMap,
}

impl IndexAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_fresh(&self, tick: Tick) -> bool {
        self.map.tick == Some(tick)
    }

    /// Last built map, regardless of freshness.
    pub fn current(&self) -> &IndexMap {
        &self.map
    }

    /// Return the map for `tick`, rebuilding it from `entities` if it was
    /// generated for a different tick.
    ///
    /// A duplicate identifier leaves the assigner stale; no partial map is
    /// ever served.
    pub fn assign<E: Positioned>(
        &mut self,
        entities: &[E],
        tick: Tick,
    ) -> Result<&IndexMap, DistanceError> {
        if self.is_fresh(tick) {
            return Ok(&self.map);
        }

        self.map.clear();
        self.map.ids.reserve(entities.len());
        self.map.lookup.reserve(entities.len());

        for (index, entity) in entities.iter().enumerate() {
            let id = entity.id();
            if let Some(&first) = self.map.lookup.get(&id) {
                self.map.clear();
                return Err(DistanceError::DuplicateEntity {
                    id,
                    first,
                    second: index,
                });
            }
            self.map.lookup.insert(id, index);
            self.map.ids.push(id);
        }

        self.map.tick = Some(tick);
        tracing::debug!(tick = tick.raw(), entities = self.map.len(), "rebuilt index map");
        Ok(&self.map)
    }
}
