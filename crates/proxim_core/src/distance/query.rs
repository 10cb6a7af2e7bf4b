//! Session-owned cache and the per-tick query view over it.

use super::condensed::{condensed_len, condensed_offset};
use super::config::DistanceConfig;
use super::direct::{self, DistancesToPoint, DistancesToPoints};
use super::error::{DistanceError, IndexError};
use super::index::{IndexAssigner, IndexMap};
use super::matrix::{CondensedDistanceVector, DistanceMatrixCache};
use crate::entity::{EntityId, Positioned};
use crate::time::Tick;
use glam::DVec2;
use proxim_metrics::SystemProfiler;
use std::time::Duration;

const MATRIX_REBUILD: &str = "distance.matrix.rebuild";

/// Freshness of the cache relative to a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Stale,
    Fresh,
}

/// Rebuild and lookup counters, always compiled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub index_rebuilds: u64,
    pub matrix_rebuilds: u64,
    /// Successful reads served from the cached vector. A pairwise read counts
    /// once; so does a whole-row read such as [`DistanceQuery::closest_to`].
    pub lookups: u64,
}

/// Per-session distance cache.
///
/// Holds the dense index map and the condensed squared-distance vector for
/// the most recent tick. Nothing is computed until the first query of a
/// tick; every further query in that tick reads the cached vector.
///
/// Each session must own its own instance: correctness relies on one entity
/// ordering and one tick value per cache.
pub struct DistanceCache {
    assigner: IndexAssigner,
    matrix: DistanceMatrixCache,
    stats: CacheStats,
    profiler: SystemProfiler,
    last_tick: Option<Tick>,
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::with_config(DistanceConfig::default())
    }

    pub fn with_config(config: DistanceConfig) -> Self {
        Self {
            assigner: IndexAssigner::new(),
            matrix: DistanceMatrixCache::with_config(config),
            stats: CacheStats::default(),
            profiler: SystemProfiler::new(),
            last_tick: None,
        }
    }

    pub fn config(&self) -> &DistanceConfig {
        self.matrix.config()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Accumulated time spent rebuilding the matrix (zero without `metrics`).
    pub fn rebuild_time(&self) -> Duration {
        self.profiler.get_timing(MATRIX_REBUILD)
    }

    #[inline]
    pub fn is_fresh(&self, tick: Tick) -> bool {
        self.assigner.is_fresh(tick) && self.matrix.is_fresh(tick)
    }

    pub fn state(&self, tick: Tick) -> CacheState {
        if self.is_fresh(tick) {
            CacheState::Fresh
        } else {
            CacheState::Stale
        }
    }

    pub fn index_map(&self) -> &IndexMap {
        self.assigner.current()
    }

    pub fn vector(&self) -> &CondensedDistanceVector {
        self.matrix.current()
    }

    /// Perform the STALE→FRESH transition for `tick`. A no-op if already fresh.
    ///
    /// `entities` must be the same snapshot, in the same order, for every
    /// call within one tick. Changes made to it after the first call of a
    /// tick are not observed until the tick advances.
    pub fn ensure_fresh<E: Positioned>(
        &mut self,
        entities: &[E],
        tick: Tick,
    ) -> Result<(), DistanceError> {
        if self.is_fresh(tick) {
            tracing::trace!(tick = tick.raw(), "distance cache hit");
            return Ok(());
        }

        if let Some(last) = self.last_tick {
            if tick < last {
                tracing::warn!(
                    tick = tick.raw(),
                    last = last.raw(),
                    "tick went backwards; rebuilding distance cache"
                );
            }
        }
        self.last_tick = Some(tick);

        if !self.assigner.is_fresh(tick) {
            self.assigner.assign(entities, tick)?;
            self.stats.index_rebuilds += 1;
        }

        if !self.matrix.is_fresh(tick) {
            let matrix = &mut self.matrix;
            self.profiler
                .time_system(MATRIX_REBUILD, || matrix.compute(entities, tick).map(|_| ()))?;
            self.stats.matrix_rebuilds += 1;
        }
        Ok(())
    }

    /// Borrow a view for `tick` over `entities`. Creating the view computes nothing.
    pub fn query<'a, E: Positioned>(
        &'a mut self,
        entities: &'a [E],
        tick: Tick,
    ) -> DistanceQuery<'a, E> {
        DistanceQuery {
            cache: self,
            entities,
            tick,
        }
    }

    fn resolve(&self, id: EntityId, tick: Tick) -> Result<usize, DistanceError> {
        self.assigner
            .current()
            .index_of(id)
            .ok_or(DistanceError::UnknownEntity { id, tick })
    }

    fn squared_distance<E: Positioned>(
        &mut self,
        entities: &[E],
        tick: Tick,
        a: EntityId,
        b: EntityId,
    ) -> Result<f64, DistanceError> {
        self.ensure_fresh(entities, tick)?;

        let ia = self.resolve(a, tick)?;
        let ib = self.resolve(b, tick)?;
        if a == b {
            return Err(DistanceError::SelfDistance { id: a });
        }

        let n = self.assigner.current().len();
        let vector = self.checked_vector(n)?;
        let offset = condensed_offset(ia, ib, n)?;
        // In bounds: the shape check pins the length to condensed_len(n).
        let value = vector.as_slice()[offset];
        self.stats.lookups += 1;
        Ok(value)
    }

    /// One row of the matrix: `id` against every other entity, in snapshot order.
    fn squared_row<E: Positioned>(
        &mut self,
        entities: &[E],
        tick: Tick,
        id: EntityId,
    ) -> Result<Vec<(EntityId, f64)>, DistanceError> {
        self.ensure_fresh(entities, tick)?;
        let ia = self.resolve(id, tick)?;

        let ids = self.assigner.current().ids();
        let n = ids.len();
        let vector = self.checked_vector(n)?;
        let mut row = Vec::with_capacity(n.saturating_sub(1));
        for (ib, &other) in ids.iter().enumerate() {
            if ib == ia {
                continue;
            }
            let offset = condensed_offset(ia, ib, n)?;
            row.push((other, vector.as_slice()[offset]));
        }
        self.stats.lookups += 1;
        Ok(row)
    }

    /// The cached vector, provided its shape matches `n` entities.
    fn checked_vector(&self, n: usize) -> Result<&CondensedDistanceVector, DistanceError> {
        let vector = self.matrix.current();
        let expected = condensed_len(n).ok_or(IndexError::Overflow { n })?;
        if vector.entity_count() != n || vector.len() != expected {
            return Err(DistanceError::SizeMismatch {
                n,
                expected,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}

impl Default for DistanceCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Read view over a [`DistanceCache`] for one tick and one entity snapshot.
pub struct DistanceQuery<'a, E> {
    cache: &'a mut DistanceCache,
    entities: &'a [E],
    tick: Tick,
}

impl<'a, E: Positioned> DistanceQuery<'a, E> {
    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn entities(&self) -> &'a [E] {
        self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn state(&self) -> CacheState {
        self.cache.state(self.tick)
    }

    pub fn ensure_fresh(&mut self) -> Result<(), DistanceError> {
        self.cache.ensure_fresh(self.entities, self.tick)
    }

    /// Dense index of `id` for this tick.
    pub fn index_of(&mut self, id: EntityId) -> Result<usize, DistanceError> {
        self.ensure_fresh()?;
        self.cache.resolve(id, self.tick)
    }

    /// Cached squared distance between two distinct entities of this tick's snapshot.
    pub fn squared_distance(&mut self, a: EntityId, b: EntityId) -> Result<f64, DistanceError> {
        self.cache.squared_distance(self.entities, self.tick, a, b)
    }

    /// Exact distance, derived from [`squared_distance`](Self::squared_distance).
    pub fn distance(&mut self, a: EntityId, b: EntityId) -> Result<f64, DistanceError> {
        Ok(self.squared_distance(a, b)?.sqrt())
    }

    /// Nearest other entity to `id` and its squared distance, `None` when
    /// `id` is alone in the snapshot.
    pub fn closest_to(&mut self, id: EntityId) -> Result<Option<(EntityId, f64)>, DistanceError> {
        let mut best: Option<(EntityId, f64)> = None;
        for (other, squared) in self.squared_distances_from(id)? {
            match best {
                Some((_, best_sq)) if squared >= best_sq => {}
                _ => best = Some((other, squared)),
            }
        }
        Ok(best)
    }

    /// Entities strictly closer than `radius` to `id`, in snapshot order.
    ///
    /// Nothing is strictly closer than a zero, negative or NaN radius, so
    /// those yield an empty list once `id` has been resolved.
    pub fn closer_than(&mut self, id: EntityId, radius: f64) -> Result<Vec<EntityId>, DistanceError> {
        if radius <= 0.0 || radius.is_nan() {
            self.index_of(id)?;
            return Ok(Vec::new());
        }
        let radius_sq = radius * radius;
        Ok(self
            .squared_distances_from(id)?
            .into_iter()
            .filter(|&(_, squared)| squared < radius_sq)
            .map(|(other, _)| other)
            .collect())
    }

    /// Cached squared distances from `id` to every other entity, in snapshot order.
    pub fn squared_distances_from(
        &mut self,
        id: EntityId,
    ) -> Result<Vec<(EntityId, f64)>, DistanceError> {
        self.cache.squared_row(self.entities, self.tick, id)
    }

    /// Direct distances from `entity` to each point; bypasses the cache.
    pub fn distances_from_entity_to_points<I>(
        &self,
        entity: &E,
        points: I,
    ) -> DistancesToPoints<I::IntoIter>
    where
        I: IntoIterator<Item = DVec2>,
    {
        direct::distances_from_entity_to_points(entity, points)
    }

    /// Direct distances from every entity of the snapshot to `point`; bypasses the cache.
    pub fn distances_from_entities_to_point(&self, point: DVec2) -> DistancesToPoint<'a, E> {
        direct::distances_from_entities_to_point(self.entities, point)
    }
}
