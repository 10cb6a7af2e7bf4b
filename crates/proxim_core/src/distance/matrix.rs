//! Condensed pairwise squared-distance storage, rebuilt at most once per tick.
//!
//! Distances are kept squared: most consumers only compare or rank them, and
//! the square root is taken on demand by [`DistanceQuery::distance`].
//!
//! [`DistanceQuery::distance`]: super::DistanceQuery::distance

use super::condensed::{condensed_len, condensed_offset};
use super::config::DistanceConfig;
use super::error::{DistanceError, IndexError};
use crate::entity::Positioned;
use crate::time::Tick;
use rayon::prelude::*;

/// Squared distances for every unordered pair `(a, b)`, `a < b`, in
/// row-major upper-triangular order.
#[derive(Debug, Clone, Default)]
pub struct CondensedDistanceVector {
    tick: Option<Tick>,
    n: usize,
    values: Vec<f64>,
}

impl CondensedDistanceVector {
    #[inline]
    pub fn tick(&self) -> Option<Tick> {
        self.tick
    }

    /// Number of entities the vector was built from.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, offset: usize) -> Option<f64> {
        self.values.get(offset).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Iterate `(a, b, squared)` in storage order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.n;
        (0..n)
            .flat_map(move |a| ((a + 1)..n).map(move |b| (a, b)))
            .zip(self.values.iter().copied())
            .map(|((a, b), value)| (a, b, value))
    }
}

/// Builds the condensed vector lazily, keyed to tick identity.
#[derive(Debug, Default)]
pub struct DistanceMatrixCache {
    config: DistanceConfig,
    /// Flat `[x0, y0, x1, y1, ..]` in dense index order, reused across ticks.
    coords: Vec<f64>,
    vector: CondensedDistanceVector,
    rebuilds: u64,
}

impl DistanceMatrixCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DistanceConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DistanceConfig {
        &self.config
    }

    #[inline]
    pub fn is_fresh(&self, tick: Tick) -> bool {
        self.vector.tick == Some(tick)
    }

    /// Number of full recomputations performed so far.
    #[inline]
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Last built vector, regardless of freshness.
    pub fn current(&self) -> &CondensedDistanceVector {
        &self.vector
    }

    /// Return the vector for `tick`, recomputing every pair from `entities`
    /// (in slice order) if the cached one belongs to another tick.
    ///
    /// Positions are read once per tick. Moving an entity after the first
    /// call for a tick has no effect until the tick advances.
    pub fn compute<E: Positioned>(
        &mut self,
        entities: &[E],
        tick: Tick,
    ) -> Result<&CondensedDistanceVector, DistanceError> {
        if self.is_fresh(tick) {
            return Ok(&self.vector);
        }

        let n = entities.len();
        let expected = condensed_len(n).ok_or(IndexError::Overflow { n })?;
        self.vector.tick = None;
        self.coords.clear();
        self.coords.reserve(2 * n);
        for entity in entities {
            let position = entity.position();
            self.coords.push(position.x);
            self.coords.push(position.y);
        }

        let coords = &self.coords[..];
        let parallel = n >= self.config.parallel_threshold.max(2);
        if parallel {
            self.vector.values = (0..n)
                .into_par_iter()
                .flat_map_iter(move |a| ((a + 1)..n).map(move |b| squared_between(coords, a, b)))
                .collect();
        } else {
            let values = &mut self.vector.values;
            values.clear();
            values.reserve(expected);
            for a in 0..n {
                for b in (a + 1)..n {
                    values.push(squared_between(coords, a, b));
                }
            }
        }
        self.vector.n = n;

        let actual = self.vector.values.len();
        if actual != expected {
            return Err(DistanceError::SizeMismatch {
                n,
                expected,
                actual,
            });
        }

        if self.config.verify_rebuilds {
            verify(&self.vector, coords, self.config.verify_tolerance)?;
        }

        self.vector.tick = Some(tick);
        self.rebuilds += 1;
        tracing::debug!(
            tick = tick.raw(),
            entities = n,
            pairs = expected,
            parallel,
            "rebuilt distance matrix"
        );
        Ok(&self.vector)
    }
}

#[inline]
fn squared_between(coords: &[f64], a: usize, b: usize) -> f64 {
    let dx = coords[2 * a] - coords[2 * b];
    let dy = coords[2 * a + 1] - coords[2 * b + 1];
    dx * dx + dy * dy
}

/// Re-derive every pair through the offset arithmetic and `hypot`.
fn verify(
    vector: &CondensedDistanceVector,
    coords: &[f64],
    tolerance: f64,
) -> Result<(), DistanceError> {
    let n = vector.n;
    for a in 0..n {
        for b in (a + 1)..n {
            let offset = condensed_offset(b, a, n)?;
            let cached = vector.values[offset];
            let dx = coords[2 * a] - coords[2 * b];
            let dy = coords[2 * a + 1] - coords[2 * b + 1];
            let direct = dx.hypot(dy).powi(2);
            if (cached - direct).abs() > tolerance * direct.abs().max(1.0) {
                return Err(DistanceError::VerificationFailed {
                    a,
                    b,
                    cached,
                    direct,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRef;

    fn three_corners() -> Vec<EntityRef> {
        vec![
            EntityRef::at(1, 0.0, 0.0),
            EntityRef::at(2, 1.0, 0.0),
            EntityRef::at(3, 0.0, 1.0),
        ]
    }

    #[test]
    fn triangular_order_for_three_entities() {
        let mut cache = DistanceMatrixCache::new();
        let vector = cache.compute(&three_corners(), Tick::new(1)).unwrap();
        // (0,1), (0,2), (1,2)
        assert_eq!(vector.as_slice(), &[1.0, 1.0, 2.0]);
        assert_eq!(vector.entity_count(), 3);
    }

    #[test]
    fn pairs_walk_storage_order() {
        let mut cache = DistanceMatrixCache::new();
        let vector = cache.compute(&three_corners(), Tick::new(1)).unwrap();
        let pairs: Vec<_> = vector.pairs().collect();
        assert_eq!(pairs, vec![(0, 1, 1.0), (0, 2, 1.0), (1, 2, 2.0)]);
    }

    #[test]
    fn recomputes_only_on_tick_change() {
        let mut cache = DistanceMatrixCache::new();
        let mut entities = three_corners();
        cache.compute(&entities, Tick::new(4)).unwrap();
        cache.compute(&entities, Tick::new(4)).unwrap();
        assert_eq!(cache.rebuilds(), 1);

        // Same-tick movement is not observed.
        entities[1].position.x = 10.0;
        let stale = cache.compute(&entities, Tick::new(4)).unwrap();
        assert_eq!(stale.get(0), Some(1.0));

        let fresh = cache.compute(&entities, Tick::new(5)).unwrap();
        assert_eq!(fresh.get(0), Some(100.0));
        assert_eq!(cache.rebuilds(), 2);
    }

    #[test]
    fn small_populations_yield_empty_vectors() {
        let mut cache = DistanceMatrixCache::new();
        assert!(cache.compute::<EntityRef>(&[], Tick::new(0)).unwrap().is_empty());
        let single = [EntityRef::at(1, 3.0, 4.0)];
        let vector = cache.compute(&single, Tick::new(1)).unwrap();
        assert!(vector.is_empty());
        assert_eq!(vector.entity_count(), 1);
    }

    #[test]
    fn parallel_build_matches_serial() {
        let entities: Vec<EntityRef> = (0..64)
            .map(|i| EntityRef::at(i, (i * 7 % 13) as f64 * 0.5, (i * 3 % 11) as f64 - 4.0))
            .collect();

        let mut serial = DistanceMatrixCache::with_config(DistanceConfig {
            parallel_threshold: usize::MAX,
            ..DistanceConfig::default()
        });
        let mut parallel = DistanceMatrixCache::with_config(DistanceConfig {
            parallel_threshold: 2,
            ..DistanceConfig::default()
        });

        let a = serial.compute(&entities, Tick::new(1)).unwrap().as_slice().to_vec();
        let b = parallel.compute(&entities, Tick::new(1)).unwrap().as_slice().to_vec();
        assert_eq!(Some(a.len()), condensed_len(64));
        assert_eq!(a, b);
    }

    #[test]
    fn verification_pass_accepts_consistent_rebuilds() {
        let mut cache = DistanceMatrixCache::with_config(DistanceConfig {
            verify_rebuilds: true,
            ..DistanceConfig::default()
        });
        let entities: Vec<EntityRef> = (0..20)
            .map(|i| EntityRef::at(i, i as f64 * 1.25, -(i as f64) * 0.75))
            .collect();
        assert!(cache.compute(&entities, Tick::new(9)).is_ok());
    }

    #[test]
    fn verification_reports_the_corrupted_pair() {
        let entities: Vec<EntityRef> = (0..5)
            .map(|i| EntityRef::at(i, i as f64 * 2.0, (i % 2) as f64))
            .collect();
        let mut cache = DistanceMatrixCache::new();
        cache.compute(&entities, Tick::new(1)).unwrap();
        assert_eq!(verify(&cache.vector, &cache.coords, 1e-5), Ok(()));

        let mut corrupted = cache.vector.clone();
        let offset = condensed_offset(3, 1, 5).unwrap();
        let original = corrupted.values[offset];
        corrupted.values[offset] += 0.5;

        match verify(&corrupted, &cache.coords, 1e-5) {
            Err(DistanceError::VerificationFailed {
                a,
                b,
                cached,
                direct,
            }) => {
                assert_eq!((a, b), (1, 3));
                assert_eq!(cached, original + 0.5);
                assert_eq!(direct, original);
            }
            other => panic!("expected a verification failure, got {other:?}"),
        }
    }

    #[test]
    fn verification_tolerance_is_relative_above_one() {
        let entities = [EntityRef::at(1, 0.0, 0.0), EntityRef::at(2, 3.0, 4.0)];
        let mut cache = DistanceMatrixCache::new();
        cache.compute(&entities, Tick::new(1)).unwrap();

        // 25 * 1e-5 allows 2.5e-4 of drift.
        let mut vector = cache.vector.clone();
        vector.values[0] = 25.0002;
        assert_eq!(verify(&vector, &cache.coords, 1e-5), Ok(()));
        vector.values[0] = 25.0003;
        assert!(matches!(
            verify(&vector, &cache.coords, 1e-5),
            Err(DistanceError::VerificationFailed { a: 0, b: 1, .. })
        ));
    }

    #[test]
    fn verification_tolerance_is_absolute_below_one() {
        let entities = [EntityRef::at(1, 0.0, 0.0), EntityRef::at(2, 0.5, 0.0)];
        let mut cache = DistanceMatrixCache::new();
        cache.compute(&entities, Tick::new(1)).unwrap();
        assert_eq!(cache.vector.values, vec![0.25]);

        // A purely relative bound would be 2.5e-6 here.
        let mut vector = cache.vector.clone();
        vector.values[0] = 0.25 + 5e-6;
        assert_eq!(verify(&vector, &cache.coords, 1e-5), Ok(()));
        vector.values[0] = 0.25 + 2e-5;
        assert!(matches!(
            verify(&vector, &cache.coords, 1e-5),
            Err(DistanceError::VerificationFailed { a: 0, b: 1, .. })
        ));
    }
}
