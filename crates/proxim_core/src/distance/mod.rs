//! Per-tick pairwise distance cache.
//!
//! Given the entity snapshot of the current tick, all pairwise squared
//! distances are computed once, on the first query of the tick, and stored in
//! a condensed upper-triangular vector. Every later query in the same tick is
//! an index lookup. The cache goes stale implicitly when the tick advances.
//!
//! ```ignore
//! let mut cache = DistanceCache::new();
//! let mut query = cache.query(&entities, clock.current());
//! let d = query.distance(marine, zealot)?;
//! ```
//!
//! Positions are captured when the tick's first query runs. Moving entities
//! later in the same tick is not reflected until the next tick.

mod condensed;
mod config;
mod direct;
mod error;
mod index;
mod matrix;
mod query;

pub use condensed::{condensed_len, condensed_offset};
pub use config::DistanceConfig;
pub use direct::{
    distance_point_to_point, distance_squared_point_to_point, distances_from_entities_to_point,
    distances_from_entity_to_points, DistancesToPoint, DistancesToPoints,
};
pub use error::{DistanceError, IndexError};
pub use index::{IndexAssigner, IndexMap};
pub use matrix::{CondensedDistanceVector, DistanceMatrixCache};
pub use query::{CacheState, CacheStats, DistanceCache, DistanceQuery};
