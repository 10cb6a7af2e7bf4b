use crate::entity::EntityId;
use crate::time::Tick;
use thiserror::Error;

/// Errors raised by condensed-offset arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("no condensed entry for self pair ({index}, {index}); self distance is not stored")]
    SelfIndex { index: usize },

    #[error("dense index {index} out of range for {n} entities")]
    OutOfRange { index: usize, n: usize },

    #[error("condensed offsets for {n} entities do not fit in usize")]
    Overflow { n: usize },
}

/// Errors that can occur while building or reading the per-tick distance cache.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistanceError {
    #[error("{id} appears twice in the snapshot (indices {first} and {second})")]
    DuplicateEntity {
        id: EntityId,
        first: usize,
        second: usize,
    },

    #[error("{id} is not part of the snapshot for tick {tick}")]
    UnknownEntity { id: EntityId, tick: Tick },

    #[error("distance from {id} to itself requested; handle self comparison at the call site")]
    SelfDistance { id: EntityId },

    #[error("condensed vector holds {actual} entries but {n} entities require {expected}")]
    SizeMismatch {
        n: usize,
        expected: usize,
        actual: usize,
    },

    #[error("cached squared distance {cached} between indices {a} and {b} disagrees with direct value {direct}")]
    VerificationFailed {
        a: usize,
        b: usize,
        cached: f64,
        direct: f64,
    },

    #[error(transparent)]
    Index(#[from] IndexError),
}
