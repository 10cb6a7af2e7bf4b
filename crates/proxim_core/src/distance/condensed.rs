//! Upper-triangular offset arithmetic for the condensed distance vector.
//!
//! Pairs are enumerated row by row: `(0,1), (0,2), .., (0,n-1), (1,2), ..`.
//! For a pair with smaller index `a` and larger index `b`, row `a` starts at
//! `n·a − a·(a+1)/2` and the pair sits `b − a − 1` slots into that row.

use super::error::IndexError;

/// Number of unordered pairs among `n` entities, or `None` if it does not
/// fit in a `usize`.
#[inline]
pub fn condensed_len(n: usize) -> Option<usize> {
    if n < 2 {
        Some(0)
    } else {
        half_product(n, n - 1)
    }
}

/// Map two distinct dense indices to their slot in the condensed vector.
///
/// Argument order does not matter: `condensed_offset(i, j, n) == condensed_offset(j, i, n)`.
/// Indices outside `[0, n)` and self pairs are rejected instead of wrapping,
/// and so is any `n` whose offsets do not fit in a `usize`.
#[inline]
pub fn condensed_offset(i: usize, j: usize, n: usize) -> Result<usize, IndexError> {
    if i == j {
        return Err(IndexError::SelfIndex { index: i });
    }
    let (a, b) = if i < j { (i, j) } else { (j, i) };
    if b >= n {
        return Err(IndexError::OutOfRange { index: b, n });
    }
    row_start(a, n)
        .and_then(|start| start.checked_add(b - a - 1))
        .ok_or(IndexError::Overflow { n })
}

/// Offset of the first pair `(a, a+1)` in row `a`, i.e. `a·(2n − a − 1)/2`.
///
/// Requires `a < n`.
#[inline]
fn row_start(a: usize, n: usize) -> Option<usize> {
    let span = n.checked_add(n - a - 1)?;
    half_product(a, span)
}

/// `x·y/2` for factors of which at least one is even, halving before the
/// multiply so only a result that itself overflows is reported.
#[inline]
fn half_product(x: usize, y: usize) -> Option<usize> {
    if x % 2 == 0 {
        (x / 2).checked_mul(y)
    } else {
        x.checked_mul(y / 2)
    }
}
