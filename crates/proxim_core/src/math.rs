//! Deterministic math utilities
//!
//! Re-exports glam with additional deterministic utilities

pub use glam::*;

/// Deterministic random number generator for reproducible populations.
pub struct DeterministicRng {
    seed: u64,
    state: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self { seed, state: seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Simple deterministic pseudo-random (LCG, not for cryptographic use)
    pub fn next_u32(&mut self) -> u32 {
        // LCG constants
        const A: u64 = 1664525;
        const C: u64 = 1013904223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        self.state as u32
    }

    /// Uniform sample in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }

    /// Uniform sample in `[min, max)`.
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }

    /// Uniform point inside the square `[-extent, extent)²`.
    pub fn next_point(&mut self, extent: f64) -> DVec2 {
        DVec2::new(
            self.next_range(-extent, extent),
            self.next_range(-extent, extent),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = DeterministicRng::new(7);
        let mut b = DeterministicRng::new(7);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn samples_stay_in_range() {
        let mut rng = DeterministicRng::new(42);
        for _ in 0..1000 {
            let v = rng.next_range(-5.0, 5.0);
            assert!((-5.0..5.0).contains(&v));
            let p = rng.next_point(100.0);
            assert!(p.x >= -100.0 && p.x < 100.0);
            assert!(p.y >= -100.0 && p.y < 100.0);
        }
    }
}
