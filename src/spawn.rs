//! Spawn context for pattern generation.
//!
//! Every generator draws its randomized initial values through a
//! [`SpawnContext`], so a whole scene can be made reproducible by seeding a
//! single source.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Random source with helpers for the scatter patterns the generators use.
///
/// ```ignore
/// let mut ctx = SpawnContext::seeded(7);
/// let x = ctx.centered(frustum.width);   // uniform in ±width/2
/// let sign = ctx.sign();                 // -1.0 or 1.0
/// ```
#[derive(Clone, Debug)]
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context seeded from the wall clock.
    ///
    /// Different every program execution, like the editor's `Math.random`.
    pub fn new() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::seeded(seed)
    }

    /// Create a deterministic context.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Split off an independent RNG for state that keeps drawing after
    /// generation (e.g. per-frame color resampling).
    pub fn fork(&mut self) -> SmallRng {
        SmallRng::seed_from_u64(self.rng.gen())
    }

    // ========== Random primitives ==========

    /// Random f32 in `0.0..1.0`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `min..max`. A collapsed range returns `min`.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random() * (max - min)
    }

    /// Uniform in `-extent/2..extent/2`.
    #[inline]
    pub fn centered(&mut self, extent: f32) -> f32 {
        (self.random() - 0.5) * extent
    }

    /// Random index in `0..len`. `len` must be non-zero.
    #[inline]
    pub fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Random integer in `min..=max`.
    #[inline]
    pub fn random_int(&mut self, min: u32, max: u32) -> u32 {
        self.rng.gen_range(min..=max)
    }

    /// `-1.0` or `1.0` with equal probability.
    #[inline]
    pub fn sign(&mut self) -> f32 {
        if self.rng.gen_bool(0.5) {
            -1.0
        } else {
            1.0
        }
    }

    // ========== Layout helpers ==========

    /// Random point in a centered `width × height × depth` box.
    pub fn in_box(&mut self, width: f32, height: f32, depth: f32) -> Vec3 {
        Vec3::new(
            self.centered(width),
            self.centered(height),
            self.centered(depth),
        )
    }
}

impl Default for SpawnContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalized index position `index / (count - 1)`, safe for a single entity.
#[inline]
pub fn progress(index: usize, count: usize) -> f32 {
    index as f32 / count.saturating_sub(1).max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SpawnContext::seeded(9);
        let mut b = SpawnContext::seeded(9);
        for _ in 0..16 {
            assert_eq!(a.random(), b.random());
        }
    }

    #[test]
    fn test_centered_bounds() {
        let mut ctx = SpawnContext::seeded(1);
        for _ in 0..200 {
            let v = ctx.centered(10.0);
            assert!((-5.0..5.0).contains(&v));
        }
    }

    #[test]
    fn test_random_range_collapsed() {
        let mut ctx = SpawnContext::seeded(2);
        assert_eq!(ctx.random_range(3.0, 3.0), 3.0);
    }

    #[test]
    fn test_random_int_inclusive() {
        let mut ctx = SpawnContext::seeded(3);
        let mut seen_max = false;
        for _ in 0..500 {
            let v = ctx.random_int(1, 6);
            assert!((1..=6).contains(&v));
            seen_max |= v == 6;
        }
        assert!(seen_max);
    }

    #[test]
    fn test_progress() {
        assert_eq!(progress(0, 1), 0.0);
        assert_eq!(progress(4, 5), 1.0);
        assert!((progress(1, 3) - 0.5).abs() < 1e-6);
    }
}
