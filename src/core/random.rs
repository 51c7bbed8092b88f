//! Random source consumed by the physics.
//!
//! Behaviors only see `&mut dyn RandomSource`, so tests can script outcomes and
//! the engine can run deterministically from a seed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource {
    /// Uniform float in [0, 1)
    fn next_f32(&mut self) -> f32;

    /// Uniform integer in [lo, hi). Returns `lo` for an empty range.
    fn range_i32(&mut self, lo: i32, hi: i32) -> i32;

    #[inline]
    fn coin_flip(&mut self) -> bool {
        self.next_f32() < 0.5
    }

    /// Bernoulli trial; `p <= 0` never succeeds.
    #[inline]
    fn chance(&mut self, p: f32) -> bool {
        p > 0.0 && self.next_f32() < p
    }

    /// -1 or 1
    #[inline]
    fn sign(&mut self) -> i32 {
        if self.coin_flip() { -1 } else { 1 }
    }
}

/// Fisher-Yates shuffle driven by a `RandomSource`.
pub fn shuffle<T>(rng: &mut dyn RandomSource, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.range_i32(0, i as i32 + 1) as usize;
        items.swap(i, j);
    }
}

/// Default source: a seeded `SmallRng`.
pub struct SeededRandom {
    rng: SmallRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    #[inline]
    fn next_f32(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    #[inline]
    fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        for _ in 0..32 {
            assert_eq!(a.next_f32().to_bits(), b.next_f32().to_bits());
            assert_eq!(a.range_i32(-5, 5), b.range_i32(-5, 5));
        }
    }

    #[test]
    fn ranges_stay_in_bounds() {
        let mut rng = SeededRandom::new(99);
        for _ in 0..1000 {
            let f = rng.next_f32();
            assert!((0.0..1.0).contains(&f));
            let i = rng.range_i32(3, 6);
            assert!((3..6).contains(&i));
        }
        assert_eq!(rng.range_i32(4, 4), 4);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = SeededRandom::new(3);
        let mut items = [1, 2, 3, 4, 5, 6];
        shuffle(&mut rng, &mut items);
        let mut sorted = items;
        sorted.sort();
        assert_eq!(sorted, [1, 2, 3, 4, 5, 6]);
    }
}
