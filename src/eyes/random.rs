//! Random source used for blink/idle interval variation and idle gaze.

use rand::Rng;
use rand::rngs::StdRng;

/// Source of uniformly distributed integers.
///
/// Kept as a trait so tests can drive the animator with fixed sequences.
pub trait RandomSource {
    /// Uniform integer in `low..=high`; returns `low` when `high < low`
    fn range_inclusive(&mut self, low: i32, high: i32) -> i32;

    /// True with probability `p`
    fn chance(&mut self, p: f64) -> bool;
}

impl RandomSource for StdRng {
    fn range_inclusive(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.random_range(low..=high)
    }

    fn chance(&mut self, p: f64) -> bool {
        p > 0.0 && self.random_bool(p.min(1.0))
    }
}

/// Replays a fixed list of values, clamped into the requested range
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    values: std::collections::VecDeque<i32>,
    pub draws: usize,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = i32>) -> Self {
        Self {
            values: values.into_iter().collect(),
            draws: 0,
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn range_inclusive(&mut self, low: i32, high: i32) -> i32 {
        self.draws += 1;
        let value = self.values.pop_front().unwrap_or(low);
        value.clamp(low, high.max(low))
    }

    fn chance(&mut self, p: f64) -> bool {
        self.draws += 1;
        p >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_std_rng_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let v = rng.range_inclusive(0, 4);
            assert!((0..=4).contains(&v));
        }
        assert_eq!(rng.range_inclusive(3, 3), 3);
        assert_eq!(rng.range_inclusive(5, 2), 5);
    }

    #[test]
    fn test_chance_edges() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!rng.chance(0.0));
        assert!(rng.chance(1.0));
    }

    #[test]
    fn test_scripted_clamps() {
        let mut rng = ScriptedRandom::new([10, -3, 2]);
        assert_eq!(rng.range_inclusive(0, 5), 5);
        assert_eq!(rng.range_inclusive(0, 5), 0);
        assert_eq!(rng.range_inclusive(0, 5), 2);
        assert_eq!(rng.range_inclusive(1, 5), 1);
        assert_eq!(rng.draws, 4);
    }
}
