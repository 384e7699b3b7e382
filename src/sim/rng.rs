//! Seeded randomness and weighted selection
//!
//! Every random decision the simulation makes goes through `SimRng`, so a
//! session is fully replayable from its seed plus the sequence of inputs.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Pick an item from an ordered `(item, weight)` table using a roll in `[0, 1)`.
///
/// Weights accumulate in table order and the first entry whose cumulative
/// weight is strictly greater than `roll` wins. A roll at or past the total
/// weight falls through to the last entry. Empty tables do not compile.
pub fn weighted_choice<T: Copy, const N: usize>(table: &[(T, f32); N], roll: f32) -> T {
    const { assert!(N > 0, "weighted table must not be empty") };
    let (mut picked, _) = table[0];
    let mut cumulative = 0.0;
    for &(item, weight) in table {
        picked = item;
        cumulative += weight;
        if roll < cumulative {
            break;
        }
    }
    picked
}

/// Simulation RNG (PCG32, seeded)
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    inner: Pcg32,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seed the RNG was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform in `[0, 1)`
    pub fn unit(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Uniform in `[min, min + span)`
    pub fn span(&mut self, min: f32, span: f32) -> f32 {
        min + self.unit() * span
    }

    /// Uniform in `[-half, half)`
    pub fn centered(&mut self, half: f32) -> f32 {
        (self.unit() - 0.5) * 2.0 * half
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Weighted pick from an ordered table
    pub fn choose<T: Copy, const N: usize>(&mut self, table: &[(T, f32); N]) -> T {
        let roll = self.unit();
        weighted_choice(table, roll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Fruit {
        Apple,
        Pear,
        Plum,
    }

    const TABLE: [(Fruit, f32); 3] = [(Fruit::Apple, 0.10), (Fruit::Pear, 0.15), (Fruit::Plum, 0.75)];

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(weighted_choice(&TABLE, 0.0), Fruit::Apple);
        assert_eq!(weighted_choice(&TABLE, 0.099), Fruit::Apple);
        // Exactly on a boundary belongs to the next entry
        assert_eq!(weighted_choice(&TABLE, 0.10), Fruit::Pear);
        assert_eq!(weighted_choice(&TABLE, 0.2499), Fruit::Pear);
        assert_eq!(weighted_choice(&TABLE, 0.25), Fruit::Plum);
        assert_eq!(weighted_choice(&TABLE, 0.999), Fruit::Plum);
    }

    #[test]
    fn test_roll_past_total_falls_through() {
        let short = [(Fruit::Apple, 0.2), (Fruit::Pear, 0.2)];
        assert_eq!(weighted_choice(&short, 0.9), Fruit::Pear);
        assert_eq!(weighted_choice(&[(Fruit::Plum, 0.5)], 1.0), Fruit::Plum);
        assert_eq!(weighted_choice(&[(Fruit::Plum, 0.0)], 0.0), Fruit::Plum);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SimRng::new(7);
        let mut b = SimRng::new(7);
        for _ in 0..100 {
            assert_eq!(a.unit().to_bits(), b.unit().to_bits());
        }
        assert_eq!(a.seed(), 7);
    }

    #[test]
    fn test_span_and_centered_ranges() {
        let mut rng = SimRng::new(42);
        for _ in 0..1000 {
            let v = rng.span(4.0, 3.0);
            assert!((4.0..7.0).contains(&v));
            let c = rng.centered(2.0);
            assert!((-2.0..2.0).contains(&c));
        }
    }
}
