//! Scalar noise over two spatial dimensions and time.
//!
//! A `NoiseField` is the potential field behind each wind component: the
//! generator differentiates it and takes the curl, so the noise must have
//! continuous first derivatives. OpenSimplex satisfies that everywhere.

use noise::{NoiseFn, OpenSimplex};

use crate::random::RandomSource;

/// Smooth 3-input (x, y, t) scalar noise in roughly `[-1, 1]`.
///
/// Each instance is seeded from the supplied [`RandomSource`] and carries
/// random coordinate offsets so that integer query coordinates do not line
/// up with the generator's lattice zeros.
#[derive(Clone)]
pub struct NoiseField {
    noise: OpenSimplex,
    offset_x: f64,
    offset_y: f64,
    offset_t: f64,
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField")
            .field("offset_x", &self.offset_x)
            .field("offset_y", &self.offset_y)
            .field("offset_t", &self.offset_t)
            .finish()
    }
}

impl NoiseField {
    /// Build a field with a seed and offsets drawn from `rng`.
    pub fn new(rng: &mut RandomSource) -> Self {
        let seed = rng.next_u32();
        NoiseField {
            noise: OpenSimplex::new(seed),
            offset_x: rng.uniform(0.0, 1000.0),
            offset_y: rng.uniform(0.0, 1000.0),
            offset_t: rng.uniform(0.0, 1000.0),
        }
    }

    /// Sample the potential at (x, y) and time t.
    pub fn sample(&self, x: f64, y: f64, t: f64) -> f64 {
        self.noise.get([
            x + self.offset_x,
            y + self.offset_y,
            t + self.offset_t,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_for_same_seed() {
        let mut rng_a = RandomSource::seed_from(99);
        let mut rng_b = RandomSource::seed_from(99);
        let field_a = NoiseField::new(&mut rng_a);
        let field_b = NoiseField::new(&mut rng_b);
        for i in 0..50 {
            let x = i as f64 * 0.37;
            assert_eq!(field_a.sample(x, -x, 0.5), field_b.sample(x, -x, 0.5));
        }
    }

    #[test]
    fn test_distinct_instances_differ() {
        let mut rng = RandomSource::seed_from(5);
        let field_a = NoiseField::new(&mut rng);
        let field_b = NoiseField::new(&mut rng);
        let mut identical = true;
        for i in 0..20 {
            let x = i as f64 * 1.3;
            if field_a.sample(x, 0.0, 0.0) != field_b.sample(x, 0.0, 0.0) {
                identical = false;
                break;
            }
        }
        assert!(!identical);
    }

    #[test]
    fn test_output_is_bounded() {
        let mut rng = RandomSource::seed_from(13);
        let field = NoiseField::new(&mut rng);
        for i in 0..500 {
            let x = (i % 37) as f64 * 0.91;
            let y = (i % 23) as f64 * -0.47;
            let t = i as f64 * 0.013;
            let v = field.sample(x, y, t);
            assert!(v.is_finite());
            assert!(v.abs() <= 1.5, "noise out of expected range: {}", v);
        }
    }

    #[test]
    fn test_continuity_at_small_steps() {
        let mut rng = RandomSource::seed_from(21);
        let field = NoiseField::new(&mut rng);
        let eps = 1e-5;
        let base = field.sample(3.2, -1.7, 0.8);
        let stepped = field.sample(3.2 + eps, -1.7, 0.8);
        assert!((base - stepped).abs() < 1e-3);
    }
}
