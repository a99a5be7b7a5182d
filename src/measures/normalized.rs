use rand::Rng;

use crate::core::{Point, Result};
use crate::manifolds::Manifold;
use crate::measures::Measure;

/// Probability normalization of a base measure ν: the measure ν / mass(ν)
///
/// Normalization rescales, it never reshapes: densities shift by the base
/// log-mass and sampling is the base sampler unchanged.
#[derive(Debug, Clone)]
pub struct Normalized {
    base: Box<Measure>,
}

impl Normalized {
    pub(crate) fn wrap(base: Measure) -> Self {
        Normalized {
            base: Box::new(base),
        }
    }

    pub fn base(&self) -> &Measure {
        &self.base
    }

    pub fn manifold(&self) -> Manifold {
        self.base.manifold()
    }

    /// log dν̄/dν_base(x) · (base density), i.e. base log-density minus the
    /// base log-mass
    pub fn log_density(&self, point: &Point) -> Result<f64> {
        Ok(self.base.log_density(point)? - self.base.log_mass()?)
    }

    /// Zero by construction
    pub fn log_mass(&self) -> f64 {
        0.0
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Point> {
        self.base.sample(rng)
    }

    pub fn sample_into<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut Point) -> Result<()> {
        self.base.sample_into(rng, out)
    }
}

/// Wrap a measure into its probability-normalized counterpart
///
/// Idempotent: normalizing an already-normalized measure returns it
/// unchanged, so `normalize_measure(normalize_measure(ν)) = normalize_measure(ν)`.
pub fn normalize_measure(measure: Measure) -> Measure {
    match measure {
        Measure::Normalized(_) => measure,
        other => Measure::Normalized(Normalized::wrap(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measures::Hausdorff;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    #[test]
    fn test_normalized_mass_is_one() {
        let base = Measure::Hausdorff(Hausdorff::new(Manifold::sphere(2)));
        let normalized = normalize_measure(base);
        assert_relative_eq!(normalized.log_mass().unwrap(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_normalizing_twice_is_a_no_op() {
        let base = Measure::Hausdorff(Hausdorff::new(Manifold::sphere(2)));
        let once = normalize_measure(base);
        let twice = normalize_measure(once.clone());
        let p = Point::Vector(arr1(&[0.0, 0.0, 1.0]));
        assert_relative_eq!(
            once.log_density(&p).unwrap(),
            twice.log_density(&p).unwrap(),
            epsilon = 1e-14
        );
        // still a single wrapper around the primitive
        match twice {
            Measure::Normalized(inner) => {
                assert!(matches!(inner.base(), Measure::Hausdorff(_)))
            }
            _ => panic!("expected a normalized measure"),
        }
    }

    #[test]
    fn test_density_shifts_by_base_mass() {
        let manifold = Manifold::sphere(2);
        let base = Measure::Hausdorff(Hausdorff::new(manifold));
        let log_mass = base.log_mass().unwrap();
        let normalized = normalize_measure(base);
        let p = Point::Vector(arr1(&[1.0, 0.0, 0.0]));
        // uniform density = 1 / (4π)
        assert_relative_eq!(
            normalized.log_density(&p).unwrap(),
            -log_mass,
            epsilon = 1e-14
        );
    }
}
