pub mod acg;
pub mod bingham;
pub mod haar;
pub mod hausdorff;
pub mod normalized;
pub mod vmf;

pub use acg::{AcgParams, AngularCentralGaussian};
pub use bingham::Bingham;
pub use haar::{Haar, Side};
pub use hausdorff::Hausdorff;
pub use normalized::{normalize_measure, Normalized};
pub use vmf::{mean_direction, VmfParams, VonMisesFisher};

use rand::Rng;

use crate::core::{Error, Point, Result};
use crate::manifolds::Manifold;

/// A measure on a manifold: one closed set of variants, dispatched with
/// exhaustive matches
///
/// Primitive measures (`Hausdorff`, `Haar`) expose a log-mass;
/// `Normalized` rescales any base measure to probability; the parameterized
/// distributions are defined by densities against the normalized Hausdorff
/// base.
#[derive(Debug, Clone)]
pub enum Measure {
    Hausdorff(Hausdorff),
    Haar(Haar),
    Normalized(Normalized),
    AngularCentralGaussian(AngularCentralGaussian),
    Bingham(Bingham),
    VonMisesFisher(VonMisesFisher),
}

impl Measure {
    pub fn hausdorff(manifold: Manifold) -> Self {
        Measure::Hausdorff(Hausdorff::new(manifold))
    }

    /// The uniform probability measure: normalized Hausdorff
    pub fn uniform(manifold: Manifold) -> Self {
        normalize_measure(Measure::hausdorff(manifold))
    }

    pub fn manifold(&self) -> Manifold {
        match self {
            Measure::Hausdorff(m) => m.manifold(),
            Measure::Haar(m) => m.group(),
            Measure::Normalized(m) => m.manifold(),
            Measure::AngularCentralGaussian(m) => m.manifold(),
            Measure::Bingham(m) => m.manifold(),
            Measure::VonMisesFisher(m) => m.manifold(),
        }
    }

    /// Log-density at a point assumed to lie on the manifold
    ///
    /// Evaluating off the manifold is undefined by contract; no membership
    /// check is performed.
    pub fn log_density(&self, point: &Point) -> Result<f64> {
        match self {
            Measure::Hausdorff(m) => Ok(m.log_density(point)),
            Measure::Haar(m) => Ok(m.log_density(point)),
            Measure::Normalized(m) => m.log_density(point),
            Measure::AngularCentralGaussian(m) => m.log_density(point),
            Measure::Bingham(m) => m.log_density(point),
            Measure::VonMisesFisher(m) => m.log_density(point),
        }
    }

    /// Log of the total mass; defined for primitive and normalized measures
    pub fn log_mass(&self) -> Result<f64> {
        match self {
            Measure::Hausdorff(m) => Ok(m.log_mass()),
            Measure::Haar(m) => Ok(m.log_mass()),
            Measure::Normalized(m) => Ok(m.log_mass()),
            Measure::AngularCentralGaussian(_)
            | Measure::Bingham(_)
            | Measure::VonMisesFisher(_) => Err(Error::Unsupported(
                "log-mass is defined for primitive measures only".to_string(),
            )),
        }
    }

    /// Exact draw from the measure (normalized where applicable)
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Point> {
        match self {
            Measure::Hausdorff(m) => m.sample(rng),
            Measure::Haar(m) => m.sample(rng),
            Measure::Normalized(m) => m.sample(rng),
            Measure::AngularCentralGaussian(m) => m.sample(rng),
            Measure::Bingham(m) => m.sample(rng),
            Measure::VonMisesFisher(m) => m.sample(rng),
        }
    }

    /// Draw into a caller-provided point of matching shape
    pub fn sample_into<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut Point) -> Result<()> {
        let sampled = self.sample(rng)?;
        out.assign(&sampled)
    }

    /// Modal point; only the von Mises–Fisher family defines one
    pub fn mode(&self) -> Result<Point> {
        match self {
            Measure::VonMisesFisher(m) => m.mode(),
            _ => Err(Error::Unsupported(
                "mode is only defined for the von Mises–Fisher family".to_string(),
            )),
        }
    }
}
