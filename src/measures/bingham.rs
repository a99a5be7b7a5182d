use ndarray::Array2;
use rand::Rng;

use crate::core::{Error, Point, Result};
use crate::manifolds::{Manifold, NumberField};
use crate::special::log_hyp1f1_matrix;

/// Bingham distribution: density ∝ exp(xᵀBx) for symmetric B
///
/// B is not identifiable: adding c·I to B multiplies both the unnormalized
/// density and the normalizing constant ₁F₁(k/2; n/2; B) by e^c, leaving the
/// distribution unchanged. That freedom is intrinsic to the model.
///
/// The normalizing constant needs the hypergeometric function of a matrix
/// argument, which is only available for 1×1 arguments; wider ambient
/// dimensions fail with `Error::NotImplemented`. No sampler exists in this
/// design — the distribution is exposed as a log-density only.
#[derive(Debug, Clone)]
pub struct Bingham {
    manifold: Manifold,
    b: Array2<f64>,
}

impl Bingham {
    pub fn new(manifold: Manifold, b: Array2<f64>) -> Result<Self> {
        match manifold {
            Manifold::Sphere { .. }
            | Manifold::ProjectiveSpace { .. }
            | Manifold::Stiefel { .. }
            | Manifold::Grassmann { .. }
            | Manifold::Rotations { .. } => {}
            Manifold::Circle { .. } => {
                return Err(Error::Unsupported(
                    "Bingham distribution on the circle".to_string(),
                ))
            }
        }
        if manifold.field() != NumberField::Real {
            return Err(Error::Unsupported(
                "Bingham distribution over non-real fields".to_string(),
            ));
        }
        let (n, _) = manifold.ambient_shape();
        if b.dim() != (n, n) {
            return Err(Error::DimensionMismatch {
                expected: n * n,
                got: b.nrows() * b.ncols(),
            });
        }
        Ok(Bingham { manifold, b })
    }

    pub fn manifold(&self) -> Manifold {
        self.manifold
    }

    pub fn parameter(&self) -> &Array2<f64> {
        &self.b
    }

    /// xᵀBx − log ₁F₁(k/2; n/2; B) relative to the normalized Hausdorff base
    pub fn log_density(&self, point: &Point) -> Result<f64> {
        let (n, k) = self.manifold.ambient_shape();
        let quad = match point {
            Point::Vector(x) => x.dot(&self.b.dot(x)),
            Point::Matrix(x) => x.t().dot(&self.b.dot(x)).diag().sum(),
            Point::Angle(_) => {
                return Err(Error::InvalidParameter(
                    "expected a vector or matrix point".to_string(),
                ))
            }
        };
        let log_c = log_hyp1f1_matrix(k as f64 / 2.0, n as f64 / 2.0, &self.b)?;
        Ok(quad - log_c)
    }

    /// No sampling algorithm exists for the general Bingham distribution in
    /// this design; the gap is surfaced, not papered over.
    pub fn sample<R: Rng + ?Sized>(&self, _rng: &mut R) -> Result<Point> {
        Err(Error::Unsupported(
            "no sampler is implemented for the Bingham distribution".to_string(),
        ))
    }
}
