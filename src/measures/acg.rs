use ndarray::{Array1, Array2, Axis};
use ndarray_linalg::{Determinant, Diag, Norm, SolveTriangular, UPLO};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::core::{Error, Point, PointShape, Result};
use crate::manifolds::{Manifold, NumberField};

/// Parameterizations of the same underlying distribution
///
/// `Precision` stores P = Σ⁻¹ (Hermitian positive definite, unchecked);
/// `CholeskyFactor` stores the lower factor L with Σ = L Lᵀ. Both must give
/// the same log-density; only the Cholesky form can sample.
#[derive(Debug, Clone)]
pub enum AcgParams {
    Precision(Array2<f64>),
    CholeskyFactor(Array2<f64>),
}

/// Angular Central Gaussian distribution
///
/// The pushforward of a centered Gaussian N(0, Σ) onto the manifold,
/// with density ∝ det(Σ)^{−k/2} · det(XᵀΣ⁻¹X)^{−n/2} relative to the
/// normalized Hausdorff measure. Construction never checks positive
/// definiteness; a bad Σ shows up as NaN densities downstream.
#[derive(Debug, Clone)]
pub struct AngularCentralGaussian {
    manifold: Manifold,
    params: AcgParams,
}

impl AngularCentralGaussian {
    /// Parameterize by the precision matrix P = Σ⁻¹
    pub fn from_precision(manifold: Manifold, precision: Array2<f64>) -> Result<Self> {
        Self::check_parameter(manifold, &precision)?;
        Ok(AngularCentralGaussian {
            manifold,
            params: AcgParams::Precision(precision),
        })
    }

    /// Parameterize by the lower Cholesky factor L of Σ
    pub fn from_cholesky(manifold: Manifold, factor: Array2<f64>) -> Result<Self> {
        Self::check_parameter(manifold, &factor)?;
        Ok(AngularCentralGaussian {
            manifold,
            params: AcgParams::CholeskyFactor(factor),
        })
    }

    fn check_parameter(manifold: Manifold, m: &Array2<f64>) -> Result<()> {
        match manifold {
            Manifold::Sphere { .. }
            | Manifold::ProjectiveSpace { .. }
            | Manifold::Stiefel { .. }
            | Manifold::Grassmann { .. }
            | Manifold::Rotations { .. } => {}
            Manifold::Circle { .. } => {
                return Err(Error::Unsupported(
                    "angular central Gaussian on the circle".to_string(),
                ))
            }
        }
        if manifold.field() != NumberField::Real {
            return Err(Error::Unsupported(
                "angular central Gaussian over non-real fields".to_string(),
            ));
        }
        let (n, _) = manifold.ambient_shape();
        if m.dim() != (n, n) {
            return Err(Error::DimensionMismatch {
                expected: n * n,
                got: m.nrows() * m.ncols(),
            });
        }
        Ok(())
    }

    pub fn manifold(&self) -> Manifold {
        self.manifold
    }

    pub fn params(&self) -> &AcgParams {
        &self.params
    }

    /// Log-density relative to the normalized Hausdorff base measure
    pub fn log_density(&self, point: &Point) -> Result<f64> {
        let (n, k) = self.manifold.ambient_shape();
        let (nf, kf) = (n as f64, k as f64);
        let d = self.manifold.field().real_dim() as f64;
        match &self.params {
            AcgParams::Precision(p) => {
                let (_, logdet_p) = p.sln_det()?;
                let log_quad = self.log_quad_form(point, |x| p.dot(x))?;
                Ok(d / 2.0 * (kf * logdet_p - nf * log_quad))
            }
            AcgParams::CholeskyFactor(l) => {
                // triangular solve instead of forming Σ⁻¹
                let log_quad = match point {
                    Point::Vector(x) => {
                        let b = x.view().insert_axis(Axis(1)).to_owned();
                        let z = l.solve_triangular(UPLO::Lower, Diag::NonUnit, &b)?;
                        let norm = z.norm_l2();
                        2.0 * norm.ln()
                    }
                    Point::Matrix(x) => {
                        let z = l.solve_triangular(UPLO::Lower, Diag::NonUnit, x)?;
                        let gram = z.t().dot(&z);
                        let (_, logdet) = gram.sln_det()?;
                        logdet
                    }
                    Point::Angle(_) => {
                        return Err(Error::InvalidParameter(
                            "expected a vector or matrix point".to_string(),
                        ))
                    }
                };
                let logdet_l: f64 = (0..n).map(|i| l[[i, i]].ln()).sum();
                Ok(-d * kf * logdet_l - d * nf / 2.0 * log_quad)
            }
        }
    }

    /// log xᵀPx for vectors (no 1×1 determinant), log det(XᵀPX) for matrices
    fn log_quad_form(
        &self,
        point: &Point,
        apply: impl Fn(&Array2<f64>) -> Array2<f64>,
    ) -> Result<f64> {
        match point {
            Point::Vector(x) => {
                let b = x.view().insert_axis(Axis(1)).to_owned();
                let px = apply(&b);
                let quad = x.dot(&px.index_axis(Axis(1), 0));
                Ok(quad.ln())
            }
            Point::Matrix(x) => {
                let gram = x.t().dot(&apply(x));
                let (_, logdet) = gram.sln_det()?;
                Ok(logdet)
            }
            Point::Angle(_) => Err(Error::InvalidParameter(
                "expected a vector or matrix point".to_string(),
            )),
        }
    }

    /// Draw a sample: Gaussian ambient point, colored by L, projected back
    ///
    /// Only the Cholesky parameterization can sample; deriving a sampler
    /// from the precision form is an open question left unresolved.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Point> {
        let AcgParams::CholeskyFactor(l) = &self.params else {
            return Err(Error::Unsupported(
                "sampling an angular central Gaussian requires the Cholesky parameterization"
                    .to_string(),
            ));
        };
        match self.manifold.point_shape() {
            PointShape::Vector(len) => {
                let gaussian: Array1<f64> = Array1::random_using(len, StandardNormal, rng);
                self.manifold.project(&Point::Vector(l.dot(&gaussian)))
            }
            PointShape::Matrix(n, k) => {
                let gaussian: Array2<f64> = Array2::random_using((n, k), StandardNormal, rng);
                self.manifold.project(&Point::Matrix(l.dot(&gaussian)))
            }
            PointShape::Angle => unreachable!("circle manifolds are rejected at construction"),
        }
    }

    pub fn sample_into<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut Point) -> Result<()> {
        let sampled = self.sample(rng)?;
        out.assign(&sampled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};
    use ndarray_linalg::Inverse;

    fn lower_factor() -> Array2<f64> {
        arr2(&[[2.0, 0.0, 0.0], [0.5, 1.5, 0.0], [-0.3, 0.2, 1.0]])
    }

    #[test]
    fn test_structural_checks() {
        let sphere = Manifold::sphere(2);
        assert!(AngularCentralGaussian::from_precision(sphere, Array2::eye(3)).is_ok());
        assert!(AngularCentralGaussian::from_precision(sphere, Array2::eye(2)).is_err());
        assert!(
            AngularCentralGaussian::from_precision(Manifold::circle(), Array2::eye(1)).is_err()
        );
        assert!(AngularCentralGaussian::from_precision(
            Manifold::sphere_over(2, NumberField::Complex),
            Array2::eye(6)
        )
        .is_err());
    }

    #[test]
    fn test_identity_precision_is_uniform() {
        let acg =
            AngularCentralGaussian::from_precision(Manifold::sphere(2), Array2::eye(3)).unwrap();
        let p = Point::Vector(arr1(&[0.6, 0.8, 0.0]));
        assert_relative_eq!(acg.log_density(&p).unwrap(), 0.0, epsilon = 1e-12);

        let st = Manifold::stiefel(3, 2).unwrap();
        let acg = AngularCentralGaussian::from_precision(st, Array2::eye(3)).unwrap();
        let x = Point::Matrix(arr2(&[[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]));
        assert_relative_eq!(acg.log_density(&x).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_precision_and_cholesky_forms_agree_on_vectors() {
        let manifold = Manifold::sphere(2);
        let l = lower_factor();
        let sigma = l.dot(&l.t());
        let precision = sigma.inv().unwrap();

        let from_p = AngularCentralGaussian::from_precision(manifold, precision).unwrap();
        let from_l = AngularCentralGaussian::from_cholesky(manifold, l).unwrap();

        for raw in [
            arr1(&[1.0, 0.0, 0.0]),
            arr1(&[0.6, -0.8, 0.0]),
            arr1(&[0.5, 0.5, 0.7071067811865476]),
        ] {
            let p = Point::Vector(raw);
            assert_relative_eq!(
                from_p.log_density(&p).unwrap(),
                from_l.log_density(&p).unwrap(),
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn test_precision_and_cholesky_forms_agree_on_frames() {
        let manifold = Manifold::stiefel(3, 2).unwrap();
        let l = lower_factor();
        let sigma = l.dot(&l.t());
        let precision = sigma.inv().unwrap();

        let from_p = AngularCentralGaussian::from_precision(manifold, precision).unwrap();
        let from_l = AngularCentralGaussian::from_cholesky(manifold, l).unwrap();

        let x = Point::Matrix(arr2(&[[1.0, 0.0], [0.0, 0.6], [0.0, 0.8]]));
        assert_relative_eq!(
            from_p.log_density(&x).unwrap(),
            from_l.log_density(&x).unwrap(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_precision_form_cannot_sample() {
        let acg =
            AngularCentralGaussian::from_precision(Manifold::sphere(2), Array2::eye(3)).unwrap();
        let mut rng = rand::thread_rng();
        assert!(matches!(acg.sample(&mut rng), Err(Error::Unsupported(_))));
    }
}
