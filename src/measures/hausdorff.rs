use std::f64::consts::PI;

use ndarray::{s, Array1, Array2};
use ndarray_linalg::{Determinant, Norm, QR};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;
use statrs::function::gamma::ln_gamma;

use crate::core::{Error, Point, PointShape, Result};
use crate::manifolds::{Manifold, NumberField};
use crate::special::log_multivariate_gamma;

/// Hausdorff (volume) measure on a manifold's default embedding
///
/// This is the reference measure every parameterized distribution in the
/// crate is defined against: its log-density is identically zero and its
/// total mass is the closed-form volume of the manifold (Chikuse 2003).
#[derive(Debug, Clone)]
pub struct Hausdorff {
    manifold: Manifold,
}

impl Hausdorff {
    pub fn new(manifold: Manifold) -> Self {
        Hausdorff { manifold }
    }

    pub fn manifold(&self) -> Manifold {
        self.manifold
    }

    /// Identically zero: the Hausdorff measure is the base measure
    pub fn log_density(&self, _point: &Point) -> f64 {
        0.0
    }

    /// Log of the total volume of the manifold
    pub fn log_mass(&self) -> f64 {
        match self.manifold {
            Manifold::Sphere { dim, field } => sphere_log_mass(dim, field),
            Manifold::ProjectiveSpace { dim, field } => {
                // quotient of the sphere by the unit scalars of the field
                sphere_log_mass(dim, field) - sphere_log_mass(0, field)
            }
            Manifold::Stiefel { n, k, field } => stiefel_log_mass(n, k, field),
            Manifold::Grassmann { n, k, field } => {
                stiefel_log_mass(n, k, field) - stiefel_log_mass(k, k, field)
            }
            // O(n) is two disjoint copies of SO(n)
            Manifold::Rotations { n } => {
                stiefel_log_mass(n, n, NumberField::Real) - 2.0_f64.ln()
            }
            Manifold::Circle { .. } => (2.0 * PI).ln(),
        }
    }

    /// Exact uniform draw
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Point> {
        match self.manifold {
            Manifold::Sphere { .. } | Manifold::ProjectiveSpace { .. } => {
                // normalized Gaussian in the (real) embedding; projective
                // points are sphere representatives of their class
                let PointShape::Vector(len) = self.manifold.point_shape() else {
                    unreachable!("spheres have vector points");
                };
                Ok(Point::Vector(uniform_unit_vector(rng, len)))
            }
            Manifold::Stiefel { n, k, field } | Manifold::Grassmann { n, k, field } => {
                if field != NumberField::Real {
                    return Err(Error::Unsupported(
                        "sampling on complex/quaternionic matrix manifolds".to_string(),
                    ));
                }
                Ok(Point::Matrix(stiefel_uniform(rng, n, k)?))
            }
            Manifold::Rotations { n } => {
                let mut q = stiefel_uniform(rng, n, n)?;
                if q.det()? < 0.0 {
                    // flip the sign by swapping two columns
                    if n >= 2 {
                        for i in 0..n {
                            q.swap([i, 0], [i, 1]);
                        }
                    } else {
                        q[[0, 0]] = -q[[0, 0]];
                    }
                }
                Ok(Point::Matrix(q))
            }
            Manifold::Circle {
                field: NumberField::Real,
            } => Ok(Point::Angle(rng.gen_range(-PI..PI))),
            Manifold::Circle { .. } => Ok(Point::Vector(uniform_unit_vector(rng, 2))),
        }
    }

    /// Uniform draw written into a caller-provided point of matching shape
    pub fn sample_into<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut Point) -> Result<()> {
        let sampled = self.sample(rng)?;
        out.assign(&sampled)
    }
}

/// log vol(S^dim over 𝔽) = log 2 + ν log π − log Γ(ν), ν = d(𝔽)(dim+1)/2
fn sphere_log_mass(dim: usize, field: NumberField) -> f64 {
    let nu = field.real_dim() as f64 * (dim as f64 + 1.0) / 2.0;
    2.0_f64.ln() + nu * PI.ln() - ln_gamma(nu)
}

/// log vol(St(n, k) over 𝔽)
///
/// The real case has the multivariate-gamma closed form; the other fields
/// use the telescoping product vol(St(n,k)) = Π_j vol(S^{n−1−j}), the same
/// identity the real form must satisfy.
fn stiefel_log_mass(n: usize, k: usize, field: NumberField) -> f64 {
    match field {
        NumberField::Real => {
            let (nf, kf) = (n as f64, k as f64);
            kf * 2.0_f64.ln() + kf * nf / 2.0 * PI.ln() - log_multivariate_gamma(k, nf / 2.0)
        }
        _ => (0..k).map(|j| sphere_log_mass(n - 1 - j, field)).sum(),
    }
}

/// Haar-distributed orthonormal n×k frame: Gaussian matrix, unique QR
///
/// Flipping the Q columns where diag(R) < 0 selects the factorization with
/// non-negative R diagonal, which makes Q exactly Haar distributed.
pub(crate) fn stiefel_uniform<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    k: usize,
) -> Result<Array2<f64>> {
    let gaussian: Array2<f64> = Array2::random_using((n, k), StandardNormal, rng);
    let (q, r) = gaussian.qr()?;
    let mut q = q.slice(s![.., 0..k]).to_owned();
    for i in 0..k {
        if r[[i, i]] < 0.0 {
            for row in 0..n {
                q[[row, i]] = -q[[row, i]];
            }
        }
    }
    Ok(q)
}

/// Uniform point on the unit sphere of ℝ^len
pub(crate) fn uniform_unit_vector<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Array1<f64> {
    loop {
        let x: Array1<f64> = Array1::random_using(len, StandardNormal, rng);
        let norm = x.norm_l2();
        if norm > 1e-12 {
            return x / norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mass(m: Manifold) -> f64 {
        Hausdorff::new(m).log_mass().exp()
    }

    #[test]
    fn test_low_dimensional_sphere_volumes() {
        assert_relative_eq!(mass(Manifold::sphere(0)), 2.0, epsilon = 1e-12);
        assert_relative_eq!(mass(Manifold::sphere(1)), 2.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(mass(Manifold::sphere(2)), 4.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(mass(Manifold::sphere(3)), 2.0 * PI * PI, epsilon = 1e-12);
        assert_relative_eq!(mass(Manifold::circle()), 2.0 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_group_volumes() {
        assert_relative_eq!(mass(Manifold::rotations(2)), 2.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(
            mass(Manifold::rotations(3)),
            8.0 * PI * PI,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_complex_sphere_volume() {
        // S^0 over ℂ is the unit circle in ℂ
        assert_relative_eq!(
            mass(Manifold::sphere_over(0, NumberField::Complex)),
            2.0 * PI,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_stiefel_telescoping_identity() {
        // vol St(n,k) = vol S^{n−1} · vol St(n−1, k−1)
        for n in 2..7 {
            for k in 1..=n {
                let lhs = stiefel_log_mass(n, k, NumberField::Real);
                let mut rhs = sphere_log_mass(n - 1, NumberField::Real);
                if k > 1 {
                    rhs += stiefel_log_mass(n - 1, k - 1, NumberField::Real);
                }
                assert_relative_eq!(lhs, rhs, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_real_closed_form_matches_sphere_product() {
        // the multivariate-gamma form must agree with the telescoping sum
        for n in 1..8 {
            for k in 1..=n {
                let closed = stiefel_log_mass(n, k, NumberField::Real);
                let product: f64 = (0..k)
                    .map(|j| sphere_log_mass(n - 1 - j, NumberField::Real))
                    .sum();
                assert_relative_eq!(closed, product, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_grassmann_quotient_identity() {
        for field in [NumberField::Real, NumberField::Complex, NumberField::Quaternion] {
            let gr = mass(Manifold::grassmann_over(5, 2, field).unwrap());
            let quotient = stiefel_log_mass(5, 2, field) - stiefel_log_mass(2, 2, field);
            assert_relative_eq!(gr.ln(), quotient, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_projective_space_volumes() {
        // RP^n = S^n / S^0
        let rp2 = mass(Manifold::projective_space(2));
        assert_relative_eq!(rp2, 2.0 * PI, epsilon = 1e-12);
        // CP^1 ≅ S^2(1/2) has volume vol(S^3)/vol(S^1) = π
        let cp1 = mass(Manifold::projective_space_over(1, NumberField::Complex));
        assert_relative_eq!(cp1, PI, epsilon = 1e-12);
    }

    #[test]
    fn test_log_density_is_zero() {
        let h = Hausdorff::new(Manifold::sphere(2));
        let p = Point::Vector(ndarray::arr1(&[1.0, 0.0, 0.0]));
        assert_eq!(h.log_density(&p), 0.0);
    }
}
