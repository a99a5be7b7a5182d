use std::f64::consts::PI;

use ndarray::{s, Array1, Array2, Axis};
use ndarray_linalg::{Norm, SVD};
use rand::Rng;
use rand_distr::{Beta, Distribution};
use statrs::function::gamma::ln_gamma;

use crate::core::{Error, Point, Result};
use crate::manifolds::{null_space_basis, polar_factor, wrap_angle, Manifold, NumberField};
use crate::measures::hausdorff::uniform_unit_vector;
use crate::special::{log_bessel_i, log_hyp0f1_matrix};

/// Parameter encodings of the von Mises–Fisher distribution
///
/// All encodings of the same distribution are numerically equivalent:
/// `MeanVector` stores c = κμ; `Loading` stores the matrix mean F whose SVD
/// and polar decompositions give the `Svd` and `Polar` forms.
#[derive(Debug, Clone)]
pub enum VmfParams {
    /// von Mises on the circle: mode angle and concentration
    ModeAngle { mu: f64, kappa: f64 },
    /// Unit mode direction and concentration κ ≥ 0
    ModeConcentration { mu: Array1<f64>, kappa: f64 },
    /// Mean vector c = κμ
    MeanVector { c: Array1<f64> },
    /// Matrix mean F (Stiefel case)
    Loading { f: Array2<f64> },
    /// SVD of F: F = U diag(D) Vᵀ
    Svd {
        u: Array2<f64>,
        d: Array1<f64>,
        v: Array2<f64>,
    },
    /// Polar decomposition of F: F = H P with H orthonormal, P symmetric
    Polar { h: Array2<f64>, p: Array2<f64> },
}

/// von Mises–Fisher (Langevin) distribution
///
/// The restriction of an ambient isotropic normal with mean F (or κμ) to the
/// manifold: density ∝ exp(⟨F, x⟩) relative to the normalized Hausdorff
/// measure. Supported on the circle, spheres (any number field, via the real
/// embedding) and real Stiefel manifolds.
#[derive(Debug, Clone)]
pub struct VonMisesFisher {
    manifold: Manifold,
    params: VmfParams,
}

impl VonMisesFisher {
    /// von Mises on the circle with mode angle `mu` and concentration `kappa`
    pub fn from_mode_angle(mu: f64, kappa: f64) -> Self {
        VonMisesFisher {
            manifold: Manifold::circle(),
            params: VmfParams::ModeAngle { mu, kappa },
        }
    }

    /// Sphere distribution from a unit mode direction and concentration
    pub fn from_mode(manifold: Manifold, mu: Array1<f64>, kappa: f64) -> Result<Self> {
        Self::check_vector_manifold(manifold, mu.len())?;
        Ok(VonMisesFisher {
            manifold,
            params: VmfParams::ModeConcentration { mu, kappa },
        })
    }

    /// Sphere distribution from the mean vector c = κμ
    pub fn from_mean_vector(manifold: Manifold, c: Array1<f64>) -> Result<Self> {
        Self::check_vector_manifold(manifold, c.len())?;
        Ok(VonMisesFisher {
            manifold,
            params: VmfParams::MeanVector { c },
        })
    }

    /// Stiefel distribution from the matrix mean F
    pub fn from_matrix(manifold: Manifold, f: Array2<f64>) -> Result<Self> {
        Self::check_matrix_manifold(manifold, f.dim())?;
        Ok(VonMisesFisher {
            manifold,
            params: VmfParams::Loading { f },
        })
    }

    /// Stiefel distribution from the SVD of F
    pub fn from_svd(
        manifold: Manifold,
        u: Array2<f64>,
        d: Array1<f64>,
        v: Array2<f64>,
    ) -> Result<Self> {
        Self::check_matrix_manifold(manifold, u.dim())?;
        let k = u.ncols();
        if d.len() != k || v.dim() != (k, k) {
            return Err(Error::DimensionMismatch {
                expected: k,
                got: d.len(),
            });
        }
        Ok(VonMisesFisher {
            manifold,
            params: VmfParams::Svd { u, d, v },
        })
    }

    /// Stiefel distribution from the polar decomposition of F
    pub fn from_polar(manifold: Manifold, h: Array2<f64>, p: Array2<f64>) -> Result<Self> {
        Self::check_matrix_manifold(manifold, h.dim())?;
        let k = h.ncols();
        if p.dim() != (k, k) {
            return Err(Error::DimensionMismatch {
                expected: k * k,
                got: p.nrows() * p.ncols(),
            });
        }
        Ok(VonMisesFisher {
            manifold,
            params: VmfParams::Polar { h, p },
        })
    }

    fn check_vector_manifold(manifold: Manifold, len: usize) -> Result<()> {
        let ok = matches!(manifold, Manifold::Sphere { .. })
            || manifold
                == Manifold::Circle {
                    field: NumberField::Complex,
                };
        if !ok {
            return Err(Error::Unsupported(format!(
                "vector-parameterized von Mises–Fisher on {:?}",
                manifold
            )));
        }
        let (n, _) = manifold.ambient_shape();
        if len != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                got: len,
            });
        }
        Ok(())
    }

    fn check_matrix_manifold(manifold: Manifold, shape: (usize, usize)) -> Result<()> {
        match manifold {
            Manifold::Stiefel {
                field: NumberField::Real,
                ..
            } => {}
            _ => {
                return Err(Error::Unsupported(format!(
                    "matrix-parameterized von Mises–Fisher on {:?}",
                    manifold
                )))
            }
        }
        if manifold.ambient_shape() != shape {
            let (n, k) = manifold.ambient_shape();
            return Err(Error::DimensionMismatch {
                expected: n * k,
                got: shape.0 * shape.1,
            });
        }
        Ok(())
    }

    pub fn manifold(&self) -> Manifold {
        self.manifold
    }

    pub fn params(&self) -> &VmfParams {
        &self.params
    }

    /// Log-density relative to the normalized Hausdorff base measure
    pub fn log_density(&self, point: &Point) -> Result<f64> {
        match &self.params {
            VmfParams::ModeAngle { mu, kappa } => {
                let theta = point.as_angle()?;
                Ok(kappa * (theta - mu).cos() - log_bessel_i(0.0, *kappa))
            }
            VmfParams::ModeConcentration { mu, kappa } => {
                let x = point.as_vector()?;
                if *kappa == 0.0 {
                    return Ok(0.0);
                }
                Ok(kappa * mu.dot(x) - log_norm_const(mu.len() as f64, *kappa))
            }
            VmfParams::MeanVector { c } => {
                let x = point.as_vector()?;
                let kappa = c.norm_l2();
                if kappa == 0.0 {
                    return Ok(0.0);
                }
                Ok(c.dot(x) - log_norm_const(c.len() as f64, kappa))
            }
            VmfParams::Loading { .. } | VmfParams::Svd { .. } | VmfParams::Polar { .. } => {
                let f = self.loading_matrix()?;
                let x = point.as_matrix()?;
                let (n, _) = self.manifold.ambient_shape();
                let quad = f.t().dot(x).diag().sum();
                let arg = f.t().dot(&f).mapv(|v| v / 4.0);
                let log_c = log_hyp0f1_matrix(n as f64 / 2.0, &arg)?;
                Ok(quad - log_c)
            }
        }
    }

    /// Modal point, closed form per encoding
    pub fn mode(&self) -> Result<Point> {
        match &self.params {
            VmfParams::ModeAngle { mu, .. } => Ok(Point::Angle(wrap_angle(*mu))),
            VmfParams::ModeConcentration { mu, .. } => Ok(Point::Vector(mu.clone())),
            VmfParams::MeanVector { c } => self.manifold.project(&Point::Vector(c.clone())),
            VmfParams::Loading { f } => Ok(Point::Matrix(polar_factor(f)?)),
            VmfParams::Svd { u, v, .. } => Ok(Point::Matrix(u.dot(&v.t()))),
            VmfParams::Polar { h, .. } => Ok(Point::Matrix(h.clone())),
        }
    }

    /// Exact draw; rejection loops terminate almost surely
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Point> {
        match &self.params {
            VmfParams::ModeAngle { mu, kappa } => {
                Ok(Point::Angle(sample_von_mises(rng, *mu, *kappa)))
            }
            VmfParams::ModeConcentration { mu, kappa } => {
                let c = mu.mapv(|v| v * kappa);
                Ok(Point::Vector(sample_vmf_vector(rng, &c)?))
            }
            VmfParams::MeanVector { c } => Ok(Point::Vector(sample_vmf_vector(rng, c)?)),
            VmfParams::Svd { u, d, v } => Ok(Point::Matrix(sample_vmf_matrix(rng, u, d, v)?)),
            VmfParams::Loading { .. } | VmfParams::Polar { .. } => {
                let (u, d, v) = svd_parts(&self.loading_matrix()?)?;
                Ok(Point::Matrix(sample_vmf_matrix(rng, &u, &d, &v)?))
            }
        }
    }

    pub fn sample_into<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut Point) -> Result<()> {
        let sampled = self.sample(rng)?;
        out.assign(&sampled)
    }

    fn loading_matrix(&self) -> Result<Array2<f64>> {
        match &self.params {
            VmfParams::Loading { f } => Ok(f.clone()),
            VmfParams::Svd { u, d, v } => Ok(u.dot(&Array2::from_diag(d)).dot(&v.t())),
            VmfParams::Polar { h, p } => Ok(h.dot(p)),
            _ => Err(Error::InvalidParameter(
                "vector parameterizations have no loading matrix".to_string(),
            )),
        }
    }
}

/// Maximum-likelihood mean direction of a set of sphere samples
pub fn mean_direction(samples: &[Array1<f64>]) -> Result<Array1<f64>> {
    let first = samples.first().ok_or_else(|| {
        Error::InvalidParameter("mean direction of an empty sample set".to_string())
    })?;
    let mut sum = Array1::<f64>::zeros(first.len());
    for x in samples {
        if x.len() != first.len() {
            return Err(Error::DimensionMismatch {
                expected: first.len(),
                got: x.len(),
            });
        }
        sum += x;
    }
    let norm = sum.norm_l2();
    if norm < 1e-12 {
        return Err(Error::ComputationFailed(
            "resultant vector is numerically zero".to_string(),
        ));
    }
    Ok(sum / norm)
}

/// log C(p, κ) = log Γ(p/2) + ν(log 2 − log κ) + log I_ν(κ), ν = p/2 − 1
///
/// The κ = 0 limit is handled by the callers (it is exactly 0) so the
/// ν·log κ term never produces ∞ − ∞ here.
fn log_norm_const(p: f64, kappa: f64) -> f64 {
    let nu = p / 2.0 - 1.0;
    ln_gamma(p / 2.0) + nu * (2.0_f64.ln() - kappa.ln()) + log_bessel_i(nu, kappa)
}

/// Best & Fisher (1979) rejection sampler for the von Mises distribution
fn sample_von_mises<R: Rng + ?Sized>(rng: &mut R, mu: f64, kappa: f64) -> f64 {
    if kappa < 1e-8 {
        // the envelope constants degenerate to 0/0 as κ → 0 and the target
        // is uniform to double precision there
        return rng.gen_range(-PI..PI);
    }
    let tau = 1.0 + (1.0 + 4.0 * kappa * kappa).sqrt();
    let rho = (tau - (2.0 * tau).sqrt()) / (2.0 * kappa);
    let r = (1.0 + rho * rho) / (2.0 * rho);
    loop {
        let z = (PI * rng.gen::<f64>()).cos();
        let f = (1.0 + r * z) / (r + z);
        let c = kappa * (r - f);
        let u: f64 = rng.gen();
        if c * (2.0 - c) - u > 0.0 || (c / u).ln() + 1.0 - c >= 0.0 {
            let theta = if rng.gen::<bool>() { f.acos() } else { -f.acos() };
            return wrap_angle(theta + mu);
        }
    }
}

/// Wood (1994) sampler for the sphere vMF distribution, c = κμ form
pub(crate) fn sample_vmf_vector<R: Rng + ?Sized>(
    rng: &mut R,
    c: &Array1<f64>,
) -> Result<Array1<f64>> {
    let p = c.len();
    let kappa = c.norm_l2();
    if kappa == 0.0 {
        return Ok(uniform_unit_vector(rng, p));
    }
    let mu = c.mapv(|v| v / kappa);
    if p == 1 {
        // 0-sphere: Bernoulli on {μ, −μ} with logit 2κ
        let prob = 1.0 / (1.0 + (-2.0 * kappa).exp());
        return Ok(if rng.gen::<f64>() < prob { mu } else { -mu });
    }

    let t = sample_cosine_component(rng, kappa, p)?;
    let tangent = uniform_unit_vector(rng, p - 1);

    // assemble t·e₁ + √(1−t²)·[0; ξ] in the frame where e₁ is the mode
    let scale = (1.0 - t * t).max(0.0).sqrt();
    let mut y = Array1::<f64>::zeros(p);
    y[0] = t;
    y.slice_mut(s![1..]).assign(&tangent.mapv(|v| v * scale));

    Ok(reflect_to_mode(&mu, &y))
}

/// Cosine of the angle to the mode: density ∝ (1−t²)^{(p−3)/2} e^{κt}
///
/// Beta-envelope rejection (Wood 1994) with an exact inverse-CDF draw for
/// p = 3. Valid for every κ > 0, p ≥ 2: the envelope constant b stays in
/// (0, 1).
fn sample_cosine_component<R: Rng + ?Sized>(rng: &mut R, kappa: f64, p: usize) -> Result<f64> {
    if p == 3 {
        // truncated-exponential marginal on S²
        let u: f64 = rng.gen();
        return Ok(1.0 + (u + (1.0 - u) * (-2.0 * kappa).exp()).ln() / kappa);
    }
    let nf = p as f64;
    let a = 2.0 * kappa / (nf - 1.0);
    let b = (a * a + 1.0).sqrt() - a;
    let x0 = (1.0 - b) / (1.0 + b);
    let c = kappa * x0 + (nf - 1.0) * (-x0 * x0).ln_1p();
    let beta = Beta::new((nf - 1.0) / 2.0, (nf - 1.0) / 2.0)
        .map_err(|e| Error::InvalidParameter(format!("beta envelope: {}", e)))?;
    loop {
        let z = beta.sample(rng);
        let u: f64 = rng.gen();
        let t = (1.0 - (1.0 + b) * z) / (1.0 - (1.0 - b) * z);
        if kappa * t + (nf - 1.0) * (-x0 * t).ln_1p() - c >= u.ln() {
            return Ok(t);
        }
    }
}

/// Householder reflection carrying e₁ to the unit vector μ
fn reflect_to_mode(mu: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let mut v = mu.mapv(|m| -m);
    v[0] += 1.0; // v = e₁ − μ
    let vnorm2 = v.dot(&v);
    if vnorm2 < 1e-24 {
        return y.clone();
    }
    let coeff = 2.0 * v.dot(y) / vnorm2;
    y - &v.mapv(|vi| vi * coeff)
}

/// Hoff (2009) sequential-conditional rejection sampler on St(n, k)
///
/// Builds the frame one column at a time in the null space of the previous
/// columns, then accepts or rejects the whole column sequence jointly by the
/// accumulated Bessel ratio. Zero singular values sample uniformly in the
/// null space and contribute exactly zero to the acceptance log-ratio.
fn sample_vmf_matrix<R: Rng + ?Sized>(
    rng: &mut R,
    u: &Array2<f64>,
    d: &Array1<f64>,
    v: &Array2<f64>,
) -> Result<Array2<f64>> {
    let (n, k) = u.dim();
    if k == 1 {
        // vector sampler composed with the 1×1 right factor
        let c = u.column(0).mapv(|ui| ui * d[0] * v[[0, 0]]);
        let x = sample_vmf_vector(rng, &c)?;
        return Ok(x.insert_axis(Axis(1)));
    }
    let h = u.dot(&Array2::from_diag(d));
    loop {
        let mut y = Array2::<f64>::zeros((n, k));
        let mut log_ratio = 0.0;
        for j in 0..k {
            let basis = if j == 0 {
                Array2::eye(n)
            } else {
                null_space_basis(&y.slice(s![.., ..j]).to_owned())?
            };
            let w = basis.t().dot(&h.column(j));
            let w_norm = w.norm_l2();
            let weighted = d[j] > 0.0 && w_norm > 0.0;
            let z = if weighted {
                sample_vmf_vector(rng, &w)?
            } else {
                uniform_unit_vector(rng, n - j)
            };
            y.column_mut(j).assign(&basis.dot(&z));
            if weighted {
                let nu = 0.5 * ((n - j) as f64 - 2.0);
                log_ratio += log_bessel_i(nu, w_norm) - log_bessel_i(nu, d[j])
                    + nu * (d[j].ln() - w_norm.ln());
            }
        }
        if rng.gen::<f64>().ln() < log_ratio {
            return Ok(y.dot(&v.t()));
        }
    }
}

/// Thin SVD (U n×k, singular values, V k×k) of an n×k matrix
fn svd_parts(f: &Array2<f64>) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>)> {
    let k = f.ncols();
    let (u, sigma, vt) = f.svd(true, true)?;
    let u = u.ok_or_else(|| Error::ComputationFailed("SVD failed to compute U".to_string()))?;
    let vt = vt.ok_or_else(|| Error::ComputationFailed("SVD failed to compute Vᵀ".to_string()))?;
    Ok((
        u.slice(s![.., 0..k]).to_owned(),
        sigma,
        vt.t().to_owned(),
    ))
}
