use ndarray::Array2;
use ndarray_linalg::Norm;
use statrs::function::gamma::ln_gamma;

use crate::core::{Error, Result};
use crate::special::{log_bessel_i, LogSum};

/// Log of the confluent limit function ₀F₁(; b; z) for scalar z ≥ 0
///
/// Uses the Bessel closed form ₀F₁(; b; z) = Γ(b) x^{1−b} I_{b−1}(2x) with
/// x = √z. The zero argument returns the limiting value 1 (log 0) by an
/// explicit branch rather than through a 0·log 0 indeterminate.
pub fn log_hyp0f1(b: f64, z: f64) -> f64 {
    if z == 0.0 {
        return 0.0;
    }
    if z < 0.0 {
        return f64::NAN;
    }
    let x = z.sqrt();
    ln_gamma(b) + (1.0 - b) * x.ln() + log_bessel_i(b - 1.0, 2.0 * x)
}

/// Log of Kummer's function ₁F₁(a; b; z) for a ≥ 0, b > 0
///
/// Positive arguments sum the ascending series in log space; negative
/// arguments go through the Kummer transformation
/// ₁F₁(a; b; z) = e^z ₁F₁(b−a; b; −z) so the series keeps positive terms.
pub fn log_hyp1f1(a: f64, b: f64, z: f64) -> f64 {
    if z == 0.0 {
        return 0.0;
    }
    if z < 0.0 {
        return z + log_hyp1f1(b - a, b, -z);
    }
    let log_z = z.ln();
    let mut acc = LogSum::new();
    let mut log_term = 0.0; // k = 0 term is 1
    acc.add(log_term);
    let mut k = 0.0;
    loop {
        let next = log_term + (a + k).ln() - (b + k).ln() + log_z - (k + 1.0).ln();
        acc.add(next);
        let decreasing = next < log_term;
        log_term = next;
        k += 1.0;
        if (decreasing && log_term < acc.max() - 40.0) || k > 500_000.0 {
            break;
        }
    }
    acc.value()
}

/// Log of ₀F₁(; b; B) for a square symmetric matrix argument
///
/// The zero matrix returns the limiting constant; a 1×1 argument reduces to
/// the scalar kernel. Wider arguments are an acknowledged gap.
pub fn log_hyp0f1_matrix(b: f64, arg: &Array2<f64>) -> Result<f64> {
    matrix_argument(arg, |z| log_hyp0f1(b, z))
}

/// Log of ₁F₁(a; b; B) for a square symmetric matrix argument
pub fn log_hyp1f1_matrix(a: f64, b: f64, arg: &Array2<f64>) -> Result<f64> {
    matrix_argument(arg, |z| log_hyp1f1(a, b, z))
}

fn matrix_argument(arg: &Array2<f64>, scalar: impl Fn(f64) -> f64) -> Result<f64> {
    let (r, c) = arg.dim();
    if r != c {
        return Err(Error::DimensionMismatch { expected: r, got: c });
    }
    if arg.norm_l2() == 0.0 {
        // limiting normalizing constant: pFq(…; 0) = 1
        return Ok(0.0);
    }
    if r == 1 {
        return Ok(scalar(arg[[0, 0]]));
    }
    // TODO: general matrix argument needs the Koev–Edelman algorithm
    // (hypergeometric function of a matrix argument via zonal polynomials).
    Err(Error::NotImplemented(format!(
        "hypergeometric function of a {}×{} matrix argument",
        r, c
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn test_hyp0f1_zero_argument() {
        assert_eq!(log_hyp0f1(2.5, 0.0), 0.0);
    }

    #[test]
    fn test_hyp0f1_reduces_to_bessel() {
        // ₀F₁(; 1; 1) = Σ 1/(k!)² = I_0(2)
        assert_relative_eq!(
            log_hyp0f1(1.0, 1.0),
            2.2795853023360673_f64.ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_hyp0f1_against_direct_series() {
        let (b, z) = (2.5, 3.0);
        let mut term = 1.0;
        let mut sum = 1.0;
        for k in 0..60 {
            let kf = k as f64;
            term *= z / ((b + kf) * (kf + 1.0));
            sum += term;
        }
        assert_relative_eq!(log_hyp0f1(b, z), sum.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_hyp1f1_identities() {
        // ₁F₁(a; a; z) = e^z, on both sides of zero
        assert_relative_eq!(log_hyp1f1(1.5, 1.5, 2.0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(log_hyp1f1(1.5, 1.5, -3.0), -3.0, epsilon = 1e-12);
        // ₁F₁(1; 2; z) = (e^z − 1)/z
        let z = 0.7_f64;
        assert_relative_eq!(
            log_hyp1f1(1.0, 2.0, z),
            ((z.exp() - 1.0) / z).ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_matrix_argument_cases() {
        let zero = Array2::<f64>::zeros((3, 3));
        assert_eq!(log_hyp0f1_matrix(2.0, &zero).unwrap(), 0.0);

        let one = arr2(&[[1.0]]);
        assert_relative_eq!(
            log_hyp0f1_matrix(1.0, &one).unwrap(),
            log_hyp0f1(1.0, 1.0),
            epsilon = 1e-14
        );

        let wide = arr2(&[[1.0, 0.0], [0.0, 2.0]]);
        assert!(matches!(
            log_hyp1f1_matrix(0.5, 1.0, &wide),
            Err(Error::NotImplemented(_))
        ));
    }
}
