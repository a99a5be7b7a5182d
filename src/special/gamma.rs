use std::f64::consts::PI;

use statrs::function::gamma::ln_gamma;

/// Log of the multivariate gamma function Γ_m(a)
///
/// log Γ_m(a) = (m(m−1)/4)·log π + Σ_{i=1}^{m} log Γ(a − (i−1)/2)
///
/// Computed as a sum of log-gammas so it stays finite for large m, where the
/// product of gammas overflows. Domain: a > (m−1)/2.
pub fn log_multivariate_gamma(m: usize, a: f64) -> f64 {
    let mf = m as f64;
    let mut acc = mf * (mf - 1.0) / 4.0 * PI.ln();
    for i in 0..m {
        acc += ln_gamma(a - i as f64 / 2.0);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_univariate_case_is_log_gamma() {
        for a in [0.5, 1.0, 2.5, 10.0] {
            assert_relative_eq!(log_multivariate_gamma(1, a), ln_gamma(a), epsilon = 1e-14);
        }
    }

    #[test]
    fn test_bivariate_closed_form() {
        // Γ_2(a) = √π · Γ(a) · Γ(a − 1/2)
        let a = 3.0;
        let expected = 0.5 * PI.ln() + ln_gamma(a) + ln_gamma(a - 0.5);
        assert_relative_eq!(log_multivariate_gamma(2, a), expected, epsilon = 1e-14);
    }

    #[test]
    fn test_recurrence_in_m() {
        // Γ_m(a) = π^{(m−1)/2} Γ(a) Γ_{m−1}(a − 1/2)
        let a = 6.0;
        for m in 2..6 {
            let lhs = log_multivariate_gamma(m, a);
            let rhs = (m as f64 - 1.0) / 2.0 * PI.ln()
                + ln_gamma(a)
                + log_multivariate_gamma(m - 1, a - 0.5);
            assert_relative_eq!(lhs, rhs, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_large_m_stays_finite() {
        let v = log_multivariate_gamma(200, 150.0);
        assert!(v.is_finite());
    }
}
