//! Numerically stable special-function kernels
//!
//! Everything here works in log space: normalizing constants of directional
//! distributions overflow long before their logarithms do.

pub mod bessel;
pub mod gamma;
pub mod hypergeometric;

pub use bessel::{log_bessel_i, log_bessel_i_scaled};
pub use gamma::log_multivariate_gamma;
pub use hypergeometric::{log_hyp0f1, log_hyp0f1_matrix, log_hyp1f1, log_hyp1f1_matrix};

/// Streaming log-sum-exp accumulator for series with non-negative terms
///
/// Keeps the running maximum so partial sums never overflow, no matter how
/// large individual log-terms get.
pub(crate) struct LogSum {
    max: f64,
    sum: f64,
}

impl LogSum {
    pub(crate) fn new() -> Self {
        LogSum {
            max: f64::NEG_INFINITY,
            sum: 0.0,
        }
    }

    pub(crate) fn add(&mut self, log_term: f64) {
        if log_term == f64::NEG_INFINITY {
            return;
        }
        if log_term <= self.max {
            self.sum += (log_term - self.max).exp();
        } else {
            self.sum = self.sum * (self.max - log_term).exp() + 1.0;
            self.max = log_term;
        }
    }

    pub(crate) fn max(&self) -> f64 {
        self.max
    }

    pub(crate) fn value(&self) -> f64 {
        if self.sum == 0.0 {
            f64::NEG_INFINITY
        } else {
            self.max + self.sum.ln()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_log_sum_matches_direct_sum() {
        let terms = [0.3_f64, 1.7, 0.01, 2.4];
        let mut acc = LogSum::new();
        for t in terms {
            acc.add(t.ln());
        }
        let direct: f64 = terms.iter().sum();
        assert_relative_eq!(acc.value(), direct.ln(), epsilon = 1e-14);
    }

    #[test]
    fn test_log_sum_handles_huge_terms() {
        let mut acc = LogSum::new();
        acc.add(1000.0);
        acc.add(1000.0_f64 + 2.0_f64.ln());
        // 3 * e^1000
        assert_relative_eq!(acc.value(), 1000.0 + 3.0_f64.ln(), epsilon = 1e-14);
    }
}
