pub mod core;
pub mod manifolds;
pub mod measures;
pub mod special;

// Flat re-exports for convenience
pub use crate::core::{Error, Point, PointShape, Result};
pub use crate::manifolds::{Manifold, NumberField};
pub use crate::measures::{
    normalize_measure, AcgParams, AngularCentralGaussian, Bingham, Haar, Hausdorff, Measure,
    Normalized, Side, VmfParams, VonMisesFisher,
};

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::core::{Error, Point, PointShape, Result};
    pub use crate::manifolds::{Manifold, NumberField};
    pub use crate::measures::{
        mean_direction, normalize_measure, AngularCentralGaussian, Bingham, Haar, Hausdorff,
        Measure, Side, VonMisesFisher,
    };
    pub use crate::special::{
        log_bessel_i, log_hyp0f1, log_hyp1f1, log_multivariate_gamma,
    };
}
