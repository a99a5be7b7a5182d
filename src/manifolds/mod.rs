use std::f64::consts::PI;

use ndarray::{s, Array2};
use ndarray_linalg::{Determinant, Norm, SVD};

use crate::core::{Error, Point, PointShape, Result};

/// Number system over which a manifold is defined.
///
/// The tag fixes the real dimension of a scalar (1, 2 or 4) and therefore the
/// real embedding dimension of vector points. Complex and quaternionic vector
/// points are stored in their isometric real embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberField {
    Real,
    Complex,
    Quaternion,
}

impl NumberField {
    /// Real dimension of one scalar: d(ℝ)=1, d(ℂ)=2, d(ℍ)=4
    pub fn real_dim(self) -> usize {
        match self {
            NumberField::Real => 1,
            NumberField::Complex => 2,
            NumberField::Quaternion => 4,
        }
    }
}

/// Descriptor of a supported manifold in its default embedding.
///
/// Descriptors are small copyable values; all geometry (shapes, membership,
/// projection) dispatches on them with exhaustive matches.
///
/// Conventions:
/// - `Sphere { dim, .. }` is S^dim, unit vectors in 𝔽^{dim+1}.
/// - `Stiefel { n, k, .. }` is St(n, k) = {X ∈ 𝔽^{n×k} : XᴴX = I_k}.
/// - `Grassmann` points are Stiefel representatives of their subspace.
/// - `Rotations { n }` is SO(n), real by construction.
/// - The real `Circle` uses angle coordinates in `[-π, π)`; the complex
///   circle is the unit circle in ℂ ≅ ℝ².
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manifold {
    Sphere { dim: usize, field: NumberField },
    ProjectiveSpace { dim: usize, field: NumberField },
    Stiefel { n: usize, k: usize, field: NumberField },
    Grassmann { n: usize, k: usize, field: NumberField },
    Rotations { n: usize },
    Circle { field: NumberField },
}

impl Manifold {
    pub fn sphere(dim: usize) -> Self {
        Manifold::Sphere {
            dim,
            field: NumberField::Real,
        }
    }

    pub fn sphere_over(dim: usize, field: NumberField) -> Self {
        Manifold::Sphere { dim, field }
    }

    pub fn projective_space(dim: usize) -> Self {
        Manifold::ProjectiveSpace {
            dim,
            field: NumberField::Real,
        }
    }

    pub fn projective_space_over(dim: usize, field: NumberField) -> Self {
        Manifold::ProjectiveSpace { dim, field }
    }

    /// Create St(n, k); requires k ≤ n
    pub fn stiefel(n: usize, k: usize) -> Result<Self> {
        Self::stiefel_over(n, k, NumberField::Real)
    }

    pub fn stiefel_over(n: usize, k: usize, field: NumberField) -> Result<Self> {
        if k > n {
            return Err(Error::InvalidParameter(format!(
                "Stiefel manifold requires k ≤ n, got k={}, n={}",
                k, n
            )));
        }
        Ok(Manifold::Stiefel { n, k, field })
    }

    /// Create Gr(n, k); requires k ≤ n
    pub fn grassmann(n: usize, k: usize) -> Result<Self> {
        Self::grassmann_over(n, k, NumberField::Real)
    }

    pub fn grassmann_over(n: usize, k: usize, field: NumberField) -> Result<Self> {
        if k > n {
            return Err(Error::InvalidParameter(format!(
                "Grassmann manifold requires k ≤ n, got k={}, n={}",
                k, n
            )));
        }
        Ok(Manifold::Grassmann { n, k, field })
    }

    pub fn rotations(n: usize) -> Self {
        Manifold::Rotations { n }
    }

    pub fn circle() -> Self {
        Manifold::Circle {
            field: NumberField::Real,
        }
    }

    pub fn complex_circle() -> Self {
        Manifold::Circle {
            field: NumberField::Complex,
        }
    }

    pub fn field(&self) -> NumberField {
        match *self {
            Manifold::Sphere { field, .. }
            | Manifold::ProjectiveSpace { field, .. }
            | Manifold::Stiefel { field, .. }
            | Manifold::Grassmann { field, .. }
            | Manifold::Circle { field } => field,
            Manifold::Rotations { .. } => NumberField::Real,
        }
    }

    /// Representation shape of a point on this manifold
    pub fn point_shape(&self) -> PointShape {
        match *self {
            Manifold::Sphere { dim, field } | Manifold::ProjectiveSpace { dim, field } => {
                PointShape::Vector(field.real_dim() * (dim + 1))
            }
            Manifold::Stiefel { n, k, .. } | Manifold::Grassmann { n, k, .. } => {
                PointShape::Matrix(n, k)
            }
            Manifold::Rotations { n } => PointShape::Matrix(n, n),
            Manifold::Circle {
                field: NumberField::Real,
            } => PointShape::Angle,
            Manifold::Circle { .. } => PointShape::Vector(2),
        }
    }

    /// Ambient `(rows, cols)` of the embedded representation; vector points
    /// count as a single column
    pub fn ambient_shape(&self) -> (usize, usize) {
        match self.point_shape() {
            PointShape::Angle => (1, 1),
            PointShape::Vector(n) => (n, 1),
            PointShape::Matrix(n, k) => (n, k),
        }
    }

    /// Membership test in the embedded representation, up to `tolerance`
    pub fn is_point(&self, p: &Point, tolerance: f64) -> bool {
        match (self, p) {
            (
                Manifold::Circle {
                    field: NumberField::Real,
                },
                Point::Angle(theta),
            ) => theta.is_finite() && (-PI..PI).contains(theta),
            (Manifold::Sphere { .. }, Point::Vector(x))
            | (Manifold::ProjectiveSpace { .. }, Point::Vector(x))
            | (Manifold::Circle { .. }, Point::Vector(x)) => {
                let PointShape::Vector(len) = self.point_shape() else {
                    return false;
                };
                x.len() == len && (x.norm_l2() - 1.0).abs() < tolerance
            }
            (Manifold::Stiefel { .. }, Point::Matrix(x))
            | (Manifold::Grassmann { .. }, Point::Matrix(x)) => {
                self.has_orthonormal_columns(x, tolerance)
            }
            (Manifold::Rotations { .. }, Point::Matrix(x)) => {
                self.has_orthonormal_columns(x, tolerance)
                    && x.det().map(|d| d > 0.0).unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Project an ambient representative onto the manifold
    ///
    /// Vectors are normalized; matrices are replaced by their polar factor
    /// (nearest point with orthonormal columns); angles are wrapped to
    /// `[-π, π)`. Rotations additionally get the sign of the last polar
    /// column fixed so the determinant is +1.
    pub fn project(&self, p: &Point) -> Result<Point> {
        match (self, p) {
            (
                Manifold::Circle {
                    field: NumberField::Real,
                },
                Point::Angle(theta),
            ) => Ok(Point::Angle(wrap_angle(*theta))),
            (Manifold::Sphere { .. }, Point::Vector(x))
            | (Manifold::ProjectiveSpace { .. }, Point::Vector(x))
            | (Manifold::Circle { .. }, Point::Vector(x)) => {
                let norm = x.norm_l2();
                if norm < 1e-10 {
                    return Err(Error::ComputationFailed(
                        "cannot project zero vector onto the sphere".to_string(),
                    ));
                }
                Ok(Point::Vector(x / norm))
            }
            (Manifold::Stiefel { .. }, Point::Matrix(x))
            | (Manifold::Grassmann { .. }, Point::Matrix(x)) => {
                Ok(Point::Matrix(polar_factor(x)?))
            }
            (Manifold::Rotations { n }, Point::Matrix(x)) => {
                let mut q = polar_factor(x)?;
                let det = q.det()?;
                if det < 0.0 {
                    let last = *n - 1;
                    for i in 0..*n {
                        q[[i, last]] = -q[[i, last]];
                    }
                }
                Ok(Point::Matrix(q))
            }
            _ => Err(Error::InvalidParameter(
                "point representation does not match the manifold".to_string(),
            )),
        }
    }

    /// Check X ∈ ℝ^{n×k} has orthonormal columns: ‖XᵀX − I‖ < tolerance
    fn has_orthonormal_columns(&self, x: &Array2<f64>, tolerance: f64) -> bool {
        let (n, k) = self.ambient_shape();
        if x.shape() != [n, k] {
            return false;
        }
        let xtx = x.t().dot(x);
        let identity: Array2<f64> = Array2::eye(k);
        (&xtx - &identity).norm_l2() < tolerance
    }
}

/// Wrap an angle to `[-π, π)`
pub fn wrap_angle(theta: f64) -> f64 {
    let wrapped = (theta + PI).rem_euclid(2.0 * PI) - PI;
    // rem_euclid can land exactly on π when theta is slightly below -π
    if wrapped >= PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}

/// Polar factor of X: the orthonormal-column matrix U Vᵀ from X = U Σ Vᵀ
pub(crate) fn polar_factor(x: &Array2<f64>) -> Result<Array2<f64>> {
    let k = x.ncols();
    let (u, _s, vt) = x.svd(true, true)?;
    let u = u.ok_or_else(|| Error::ComputationFailed("SVD failed to compute U".to_string()))?;
    let vt = vt.ok_or_else(|| Error::ComputationFailed("SVD failed to compute Vᵀ".to_string()))?;
    let u_k = u.slice(s![.., 0..k]).to_owned();
    Ok(u_k.dot(&vt))
}

/// Orthonormal basis of the orthogonal complement of span(columns of `x`)
///
/// `x` must have linearly independent columns; the basis is the trailing
/// left-singular vectors of the full SVD.
pub(crate) fn null_space_basis(x: &Array2<f64>) -> Result<Array2<f64>> {
    let (n, j) = x.dim();
    let (u, _s, _vt) = x.svd(true, false)?;
    let u = u.ok_or_else(|| Error::ComputationFailed("SVD failed to compute U".to_string()))?;
    Ok(u.slice(s![.., j..n]).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_point_shapes() {
        assert_eq!(Manifold::sphere(2).point_shape(), PointShape::Vector(3));
        assert_eq!(
            Manifold::sphere_over(1, NumberField::Complex).point_shape(),
            PointShape::Vector(4)
        );
        assert_eq!(
            Manifold::stiefel(5, 2).unwrap().point_shape(),
            PointShape::Matrix(5, 2)
        );
        assert_eq!(Manifold::rotations(3).point_shape(), PointShape::Matrix(3, 3));
        assert_eq!(Manifold::circle().point_shape(), PointShape::Angle);
        assert_eq!(Manifold::complex_circle().point_shape(), PointShape::Vector(2));
    }

    #[test]
    fn test_stiefel_invalid_dimensions() {
        assert!(Manifold::stiefel(3, 5).is_err());
        assert!(Manifold::grassmann(2, 4).is_err());
    }

    #[test]
    fn test_sphere_membership_and_projection() {
        let sphere = Manifold::sphere(2);
        let p = Point::Vector(arr1(&[3.0, 4.0, 0.0]));
        assert!(!sphere.is_point(&p, 1e-8));

        let projected = sphere.project(&p).unwrap();
        assert!(sphere.is_point(&projected, 1e-10));
        let x = projected.as_vector().unwrap();
        assert_relative_eq!(x[0], 0.6, epsilon = 1e-12);
        assert_relative_eq!(x[1], 0.8, epsilon = 1e-12);

        let zero = Point::Vector(arr1(&[0.0, 0.0, 0.0]));
        assert!(sphere.project(&zero).is_err());
    }

    #[test]
    fn test_stiefel_projection_orthonormalizes() {
        let st = Manifold::stiefel(3, 2).unwrap();
        let x = Point::Matrix(arr2(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]));
        let projected = st.project(&x).unwrap();
        assert!(st.is_point(&projected, 1e-8));
    }

    #[test]
    fn test_rotations_projection_fixes_determinant() {
        let so3 = Manifold::rotations(3);
        // Reflection: orthogonal with det = -1
        let r = Point::Matrix(arr2(&[
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, -1.0],
        ]));
        assert!(!so3.is_point(&r, 1e-8));
        let fixed = so3.project(&r).unwrap();
        assert!(so3.is_point(&fixed, 1e-8));
    }

    #[test]
    fn test_wrap_angle() {
        assert_relative_eq!(wrap_angle(3.0 * PI), -PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-PI), -PI, epsilon = 1e-12);
        assert!(wrap_angle(PI) < PI);
        assert_relative_eq!(wrap_angle(0.5), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_null_space_basis() {
        let x = arr2(&[[1.0, 0.0], [0.0, 1.0], [0.0, 0.0], [0.0, 0.0]]);
        let basis = null_space_basis(&x).unwrap();
        assert_eq!(basis.dim(), (4, 2));
        // Basis columns orthonormal and orthogonal to x
        let btb = basis.t().dot(&basis);
        let xtb = x.t().dot(&basis);
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(btb[[i, j]], expected, epsilon = 1e-10);
                assert_relative_eq!(xtb[[i, j]], 0.0, epsilon = 1e-10);
            }
        }
    }
}
