use ndarray::{Array1, Array2};

use crate::core::error::{Error, Result};

/// Point on a manifold in its embedded representation.
///
/// Points are plain values: every sample or density evaluation works on a
/// caller-owned copy, never on shared state. The representation is fixed by
/// the manifold descriptor:
/// - `Angle` for the real circle (radians in `[-π, π)`),
/// - `Vector` for spheres and projective spaces (real embedding coordinates),
/// - `Matrix` for Stiefel, Grassmann and rotation manifolds.
#[derive(Debug, Clone, PartialEq)]
pub enum Point {
    Angle(f64),
    Vector(Array1<f64>),
    Matrix(Array2<f64>),
}

/// Representation shape of points on a manifold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointShape {
    Angle,
    Vector(usize),
    Matrix(usize, usize),
}

impl Point {
    pub fn as_angle(&self) -> Result<f64> {
        match self {
            Point::Angle(theta) => Ok(*theta),
            _ => Err(Error::InvalidParameter(
                "expected an angle point".to_string(),
            )),
        }
    }

    pub fn as_vector(&self) -> Result<&Array1<f64>> {
        match self {
            Point::Vector(x) => Ok(x),
            _ => Err(Error::InvalidParameter(
                "expected a vector point".to_string(),
            )),
        }
    }

    pub fn as_matrix(&self) -> Result<&Array2<f64>> {
        match self {
            Point::Matrix(x) => Ok(x),
            _ => Err(Error::InvalidParameter(
                "expected a matrix point".to_string(),
            )),
        }
    }

    pub fn shape(&self) -> PointShape {
        match self {
            Point::Angle(_) => PointShape::Angle,
            Point::Vector(x) => PointShape::Vector(x.len()),
            Point::Matrix(x) => PointShape::Matrix(x.nrows(), x.ncols()),
        }
    }

    /// Copy `other` into this point's storage without reallocating.
    ///
    /// Fails if the representations or shapes differ.
    pub fn assign(&mut self, other: &Point) -> Result<()> {
        match (self, other) {
            (Point::Angle(dst), Point::Angle(src)) => {
                *dst = *src;
                Ok(())
            }
            (Point::Vector(dst), Point::Vector(src)) if dst.len() == src.len() => {
                dst.assign(src);
                Ok(())
            }
            (Point::Vector(dst), Point::Vector(src)) => Err(Error::DimensionMismatch {
                expected: dst.len(),
                got: src.len(),
            }),
            (Point::Matrix(dst), Point::Matrix(src)) if dst.dim() == src.dim() => {
                dst.assign(src);
                Ok(())
            }
            (Point::Matrix(dst), Point::Matrix(src)) => Err(Error::DimensionMismatch {
                expected: dst.nrows() * dst.ncols(),
                got: src.nrows() * src.ncols(),
            }),
            _ => Err(Error::InvalidParameter(
                "point representations do not match".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_accessors() {
        let p = Point::Vector(arr1(&[1.0, 0.0]));
        assert!(p.as_vector().is_ok());
        assert!(p.as_matrix().is_err());
        assert_eq!(p.shape(), PointShape::Vector(2));
    }

    #[test]
    fn test_assign_shape_checked() {
        let mut dst = Point::Vector(arr1(&[0.0, 0.0]));
        assert!(dst.assign(&Point::Vector(arr1(&[1.0, 2.0]))).is_ok());
        assert!(dst.assign(&Point::Vector(arr1(&[1.0]))).is_err());
        assert!(dst.assign(&Point::Angle(0.5)).is_err());
        assert_eq!(dst.as_vector().unwrap()[1], 2.0);
    }
}
