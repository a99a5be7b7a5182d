use rand::Rng;

use crate::core::{Error, Point, Result};
use crate::manifolds::Manifold;
use crate::measures::hausdorff::Hausdorff;

/// Translation side under which a Haar measure is invariant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Haar (group-invariant) measure on a compact group manifold
///
/// For the compact groups supported here the Haar measure coincides with the
/// Hausdorff measure up to normalization, so mass and sampling delegate to
/// it; the group and side are kept for invariance reasoning downstream.
#[derive(Debug, Clone)]
pub struct Haar {
    group: Manifold,
    side: Side,
}

impl Haar {
    pub fn new(group: Manifold, side: Side) -> Result<Self> {
        match group {
            Manifold::Rotations { .. } | Manifold::Circle { .. } => Ok(Haar { group, side }),
            _ => Err(Error::Unsupported(format!(
                "Haar measure needs a group manifold, got {:?}",
                group
            ))),
        }
    }

    pub fn left(group: Manifold) -> Result<Self> {
        Self::new(group, Side::Left)
    }

    pub fn right(group: Manifold) -> Result<Self> {
        Self::new(group, Side::Right)
    }

    pub fn group(&self) -> Manifold {
        self.group
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn log_density(&self, _point: &Point) -> f64 {
        0.0
    }

    pub fn log_mass(&self) -> f64 {
        Hausdorff::new(self.group).log_mass()
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Point> {
        Hausdorff::new(self.group).sample(rng)
    }

    pub fn sample_into<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut Point) -> Result<()> {
        Hausdorff::new(self.group).sample_into(rng, out)
    }
}
