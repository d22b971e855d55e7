use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::SYMMETRY_TOLERANCE;

/// A point-group symmetry operation: a proper rotation about the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymmetryOperation {
    /// Orthogonal rotation matrix with determinant +1
    pub rotation: Matrix3<f64>,
}

impl SymmetryOperation {
    pub fn new(rotation: Matrix3<f64>) -> Self {
        Self { rotation }
    }

    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
        }
    }

    /// Rotation by `angle` radians about `axis` (right-handed)
    pub fn from_axis_angle(axis: Vector3<f64>, angle: f64) -> Self {
        let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle)
            .into_inner()
            .map(snap_integer);
        Self { rotation }
    }

    /// `n`-fold rotation about `axis`
    pub fn fold(axis: Vector3<f64>, n: u32) -> Self {
        Self::from_axis_angle(axis, 2.0 * std::f64::consts::PI / n as f64)
    }

    /// Apply the rotation to a point
    pub fn apply(&self, point: Vector3<f64>) -> Vector3<f64> {
        self.rotation * point
    }

    /// `self ∘ other`: first `other`, then `self`
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
        }
    }

    /// Inverse rotation (the transpose)
    pub fn inverse(&self) -> Self {
        Self {
            rotation: self.rotation.transpose(),
        }
    }

    /// Smallest `n ≥ 1` with `Rⁿ = I`; 0 if none is found up to 360.
    pub fn order(&self) -> usize {
        let mut power = *self;
        for n in 1..=360 {
            if power.is_identity() {
                return n;
            }
            power = power.compose(self);
        }
        0
    }

    pub fn is_identity(&self) -> bool {
        self.approx_eq(&Self::identity())
    }

    /// Element-wise comparison within [`SYMMETRY_TOLERANCE`]
    pub fn approx_eq(&self, other: &Self) -> bool {
        (self.rotation - other.rotation).amax() < SYMMETRY_TOLERANCE
    }
}

impl Default for SymmetryOperation {
    fn default() -> Self {
        Self::identity()
    }
}

// Entries that are integers in exact arithmetic (quarter and half turns) are made exact, so
// symmetry-related grid points map onto grid points without rounding noise.
fn snap_integer(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < 1e-12 {
        rounded
    } else {
        value
    }
}
