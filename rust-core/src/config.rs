// Constants and accumulator configuration

use serde::{Deserialize, Serialize};

use crate::interfaces::Interpolator;

// Tolerances
pub const WEIGHT_EPSILON: f64 = 1e-20; // Floor for divisions by (preweighted) weights
pub const MAP_EPSILON: f64 = 1e-10; // Floor for the noise-spectrum denominator
pub const SYMMETRY_TOLERANCE: f64 = 1e-6; // For deduplicating rotation matrices during group closure
pub const PREWEIGHT_TOLERANCE: f64 = 1e-3; // Interior residual of the gridding preweight

// Tabulation
pub const BLOB_TABLE_SIZE: usize = 10_000;
pub const BLOB_TABLE_RANGE: f64 = 0.5; // Normalised real-space radius covered by the blob table

// FSC to SSNR conversion
pub const FSC_MIN: f64 = 0.001;
pub const FSC_MAX: f64 = 0.999;
pub const ZERO_TAU2_PRIOR: f64 = 0.001; // Prior strength for shells with tau2 == 0
pub const EMPTY_SHELL_EVIDENCE: f64 = 999.0; // Evidence reported for shells without voxels

/// Geometry and kernel parameters of a [`crate::BackProjector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackProjectorConfig {
    /// Side of the original (unpadded) images, must be even
    pub ori_size: usize,
    /// Dimensionality of the reference (2 or 3)
    pub ref_dim: usize,
    /// Dimensionality of the data (2 or 3)
    pub data_dim: usize,
    /// Point-group symbol, e.g. "c1", "d2", "i3"
    pub symmetry: String,
    pub interpolator: Interpolator,
    /// Oversampling of the Fourier grid
    pub padding_factor: usize,
    /// Below this source radius nearest-neighbour insertion is used
    pub r_min_nn: usize,
    /// Blob order (0 or 2)
    pub blob_order: u32,
    /// Blob radius in original Fourier pixels
    pub blob_radius: f64,
    pub blob_alpha: f64,
}

impl BackProjectorConfig {
    /// Create a configuration with the usual defaults for the given size, reference
    /// dimensionality and symmetry.
    pub fn new(ori_size: usize, ref_dim: usize, symmetry: impl Into<String>) -> Self {
        Self {
            ori_size,
            ref_dim,
            data_dim: 2,
            symmetry: symmetry.into(),
            interpolator: Interpolator::Trilinear,
            padding_factor: 2,
            r_min_nn: 10,
            blob_order: 0,
            blob_radius: 1.9,
            blob_alpha: 15.0,
        }
    }

    pub fn with_interpolator(mut self, interpolator: Interpolator) -> Self {
        self.interpolator = interpolator;
        self
    }

    pub fn with_padding_factor(mut self, padding_factor: usize) -> Self {
        self.padding_factor = padding_factor;
        self
    }

    pub fn with_r_min_nn(mut self, r_min_nn: usize) -> Self {
        self.r_min_nn = r_min_nn;
        self
    }

    pub fn with_data_dim(mut self, data_dim: usize) -> Self {
        self.data_dim = data_dim;
        self
    }

    /// Set the blob parameters (order, radius, alpha)
    pub fn with_blob(mut self, order: u32, radius: f64, alpha: f64) -> Self {
        self.blob_order = order;
        self.blob_radius = radius;
        self.blob_alpha = alpha;
        self
    }
}
