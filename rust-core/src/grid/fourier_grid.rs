use log::debug;
use num_complex::Complex64;

use crate::config::BackProjectorConfig;
use crate::error::BackprojectorError;
use crate::grid::volume::Volume;
use crate::interfaces::Interpolator;
use crate::Result;

/// Padded, centered, half-Hermitian complex Fourier grid and its geometry.
///
/// The grid has side `pad_size = padding_factor * ori_size`. Logical frequencies run over
/// `kp, ip ∈ [-pad_size/2, pad_size/2)` and `jp ∈ [0, pad_size/2]`; a 2D grid keeps only
/// the `kp = 0` plane. `r_max` is expressed in original-image frequency units.
#[derive(Debug, Clone)]
pub struct FourierGrid {
    /// Complex grid
    pub data: Volume<Complex64>,
    /// Side of the original images
    pub ori_size: usize,
    /// Side of the padded grid
    pub pad_size: usize,
    /// Maximum source radius (original units)
    pub r_max: usize,
    /// Source radius below which nearest-neighbour insertion is used
    pub r_min_nn: usize,
    pub interpolator: Interpolator,
    pub padding_factor: usize,
    /// Dimensionality of the reference
    pub ref_dim: usize,
    /// Dimensionality of the data
    pub data_dim: usize,
}

impl FourierGrid {
    /// Validate the geometry of `config` and create an empty (unallocated) grid.
    pub fn new(config: &BackProjectorConfig) -> Result<Self> {
        if config.ori_size == 0 || config.ori_size % 2 != 0 {
            return Err(BackprojectorError::InvalidParameter(format!(
                "ori_size must be a positive even number, got {}",
                config.ori_size
            )));
        }
        if !(2..=3).contains(&config.ref_dim) {
            return Err(BackprojectorError::DimensionMismatch(format!(
                "reference dimensionality should be 2 or 3, got {}",
                config.ref_dim
            )));
        }
        if !(2..=3).contains(&config.data_dim) || config.data_dim > config.ref_dim {
            return Err(BackprojectorError::DimensionMismatch(format!(
                "data dimensionality {} is incompatible with reference dimensionality {}",
                config.data_dim, config.ref_dim
            )));
        }
        if config.padding_factor == 0 {
            return Err(BackprojectorError::InvalidParameter(
                "padding factor must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            data: Volume::zeros([0, 0, 0], [0, 0, 0]),
            ori_size: config.ori_size,
            pad_size: config.padding_factor * config.ori_size,
            r_max: config.ori_size / 2,
            r_min_nn: config.r_min_nn,
            interpolator: config.interpolator,
            padding_factor: config.padding_factor,
            ref_dim: config.ref_dim,
            data_dim: config.data_dim,
        })
    }

    /// Allocate a zeroed grid and fix `r_max` from `current_size` (defaults to `ori_size`).
    ///
    /// `r_max` never exceeds the Nyquist frequency of the original images.
    pub fn init_zeros(&mut self, current_size: Option<usize>) -> Result<()> {
        let current_size = current_size.unwrap_or(self.ori_size);
        if current_size > self.pad_size {
            return Err(BackprojectorError::OutOfSupport(format!(
                "current size {} exceeds the padded grid size {}",
                current_size, self.pad_size
            )));
        }
        self.r_max = (current_size / 2).min(self.ori_size / 2);
        self.data = Volume::zeros(self.grid_shape(), self.grid_origin());

        debug!(
            "Initialised {}D Fourier grid: ori_size {}, pad_size {}, r_max {}, support radius {}",
            self.ref_dim,
            self.ori_size,
            self.pad_size,
            self.r_max,
            self.support_radius()
        );
        Ok(())
    }

    /// Shape of the half-Hermitian grid, slowest axis first
    pub fn grid_shape(&self) -> [usize; 3] {
        let depth = if self.ref_dim == 3 { self.pad_size } else { 1 };
        [depth, self.pad_size, self.pad_size / 2 + 1]
    }

    /// Logical index of the first grid element
    pub fn grid_origin(&self) -> [isize; 3] {
        let h = (self.pad_size / 2) as isize;
        let first_k = if self.ref_dim == 3 { -h } else { 0 };
        [first_k, -h, 0]
    }

    /// Radius of the live region of the padded grid (padded voxel units)
    pub fn support_radius(&self) -> usize {
        (self.padding_factor * self.r_max).min(self.pad_size / 2 - 1)
    }

    /// Squared support radius
    pub fn max_r2(&self) -> isize {
        let r = self.support_radius() as isize;
        r * r
    }

    /// Number of resolution shells of the original images
    pub fn shell_count(&self) -> usize {
        self.ori_size / 2 + 1
    }

    /// Shape of the full (non-halved) padded FFT box
    pub fn fft_shape(&self) -> [usize; 3] {
        let depth = if self.ref_dim == 3 { self.pad_size } else { 1 };
        [depth, self.pad_size, self.pad_size]
    }

    /// Oversampling of the padded grid relative to the original sampling
    pub fn oversampling(&self) -> f64 {
        (self.padding_factor as f64).powi(self.ref_dim as i32)
    }

    /// Resolution shell (original units) of a padded-grid voxel
    #[inline]
    pub fn shell_of(&self, r2: isize) -> usize {
        ((r2 as f64).sqrt() / self.padding_factor as f64).round() as usize
    }

    /// Release the grid memory
    pub fn clear(&mut self) {
        self.data = Volume::zeros([0, 0, 0], [0, 0, 0]);
    }
}
