use log::{debug, info};
use num_complex::Complex64;

use crate::config::{BackProjectorConfig, BLOB_TABLE_SIZE};
use crate::error::BackprojectorError;
use crate::fft::FourierTransformer;
use crate::grid::{FourierGrid, Volume};
use crate::interfaces::AccumulatorState;
use crate::kernels::TabFtBlob;
use crate::symmetries::SymList;
use crate::Result;

/// Accumulates weighted Fourier samples on a padded half-Hermitian grid.
///
/// Composes the Fourier grid (`grid.data` and its geometry) with a weight grid of the same
/// shape, the tabulated blob used during preweighting and the non-identity rotations of the
/// point group. Cloning makes a deep copy of both grids.
#[derive(Debug, Clone)]
pub struct BackProjector {
    /// Weighted sum of inserted Fourier components and the grid geometry
    pub grid: FourierGrid,
    /// Sum of insertion weights, same shape as `grid.data`
    pub weight: Volume<f64>,
    pub tab_ftblob: TabFtBlob,
    pub symmetry: SymList,
    pub(crate) state: AccumulatorState,
    config: BackProjectorConfig,
}

impl BackProjector {
    /// Validate the configuration, parse its symmetry and tabulate the blob.
    ///
    /// The grids stay unallocated until [`BackProjector::initialise_data_and_weight`].
    pub fn new(config: BackProjectorConfig) -> Result<Self> {
        let grid = FourierGrid::new(&config)?;
        let symmetry = SymList::from_symbol(&config.symmetry)?;
        let tab_ftblob = TabFtBlob::new(
            config.blob_radius * config.padding_factor as f64,
            config.blob_alpha,
            config.blob_order,
            BLOB_TABLE_SIZE,
        )?;

        if config.ref_dim == 2 && !symmetry.is_empty() {
            debug!(
                "Symmetry {} is ignored for 2D references",
                symmetry.group()
            );
        }
        debug!(
            "Created backprojector: ori_size {}, ref_dim {}, data_dim {}, symmetry {} ({} operators), padding {}",
            config.ori_size,
            config.ref_dim,
            config.data_dim,
            symmetry.group(),
            symmetry.true_symmetry_count(),
            config.padding_factor
        );

        Ok(Self {
            grid,
            weight: Volume::zeros([0, 0, 0], [0, 0, 0]),
            tab_ftblob,
            symmetry,
            state: AccumulatorState::Accumulating,
            config,
        })
    }

    /// Allocate zeroed data and weight grids and fix `r_max` from `current_size`
    /// (defaults to the original size).
    pub fn initialise_data_and_weight(&mut self, current_size: Option<usize>) -> Result<()> {
        self.grid.init_zeros(current_size)?;
        self.weight = Volume::zeros(self.grid.grid_shape(), self.grid.grid_origin());
        self.state = AccumulatorState::Accumulating;
        Ok(())
    }

    /// Zero both grids, reusing the allocation when the geometry is unchanged
    pub fn init_zeros(&mut self, current_size: Option<usize>) -> Result<()> {
        let r_max = current_size
            .unwrap_or(self.grid.ori_size)
            .min(self.grid.ori_size)
            / 2;
        let allocated = self.is_allocated()
            && current_size.map_or(true, |size| size <= self.grid.pad_size);
        if allocated && r_max == self.grid.r_max {
            self.grid.data.clear();
            self.weight.clear();
            self.state = AccumulatorState::Accumulating;
            Ok(())
        } else {
            self.initialise_data_and_weight(current_size)
        }
    }

    /// Release both grids
    pub fn clear(&mut self) {
        self.grid.clear();
        self.weight = Volume::zeros([0, 0, 0], [0, 0, 0]);
        self.state = AccumulatorState::Accumulating;
    }

    /// Add the grids of `other` into this accumulator.
    ///
    /// Used to merge per-thread accumulators; both must share the same geometry and still
    /// be accumulating.
    pub fn accumulate(&mut self, other: &BackProjector) -> Result<()> {
        self.ensure_accumulating()?;
        other.ensure_accumulating()?;
        if !self.grid.data.same_geometry(&other.grid.data)
            || !self.weight.same_geometry(&other.weight)
            || self.grid.r_max != other.grid.r_max
            || self.grid.padding_factor != other.grid.padding_factor
        {
            return Err(BackprojectorError::DimensionMismatch(format!(
                "cannot accumulate grid {:?} (r_max {}) into grid {:?} (r_max {})",
                other.grid.data.shape(),
                other.grid.r_max,
                self.grid.data.shape(),
                self.grid.r_max
            )));
        }

        *self.grid.data.array_mut() += other.grid.data.array();
        *self.weight.array_mut() += other.weight.array();
        Ok(())
    }

    /// FFT plans for the full padded box used by [`BackProjector::reconstruct`]
    pub fn create_transformer(&self) -> FourierTransformer {
        info!("Planning FFTs for padded box {:?}", self.grid.fft_shape());
        FourierTransformer::new(self.grid.fft_shape())
    }

    pub fn config(&self) -> &BackProjectorConfig {
        &self.config
    }

    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    pub fn data(&self) -> &Volume<Complex64> {
        &self.grid.data
    }

    pub fn weight(&self) -> &Volume<f64> {
        &self.weight
    }

    pub fn is_allocated(&self) -> bool {
        self.grid.data.shape() == self.grid.grid_shape() && self.weight.same_geometry(&self.grid.data)
    }

    pub(crate) fn ensure_accumulating(&self) -> Result<()> {
        if self.state == AccumulatorState::Consumed {
            return Err(BackprojectorError::InvalidState(
                "the grids were consumed by a reconstruction; re-initialise before inserting"
                    .to_string(),
            ));
        }
        if !self.is_allocated() {
            return Err(BackprojectorError::InvalidState(
                "data and weight grids are not initialised".to_string(),
            ));
        }
        Ok(())
    }
}
