use num_complex::Complex64;

use crate::backprojector::backprojector::BackProjector;
use crate::error::BackprojectorError;
use crate::grid::Volume;
use crate::Result;

impl BackProjector {
    /// Copy the voxels with `|f| ≤ r` (padded grid units) into small half-Hermitian arrays of
    /// side `2r + 1`.
    pub fn get_low_res_data_and_weight(&self, r: usize) -> Result<(Volume<Complex64>, Volume<f64>)> {
        self.check_low_res_radius(r)?;
        let mut lowres_data = Volume::half_hermitian(r, self.grid.ref_dim);
        let mut lowres_weight = Volume::half_hermitian(r, self.grid.ref_dim);
        let r2 = (r * r) as isize;

        for (index, value) in self.grid.data.iter_logical() {
            let [k, i, j] = index;
            if k * k + i * i + j * j > r2 {
                continue;
            }
            if let (Some(d), Some(w)) = (lowres_data.get_mut(k, i, j), lowres_weight.get_mut(k, i, j)) {
                *d = *value;
                *w = self.weight[index];
            }
        }
        Ok((lowres_data, lowres_weight))
    }

    /// Overwrite the voxels with `|f| ≤ r` by the given low-resolution arrays.
    ///
    /// Used to give two independent half-reconstructions the same low frequencies.
    pub fn set_low_res_data_and_weight(
        &mut self,
        lowres_data: &Volume<Complex64>,
        lowres_weight: &Volume<f64>,
        r: usize,
    ) -> Result<()> {
        self.ensure_accumulating()?;
        self.check_low_res_radius(r)?;
        let expected: Volume<f64> = Volume::half_hermitian(r, self.grid.ref_dim);
        if !expected.same_geometry(lowres_data) || !expected.same_geometry(lowres_weight) {
            return Err(BackprojectorError::DimensionMismatch(format!(
                "low-resolution arrays of shape {:?} / {:?} do not match radius {} (expected {:?})",
                lowres_data.shape(),
                lowres_weight.shape(),
                r,
                expected.shape()
            )));
        }

        let r2 = (r * r) as isize;
        for (index, value) in lowres_data.iter_logical() {
            let [k, i, j] = index;
            if k * k + i * i + j * j > r2 {
                continue;
            }
            self.grid.data[index] = *value;
            self.weight[index] = lowres_weight[index];
        }
        Ok(())
    }

    fn check_low_res_radius(&self, r: usize) -> Result<()> {
        if !self.is_allocated() {
            return Err(BackprojectorError::InvalidState(
                "data and weight grids are not initialised".to_string(),
            ));
        }
        if r > self.grid.support_radius() {
            return Err(BackprojectorError::OutOfSupport(format!(
                "low-resolution radius {} exceeds the support radius {}",
                r,
                self.grid.support_radius()
            )));
        }
        Ok(())
    }
}
