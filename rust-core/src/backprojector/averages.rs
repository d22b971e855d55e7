use num_complex::Complex64;

use crate::backprojector::backprojector::BackProjector;
use crate::error::BackprojectorError;
use crate::grid::Volume;
use crate::Result;

impl BackProjector {
    /// Average the padded grid down to the original sampling.
    ///
    /// Each padded voxel contributes to the voxel `round(f / padding_factor)` of a half grid of
    /// radius `r_max + 1`; the result is `ΣD / ΣW`, zero where no weight arrived.
    pub fn get_downsampled_average(&self) -> Result<Volume<Complex64>> {
        if !self.is_allocated() {
            return Err(BackprojectorError::InvalidState(
                "data and weight grids are not initialised".to_string(),
            ));
        }
        let radius = self.grid.r_max + 1;
        let pf = self.grid.padding_factor as f64;
        let mut down_data: Volume<Complex64> = Volume::half_hermitian(radius, self.grid.ref_dim);
        let mut down_weight: Volume<f64> = Volume::half_hermitian(radius, self.grid.ref_dim);

        for (index, value) in self.grid.data.iter_logical() {
            let [k, i, j] = index.map(|f| (f as f64 / pf).round() as isize);
            if let (Some(d), Some(w)) = (down_data.get_mut(k, i, j), down_weight.get_mut(k, i, j)) {
                *d += *value;
                *w += self.weight[index];
            }
        }

        ndarray::Zip::from(down_data.array_mut())
            .and(down_weight.array())
            .for_each(|d, &w| {
                *d = if w > 0.0 { *d / w } else { Complex64::new(0.0, 0.0) };
            });
        Ok(down_data)
    }

    /// Fourier shell correlation between two downsampled averages.
    ///
    /// Shells are `round(|f|)` for `|f| ≤ r_max`; the curve has `ori_size/2 + 1` entries and is
    /// zero where either half has no power.
    pub fn calculate_downsampled_fourier_shell_correlation(
        &self,
        avg1: &Volume<Complex64>,
        avg2: &Volume<Complex64>,
    ) -> Result<Vec<f64>> {
        if !avg1.same_geometry(avg2) {
            return Err(BackprojectorError::DimensionMismatch(format!(
                "averages of shape {:?} and {:?} cannot be correlated",
                avg1.shape(),
                avg2.shape()
            )));
        }
        let shells = self.grid.shell_count();
        let r_max = self.grid.r_max as f64;
        let mut num = vec![0.0; shells];
        let mut den1 = vec![0.0; shells];
        let mut den2 = vec![0.0; shells];

        for (index, a1) in avg1.iter_logical() {
            let [k, i, j] = index;
            let r = ((k * k + i * i + j * j) as f64).sqrt();
            if r > r_max {
                continue;
            }
            let shell = r.round() as usize;
            if shell >= shells {
                continue;
            }
            let a2 = avg2[index];
            num[shell] += (a1.conj() * a2).re;
            den1[shell] += a1.norm_sqr();
            den2[shell] += a2.norm_sqr();
        }

        Ok((0..shells)
            .map(|s| {
                let den = (den1[s] * den2[s]).sqrt();
                if den > 0.0 {
                    num[s] / den
                } else {
                    0.0
                }
            })
            .collect())
    }
}
