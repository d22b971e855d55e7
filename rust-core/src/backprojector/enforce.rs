use log::debug;
use nalgebra::Vector3;
use ndarray::Zip;
use num_complex::Complex64;

use crate::backprojector::backprojector::BackProjector;
use crate::backprojector::interpolation::sample_trilinear;
use crate::error::BackprojectorError;
use crate::grid::Volume;
use crate::symmetries::SymList;
use crate::Result;

fn check_pair(data: &Volume<Complex64>, weight: &Volume<f64>) -> Result<()> {
    if data.same_geometry(weight) {
        Ok(())
    } else {
        Err(BackprojectorError::DimensionMismatch(format!(
            "data grid {:?} at {:?} and weight grid {:?} at {:?} differ",
            data.shape(),
            data.origin(),
            weight.shape(),
            weight.origin()
        )))
    }
}

/// Make the `x = 0` plane Hermitian: `D(-k, -i, 0) = conj(D(k, i, 0))`.
///
/// Insertion splits the contributions to a voxel of this plane between the voxel and its
/// partner, so each pair is replaced by the (conjugated) sum of both; weights are summed
/// the same way. The origin keeps its weight and loses its imaginary part.
pub fn enforce_hermitian_symmetry(
    data: &mut Volume<Complex64>,
    weight: &mut Volume<f64>,
) -> Result<()> {
    check_pair(data, weight)?;
    let (k_first, k_last) = data.logical_range(0);
    let (i_first, i_last) = data.logical_range(1);

    for k in k_first.max(0)..=k_last {
        for i in i_first..=i_last {
            // Visit each pair once
            if k == 0 && i <= 0 {
                continue;
            }
            if !data.contains(-k, -i, 0) {
                continue;
            }
            let sum = data[[k, i, 0]] + data[[-k, -i, 0]].conj();
            data[[k, i, 0]] = sum;
            data[[-k, -i, 0]] = sum.conj();

            let wsum = weight[[k, i, 0]] + weight[[-k, -i, 0]];
            weight[[k, i, 0]] = wsum;
            weight[[-k, -i, 0]] = wsum;
        }
    }

    if let Some(origin) = data.get_mut(0, 0, 0) {
        *origin = Complex64::new(origin.re, 0.0);
    }
    Ok(())
}

/// Average data and weights over the point group.
///
/// Every voxel within `max_r2` receives the trilinear reads at all its symmetry-related
/// positions, taken from an unmodified copy of the grids. The `x = 0` plane is read at
/// rotated positions and must already be complete, see [`enforce_hermitian_symmetry`].
pub fn symmetrise(
    data: &mut Volume<Complex64>,
    weight: &mut Volume<f64>,
    max_r2: isize,
    symmetry: &SymList,
) -> Result<()> {
    check_pair(data, weight)?;
    if symmetry.is_empty() {
        return Ok(());
    }
    let data_snapshot = data.clone();
    let weight_snapshot = weight.clone();
    let origin = data.origin();

    Zip::indexed(data.array_mut())
        .and(weight.array_mut())
        .par_for_each(|(a, b, c), d, w| {
            let k = a as isize + origin[0];
            let i = b as isize + origin[1];
            let j = c as isize + origin[2];
            if k * k + i * i + j * j > max_r2 {
                return;
            }
            let v = Vector3::new(j as f64, i as f64, k as f64);
            for op in symmetry.iter() {
                let p = op.apply(v);
                *d += sample_trilinear(&data_snapshot, p);
                *w += sample_trilinear(&weight_snapshot, p);
            }
        });
    Ok(())
}

impl BackProjector {
    /// Repair Hermitian symmetry of the `x = 0` plane of both grids
    pub fn enforce_hermitian_symmetry(&mut self) -> Result<()> {
        enforce_hermitian_symmetry(&mut self.grid.data, &mut self.weight)
    }

    /// Apply the point group to both grids within the support.
    ///
    /// 2D references have no meaningful point group beyond c1 and are left untouched.
    pub fn symmetrise(&mut self) -> Result<()> {
        if self.symmetry.is_empty() {
            return Ok(());
        }
        if self.grid.ref_dim == 2 {
            debug!("Skipping symmetrisation of a 2D reference");
            return Ok(());
        }
        debug!(
            "Symmetrising with {} additional operators",
            self.symmetry.len()
        );
        let max_r2 = self.grid.max_r2();
        symmetrise(&mut self.grid.data, &mut self.weight, max_r2, &self.symmetry)
    }
}
