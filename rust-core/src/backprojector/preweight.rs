use log::{debug, warn};
use ndarray::{Array3, Zip};
use num_complex::Complex64;

use crate::config::{PREWEIGHT_TOLERANCE, WEIGHT_EPSILON};
use crate::fft::{cube_frequency, decenter, recenter, FourierTransformer};
use crate::grid::{FourierGrid, Volume};
use crate::kernels::TabFtBlob;
use crate::Result;

/// Gridding preweight `F` on the half grid, so that `(F·W) ∗ blob ≈ 1` on the support.
#[derive(Debug, Clone)]
pub struct Preweighting {
    pub factors: Volume<f64>,
    /// Iterations actually run
    pub iterations: usize,
    /// `max |C - 1|` over the weighted voxels of the inner half of the support, last iteration
    pub residual: Option<f64>,
}

impl Preweighting {
    pub fn converged(&self) -> bool {
        self.residual.map_or(true, |r| r <= PREWEIGHT_TOLERANCE)
    }
}

/// Pipe-Menon style iteration: `F ← F / |(F·W) ∗ blob|` on the support, starting from `F = 1`.
///
/// The convolution is done by multiplying the inverse transform of `F·W` with the
/// normalised blob transform and transforming back. Voxels without weight do not take part
/// in the residual since `F` has no effect there.
pub fn iterate_preweight(
    weight: &Volume<f64>,
    grid: &FourierGrid,
    blob: &TabFtBlob,
    transformer: &FourierTransformer,
    max_iter: usize,
) -> Result<Preweighting> {
    let max_r2 = grid.max_r2();
    let inner = grid.support_radius() as isize / 2;
    let inner_r2 = inner * inner;

    let mut factors = unit_on_support(weight, max_r2);
    let mut cube = transformer.zeros();
    let mut convolved: Volume<Complex64> = Volume::zeros(weight.shape(), weight.origin());
    let mut residual = None;

    for iter in 0..max_iter {
        let mut product = factors.clone();
        Zip::from(product.array_mut())
            .and(weight.array())
            .par_for_each(|f, &w| *f *= w);

        decenter(&product, &mut cube, max_r2, |v| Complex64::new(v, 0.0));
        convolve_with_blob(&mut cube, blob, grid.pad_size, transformer)?;
        recenter(&cube, &mut convolved, max_r2, |c| c);

        let mut max_deviation: f64 = 0.0;
        for (index, c) in convolved.iter_logical() {
            let [k, i, j] = index;
            let r2 = k * k + i * i + j * j;
            if r2 > max_r2 {
                continue;
            }
            if r2 <= inner_r2 && weight[index] > 0.0 {
                max_deviation = max_deviation.max((*c - 1.0).norm());
            }
        }
        residual = Some(max_deviation);
        debug!("Preweight iteration {}: interior residual {:.3e}", iter + 1, max_deviation);

        let origin = factors.origin();
        Zip::indexed(factors.array_mut())
            .and(convolved.array())
            .par_for_each(|(a, b, c), f, conv| {
                let k = a as isize + origin[0];
                let i = b as isize + origin[1];
                let j = c as isize + origin[2];
                *f = if k * k + i * i + j * j > max_r2 {
                    0.0
                } else {
                    *f / conv.norm().max(WEIGHT_EPSILON)
                };
            });
    }

    let result = Preweighting {
        factors,
        iterations: max_iter,
        residual,
    };
    if !result.converged() {
        warn!(
            "Gridding preweight did not converge after {} iterations (residual {:.3e})",
            max_iter,
            residual.unwrap_or(0.0)
        );
    }
    Ok(result)
}

/// Direct inverse of the weights, `F = 1 / max(W, ε)` on the support
pub fn inverse_weight(weight: &Volume<f64>, max_r2: isize) -> Preweighting {
    let mut factors = weight.clone();
    let origin = factors.origin();
    Zip::indexed(factors.array_mut()).par_for_each(|(a, b, c), f| {
        let k = a as isize + origin[0];
        let i = b as isize + origin[1];
        let j = c as isize + origin[2];
        *f = if k * k + i * i + j * j > max_r2 {
            0.0
        } else {
            1.0 / f.max(WEIGHT_EPSILON)
        };
    });
    Preweighting {
        factors,
        iterations: 0,
        residual: None,
    }
}

/// `F = 1` on the support, zero elsewhere
pub fn unit_on_support(weight: &Volume<f64>, max_r2: isize) -> Volume<f64> {
    let mut factors: Volume<f64> = Volume::zeros(weight.shape(), weight.origin());
    let origin = factors.origin();
    Zip::indexed(factors.array_mut()).par_for_each(|(a, b, c), f| {
        let k = a as isize + origin[0];
        let i = b as isize + origin[1];
        let j = c as isize + origin[2];
        if k * k + i * i + j * j <= max_r2 {
            *f = 1.0;
        }
    });
    factors
}

/// Convolve a full Fourier box with the blob by multiplication in real space
pub fn convolve_with_blob(
    cube: &mut Array3<Complex64>,
    blob: &TabFtBlob,
    pad_size: usize,
    transformer: &FourierTransformer,
) -> Result<()> {
    transformer.inverse(cube)?;
    let (nz, ny, nx) = cube.dim();
    let pad = pad_size as f64;
    Zip::indexed(cube.view_mut()).par_for_each(|(k, i, j), v| {
        let z = cube_frequency(k, nz) as f64;
        let y = cube_frequency(i, ny) as f64;
        let x = cube_frequency(j, nx) as f64;
        let rval = (z * z + y * y + x * x).sqrt() / pad;
        *v *= blob.normalised(rval);
    });
    transformer.forward(cube)
}
