use nalgebra::{Matrix3, Vector3};
use ndarray::{Array2, Array3, ArrayD, Ix2, Ix3};
use num_complex::Complex64;

use crate::backprojector::backprojector::BackProjector;
use crate::backprojector::interpolation::{splat_nearest, splat_trilinear};
use crate::error::BackprojectorError;
use crate::grid::fftw_frequency;
use crate::interfaces::Interpolator;
use crate::Result;

/// A source sample ready to be placed on the grid
struct Sample {
    /// Logical source frequency (x, y, z)
    frequency: Vector3<f64>,
    value: Complex64,
    weight: f64,
}

impl BackProjector {
    /// Insert a 2D or 3D Fourier transform in FFTW half layout.
    ///
    /// 3D inputs are back-rotated into a 3D reference; 2D inputs are back-rotated into a 2D
    /// reference or back-projected as a central slice into a 3D reference. `a` is the
    /// orientation (only its upper-left 2x2 block for 2D references), `inv` applies its
    /// inverse instead, and `weights` (same shape as `img`) replaces the unit weight.
    pub fn set_fourier_transform(
        &mut self,
        img: &ArrayD<Complex64>,
        a: &Matrix3<f64>,
        inv: bool,
        weights: Option<&ArrayD<f64>>,
    ) -> Result<()> {
        if let Some(w) = weights {
            if w.shape() != img.shape() {
                return Err(BackprojectorError::DimensionMismatch(format!(
                    "weights of shape {:?} do not match image of shape {:?}",
                    w.shape(),
                    img.shape()
                )));
            }
        }

        match img.ndim() {
            3 => {
                if self.grid.ref_dim != 3 {
                    return Err(BackprojectorError::DimensionMismatch(
                        "a 3D Fourier transform can only be inserted into a 3D reference"
                            .to_string(),
                    ));
                }
                let img = to_dim::<_, Ix3>(img)?;
                let weights = weights.map(to_dim::<_, Ix3>).transpose()?;
                self.backrotate_3d(&img, a, inv, weights.as_ref())
            }
            2 => {
                let img = to_dim::<_, Ix2>(img)?;
                let weights = weights.map(to_dim::<_, Ix2>).transpose()?;
                if self.grid.ref_dim == 2 {
                    self.backrotate_2d(&img, a, inv, weights.as_ref())
                } else {
                    self.backproject(&img, a, inv, weights.as_ref())
                }
            }
            n => Err(BackprojectorError::DimensionMismatch(format!(
                "Fourier transforms must be 2D or 3D, got {} dimensions",
                n
            ))),
        }
    }

    /// In-plane rotation of a 2D Fourier transform into a 2D reference
    pub fn backrotate_2d(
        &mut self,
        img: &Array2<Complex64>,
        a: &Matrix3<f64>,
        inv: bool,
        weights: Option<&Array2<f64>>,
    ) -> Result<()> {
        self.require_ref_dim(2, "backrotate_2d")?;
        let mut m = orientation(a, inv);
        // Only the in-plane block acts on a 2D reference
        m[(0, 2)] = 0.0;
        m[(1, 2)] = 0.0;
        m[(2, 0)] = 0.0;
        m[(2, 1)] = 0.0;
        m[(2, 2)] = 0.0;
        let samples = samples_2d(img, weights, self.grid.r_max)?;
        self.insert_samples(samples, &m);
        Ok(())
    }

    /// Central-slice insertion of a 2D Fourier transform into a 3D reference
    pub fn backproject(
        &mut self,
        img: &Array2<Complex64>,
        a: &Matrix3<f64>,
        inv: bool,
        weights: Option<&Array2<f64>>,
    ) -> Result<()> {
        self.require_ref_dim(3, "backproject")?;
        let m = orientation(a, inv);
        let samples = samples_2d(img, weights, self.grid.r_max)?;
        self.insert_samples(samples, &m);
        Ok(())
    }

    /// Rotation of a 3D Fourier transform into a 3D reference
    pub fn backrotate_3d(
        &mut self,
        img: &Array3<Complex64>,
        a: &Matrix3<f64>,
        inv: bool,
        weights: Option<&Array3<f64>>,
    ) -> Result<()> {
        self.require_ref_dim(3, "backrotate_3d")?;
        let m = orientation(a, inv);
        let samples = samples_3d(img, weights, self.grid.r_max)?;
        self.insert_samples(samples, &m);
        Ok(())
    }

    fn require_ref_dim(&self, ref_dim: usize, operation: &str) -> Result<()> {
        self.ensure_accumulating()?;
        if self.grid.ref_dim != ref_dim {
            return Err(BackprojectorError::DimensionMismatch(format!(
                "{} needs a {}D reference, this backprojector holds a {}D one",
                operation, ref_dim, self.grid.ref_dim
            )));
        }
        Ok(())
    }

    fn insert_samples(&mut self, samples: impl Iterator<Item = Sample>, m: &Matrix3<f64>) {
        let scale = self.grid.padding_factor as f64;
        let max_r2 = self.grid.max_r2();
        let r_min_nn2 = (self.grid.r_min_nn * self.grid.r_min_nn) as f64;
        let always_nearest = self.grid.interpolator == Interpolator::Nearest;

        for sample in samples {
            let target = m * sample.frequency * scale;
            let nearest = always_nearest || sample.frequency.norm_squared() < r_min_nn2;
            if nearest {
                splat_nearest(
                    &mut self.grid.data,
                    &mut self.weight,
                    target,
                    sample.value,
                    sample.weight,
                    max_r2,
                );
            } else {
                splat_trilinear(
                    &mut self.grid.data,
                    &mut self.weight,
                    target,
                    sample.value,
                    sample.weight,
                    max_r2,
                );
            }
        }
    }
}

fn orientation(a: &Matrix3<f64>, inv: bool) -> Matrix3<f64> {
    // Orientations are rotations, their inverse is the transpose
    if inv {
        a.transpose()
    } else {
        *a
    }
}

fn to_dim<T: Clone, D: ndarray::Dimension>(array: &ArrayD<T>) -> Result<ndarray::Array<T, D>> {
    array.clone().into_dimensionality::<D>().map_err(|e| {
        BackprojectorError::DimensionMismatch(format!(
            "unexpected array shape {:?}: {}",
            array.shape(),
            e
        ))
    })
}

fn check_half_layout(shape: &[usize]) -> Result<()> {
    let n = shape[0];
    let last = shape[shape.len() - 1];
    let square = shape[..shape.len() - 1].iter().all(|&s| s == n);
    if n == 0 || !square || last != n / 2 + 1 {
        return Err(BackprojectorError::DimensionMismatch(format!(
            "expected an FFTW half layout (n, .., n/2+1), got {:?}",
            shape
        )));
    }
    Ok(())
}

fn check_weights<D: ndarray::Dimension>(shape: &[usize], weights: Option<&ndarray::Array<f64, D>>) -> Result<()> {
    match weights {
        Some(w) if w.shape() != shape => Err(BackprojectorError::DimensionMismatch(format!(
            "weights of shape {:?} do not match image of shape {:?}",
            w.shape(),
            shape
        ))),
        _ => Ok(()),
    }
}

/// Samples of a 2D half transform inside `r_max`.
///
/// The `x = 0` column stores both `y` and `-y`; only `y ≥ 0` is kept.
fn samples_2d<'a>(
    img: &'a Array2<Complex64>,
    weights: Option<&'a Array2<f64>>,
    r_max: usize,
) -> Result<impl Iterator<Item = Sample> + 'a> {
    check_half_layout(img.shape())?;
    check_weights(img.shape(), weights)?;
    let n = img.nrows();
    let r_max2 = (r_max * r_max) as isize;

    Ok(img.indexed_iter().filter_map(move |((i, j), value)| {
        let ip = fftw_frequency(i, n);
        let jp = j as isize;
        if jp == 0 && ip < 0 {
            return None;
        }
        if ip * ip + jp * jp > r_max2 {
            return None;
        }
        let weight = weights.map_or(1.0, |w| w[[i, j]]);
        if weight <= 0.0 {
            return None;
        }
        Some(Sample {
            frequency: Vector3::new(jp as f64, ip as f64, 0.0),
            value: *value,
            weight,
        })
    }))
}

/// Samples of a 3D half transform inside `r_max`
fn samples_3d<'a>(
    img: &'a Array3<Complex64>,
    weights: Option<&'a Array3<f64>>,
    r_max: usize,
) -> Result<impl Iterator<Item = Sample> + 'a> {
    check_half_layout(img.shape())?;
    check_weights(img.shape(), weights)?;
    let n = img.shape()[0];
    let r_max2 = (r_max * r_max) as isize;

    Ok(img.indexed_iter().filter_map(move |((k, i, j), value)| {
        let kp = fftw_frequency(k, n);
        let ip = fftw_frequency(i, n);
        let jp = j as isize;
        // The x = 0 plane holds both members of each pair; keep one
        if jp == 0 && (kp < 0 || (kp == 0 && ip < 0)) {
            return None;
        }
        if kp * kp + ip * ip + jp * jp > r_max2 {
            return None;
        }
        let weight = weights.map_or(1.0, |w| w[[k, i, j]]);
        if weight <= 0.0 {
            return None;
        }
        Some(Sample {
            frequency: Vector3::new(jp as f64, ip as f64, kp as f64),
            value: *value,
            weight,
        })
    }))
}
