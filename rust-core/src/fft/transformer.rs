use std::sync::Arc;

use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayViewMut2, Axis};
use num_complex::Complex64;
use num_traits::Zero;
use rustfft::{Fft, FftDirection, FftPlanner};

use crate::error::BackprojectorError;
use crate::Result;

/// Plans for one direction, one entry per axis (`None` for axes of length 1)
type AxisPlans = [Option<Arc<dyn Fft<f64>>>; 3];

/// Complex FFT of a `(nz, ny, nx)` box.
///
/// The forward transform is unnormalised; the inverse divides by the number of elements,
/// so `inverse(forward(x)) == x`. Lanes are transformed in parallel on the current rayon
/// pool.
pub struct FourierTransformer {
    shape: [usize; 3],
    forward: AxisPlans,
    inverse: AxisPlans,
}

impl FourierTransformer {
    pub fn new(shape: [usize; 3]) -> Self {
        let mut planner = FftPlanner::new();
        let mut plan = |direction: FftDirection| -> AxisPlans {
            let mut plans: AxisPlans = [None, None, None];
            for (axis, &len) in shape.iter().enumerate() {
                if len > 1 {
                    plans[axis] = Some(planner.plan_fft(len, direction));
                }
            }
            plans
        };
        let forward = plan(FftDirection::Forward);
        let inverse = plan(FftDirection::Inverse);

        Self {
            shape,
            forward,
            inverse,
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Total number of elements of the box
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A zero-filled box of the transform shape
    pub fn zeros(&self) -> Array3<Complex64> {
        Array3::zeros((self.shape[0], self.shape[1], self.shape[2]))
    }

    /// In-place forward transform
    pub fn forward(&self, data: &mut Array3<Complex64>) -> Result<()> {
        self.check_shape(data)?;
        transform(data, &self.forward);
        Ok(())
    }

    /// In-place inverse transform, normalised
    pub fn inverse(&self, data: &mut Array3<Complex64>) -> Result<()> {
        self.check_shape(data)?;
        transform(data, &self.inverse);
        let scale = 1.0 / self.len() as f64;
        data.par_mapv_inplace(|v| v * scale);
        Ok(())
    }

    fn check_shape(&self, data: &Array3<Complex64>) -> Result<()> {
        let (z, y, x) = data.dim();
        if [z, y, x] != self.shape {
            return Err(BackprojectorError::DimensionMismatch(format!(
                "transformer planned for {:?}, got array of shape {:?}",
                self.shape,
                [z, y, x]
            )));
        }
        Ok(())
    }
}

fn transform(data: &mut Array3<Complex64>, plans: &AxisPlans) {
    // Rows and columns within each z-slab
    if plans[1].is_some() || plans[2].is_some() {
        data.axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|mut slab| {
                if let Some(fft) = &plans[2] {
                    transform_lanes(slab.view_mut(), Axis(1), fft);
                }
                if let Some(fft) = &plans[1] {
                    transform_lanes(slab.view_mut(), Axis(0), fft);
                }
            });
    }
    if let Some(fft) = &plans[0] {
        data.axis_iter_mut(Axis(1))
            .into_par_iter()
            .for_each(|slab| transform_lanes(slab, Axis(0), fft));
    }
}

fn transform_lanes(mut view: ArrayViewMut2<Complex64>, axis: Axis, fft: &Arc<dyn Fft<f64>>) {
    let mut buffer = vec![Complex64::zero(); view.len_of(axis)];
    let mut scratch = vec![Complex64::zero(); fft.get_inplace_scratch_len()];
    for mut lane in view.lanes_mut(axis) {
        for (b, v) in buffer.iter_mut().zip(lane.iter()) {
            *b = *v;
        }
        fft.process_with_scratch(&mut buffer, &mut scratch);
        for (v, b) in lane.iter_mut().zip(buffer.iter()) {
            *v = *b;
        }
    }
}
