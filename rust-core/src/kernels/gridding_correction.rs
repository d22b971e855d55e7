use std::f64::consts::PI;

use crate::interfaces::Interpolator;

/// Real-space footprint of the insertion kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GriddingKernel {
    /// Pure nearest-neighbour insertion
    Sinc,
    /// Trilinear insertion, also used when nearest neighbour only covers the low frequencies
    SincSquared,
}

impl GriddingKernel {
    pub fn for_interpolator(interpolator: Interpolator) -> Self {
        match interpolator {
            Interpolator::Nearest => GriddingKernel::Sinc,
            Interpolator::Trilinear => GriddingKernel::SincSquared,
        }
    }
}

/// Real-space profile of the kernel at normalised radius `rval = r / pad_size`
#[inline]
pub fn gridding_profile(kernel: GriddingKernel, rval: f64) -> f64 {
    let x = PI * rval;
    let sinc = if x.abs() < 1e-12 { 1.0 } else { x.sin() / x };
    match kernel {
        GriddingKernel::Sinc => sinc,
        GriddingKernel::SincSquared => sinc * sinc,
    }
}
