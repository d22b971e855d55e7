// Kernels module: Kaiser-Bessel blob tables and real-space correction profiles
// This module provides the convolution kernels used while preweighting and correcting the reconstruction

// ======================== MODULE DECLARATIONS ========================
pub mod bessel;
pub mod gridding_correction;
pub mod tab_ftblob;


// ======================== BESSEL FUNCTIONS ========================
pub use bessel::{
    bessel_i0,            // fn(x: f64) -> f64 - modified Bessel function of the first kind, order 0
    bessel_over_power,    // fn(nu: HalfOrder, x: f64, modified: bool) -> f64 - X_nu(x) / x^nu
    kaiser_fourier_value, // fn(w, a, alpha, m) -> Result<f64> - Fourier transform of a Kaiser-Bessel blob
    HalfOrder,            // enum - supported half-integer orders (3/2, 7/2)
};

// ======================== BLOB TABLE ========================
pub use tab_ftblob::TabFtBlob; // struct - tabulated FT-blob over normalised radius [0, 0.5)
// TabFtBlob impl methods:
//   new(radius, alpha, order, nr_elem) -> Result<Self> - tabulate the blob
//   value(&self, rval: f64) -> f64                     - table lookup, 0 for |rval| >= 0.5
//   normalised(&self, rval: f64) -> f64                - value(rval) / value(0)

// ======================== GRIDDING CORRECTION ========================
pub use gridding_correction::{
    GriddingKernel,    // enum - Sinc (nearest neighbour) or SincSquared (trilinear)
    gridding_profile,  // fn(kernel, rval) -> f64 - real-space profile of the insertion kernel
};
