// FFT module: multidimensional complex transforms and FFTW-layout index helpers
// This module moves data between the centered half-Hermitian grids and the full FFT box

// ======================== MODULE DECLARATIONS ========================
pub mod layout;
pub mod transformer;

// Test modules
mod _tests_layout;
mod _tests_transformer;

// ======================== TRANSFORMS ========================
pub use transformer::FourierTransformer; // struct - cached 1D plans for a (nz, ny, nx) box
// FourierTransformer impl methods:
//   new(shape: [usize; 3]) -> Self                              - plan forward and inverse transforms
//   forward(&self, data: &mut Array3<Complex64>) -> Result<()>  - unnormalised forward transform
//   inverse(&self, data: &mut Array3<Complex64>) -> Result<()>  - inverse transform scaled by 1/N

// ======================== LAYOUT ========================
pub use layout::{
    cube_frequency, // fn(index: usize, size: usize) -> isize - signed frequency of a full-box index
    cube_index,     // fn(frequency: isize, size: usize) -> usize - full-box index of a signed frequency
    decenter,       // fn(src: &Volume<T>, dst: &mut Array3<U>, max_r2, convert) - half grid to full box
    recenter,       // fn(src: &Array3<U>, dst: &mut Volume<T>, max_r2, convert) - full box to half grid
};
