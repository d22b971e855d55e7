// Grid module: centered multidimensional arrays and the padded half-Hermitian Fourier grid
// This module provides the storage every other component reads from and writes into

// ======================== MODULE DECLARATIONS ========================
pub mod fourier_grid;
pub mod volume;


// ======================== CENTERED ARRAYS ========================
pub use volume::{
    Hermitian, // trait - value with a Hermitian partner (conjugate for complex, identity for real)
    Volume,    // struct - 3D array addressed by signed logical indices (k, i, j)
    fftw_frequency, // fn(index: usize, size: usize) -> isize - logical frequency of an FFTW-layout index
};
// Volume impl methods:
//   zeros(shape, origin) -> Self                    - zero-filled array with a given logical origin
//   half_hermitian(radius, ndim) -> Self            - kp, ip in [-r, r], jp in [0, r]
//   centered(size, ndim) -> Self                    - real-space box with origin at size/2
//   get(k, i, j) / get_mut(k, i, j)                 - checked logical access
//   iter_logical() -> impl Iterator<([isize; 3], &T)> - logical index with value

// ======================== FOURIER GRID ========================
pub use fourier_grid::FourierGrid; // struct - padded half-Hermitian complex grid plus geometry constants
