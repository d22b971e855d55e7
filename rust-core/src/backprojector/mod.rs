// Backprojector module: gridding accumulator and Fourier-space reconstructor
// This module accumulates rotated Fourier slices with their weights and turns them into a real-space map

// ======================== MODULE DECLARATIONS ========================
pub mod averages;
pub mod backprojector;
pub mod enforce;
pub mod insertion;
pub mod interpolation;
pub mod lowres;
pub mod preweight;
pub mod reconstruct;

// Test modules
mod _tests_averages;
mod _tests_insertion;

// ======================== ACCUMULATOR ========================
pub use backprojector::BackProjector; // struct - Fourier grid + weight grid + blob table + symmetry list
// BackProjector impl methods:
//   new(config: BackProjectorConfig) -> Result<Self>                 - parse symmetry, tabulate blob
//   initialise_data_and_weight(current_size: Option<usize>) -> Result<()> - size and zero both grids
//   init_zeros(current_size: Option<usize>) -> Result<()>             - zero both grids, reallocating if needed
//   accumulate(&mut self, other: &BackProjector) -> Result<()>        - element-wise sum of two accumulators
//   clear(&mut self)                                                  - release both grids, back to accumulating
//   create_transformer(&self) -> FourierTransformer                   - FFT plans for the padded box

// ======================== INSERTION ========================
// BackProjector insertion methods (insertion.rs):
//   set_fourier_transform(img: &ArrayD<Complex64>, a, inv, weights) -> Result<()> - dispatch on dimensionality
//   backrotate_2d(img: &Array2<Complex64>, a, inv, weights) -> Result<()>       - 2D image into a 2D reference
//   backproject(img: &Array2<Complex64>, a, inv, weights) -> Result<()>         - 2D slice into a 3D reference
//   backrotate_3d(img: &Array3<Complex64>, a, inv, weights) -> Result<()>       - 3D transform into a 3D reference
pub use interpolation::{
    sample_trilinear, // fn(vol: &Volume<T>, point: Vector3<f64>) -> T - trilinear read with Hermitian fold
    splat_nearest,    // fn(...) - nearest-neighbour insertion with Hermitian fold
    splat_trilinear,  // fn(...) - trilinear insertion with Hermitian fold
};

// ======================== ENFORCEMENT ========================
pub use enforce::{
    enforce_hermitian_symmetry, // fn(data: &mut Volume<Complex64>, weight: &mut Volume<f64>) -> Result<()> - repair the x = 0 plane
    symmetrise,                 // fn(data, weight, max_r2, symmetry: &SymList) -> Result<()> - point-group average
};
// BackProjector enforcement methods (enforce.rs), run in this order before reconstruction:
//   enforce_hermitian_symmetry(&mut self) -> Result<()> - complete the x = 0 plane
//   symmetrise(&mut self) -> Result<()>                 - apply the point group within the support

// ======================== RECONSTRUCTION ========================
pub use reconstruct::{
    ReconstructParams,     // struct - iteration count, MAP switches, normalisation, thread count
    ReconstructionReport,  // struct - preweight iterations, residual and warnings
    ReconstructionWarning, // enum - SingularWeight, NonConvergentPreweight
    ShellArrays,           // struct - caller-owned tau2 / sigma2 / evidence / fsc shell arrays
};
pub use preweight::Preweighting; // struct - gridding preweight factors and convergence information
