use thiserror::Error;

/// Errors surfaced by the backprojector.
///
/// Only fatal conditions are represented here. Recoverable conditions of a reconstruction
/// (empty resolution shells, a preweighting that did not reach its tolerance) are reported
/// through [`crate::backprojector::ReconstructionReport`] instead.
#[derive(Debug, Error)]
pub enum BackprojectorError {
    /// Input dimensionality or shape is incompatible with the accumulator geometry
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A requested size or radius lies outside the Fourier support
    #[error("out of support: {0}")]
    OutOfSupport(String),

    /// The point-group symbol could not be interpreted
    #[error("unknown symmetry group `{0}`")]
    UnknownSymmetry(String),

    /// A parameter is outside its valid range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The accumulator was consumed by a reconstruction and must be re-initialised
    #[error("invalid accumulator state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
