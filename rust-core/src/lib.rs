//! Fourier-space backprojection library
//!
//! This library accumulates rotated Fourier slices of cryo-EM particle images into a padded,
//! half-Hermitian Fourier volume and reconstructs a real-space density map from it through
//! iterative gridding preweighting and a Wiener-like (MAP) filter.

pub mod backprojector;
pub mod config;
pub mod error;
pub mod fft;
pub mod grid;
pub mod interfaces;
pub mod kernels;
pub mod symmetries;

pub use backprojector::{BackProjector, ReconstructParams, ReconstructionReport, ShellArrays};
pub use config::BackProjectorConfig;
pub use error::BackprojectorError;

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, BackprojectorError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
