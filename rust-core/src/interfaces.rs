// Definitions that are used throughout all modules

use serde::{Deserialize, Serialize};

/// Interpolation kernel used to splat samples onto the Fourier grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolator {
    Nearest,
    Trilinear,
}

/// Lifecycle of the accumulator grids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    /// Grids accept insertions
    Accumulating,
    /// A reconstruction has modified the grids in place
    Consumed,
}

/// How the gridding preweight is obtained.
///
/// Half-map reconstructions run the full Pipe–Menon iteration. Whole-map reconstructions
/// (both halves joined) either run half of the iterations or replace the iteration by a
/// direct division by the weights; both also convert half-map FSC values into whole-map
/// values before deriving tau2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PreweightMode {
    #[default]
    HalfMap,
    WholeMapHalvedIterations,
    WholeMapSkipPreweight,
}

impl PreweightMode {
    pub fn is_whole_map(&self) -> bool {
        !matches!(self, PreweightMode::HalfMap)
    }
}
