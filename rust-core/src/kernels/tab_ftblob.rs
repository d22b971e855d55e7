use serde::{Deserialize, Serialize};

use crate::config::BLOB_TABLE_RANGE;
use crate::kernels::bessel::kaiser_fourier_value;
use crate::Result;

/// Tabulated Fourier transform of a Kaiser-Bessel blob.
///
/// Samples cover the normalised real-space radius `[0, 0.5)`; lookups at or beyond 0.5
/// return zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabFtBlob {
    tabulated: Vec<f64>,
    sampling: f64,
    pub radius: f64,
    pub alpha: f64,
    pub order: u32,
}

impl TabFtBlob {
    /// Tabulate `nr_elem` samples of a blob of the given radius (padded Fourier pixels),
    /// taper `alpha` and order (0 or 2).
    pub fn new(radius: f64, alpha: f64, order: u32, nr_elem: usize) -> Result<Self> {
        let nr_elem = nr_elem.max(1);
        let sampling = BLOB_TABLE_RANGE / nr_elem as f64;
        let tabulated = (0..nr_elem)
            .map(|i| kaiser_fourier_value(i as f64 * sampling, radius, alpha, order))
            .collect::<Result<Vec<f64>>>()?;

        Ok(Self {
            tabulated,
            sampling,
            radius,
            alpha,
            order,
        })
    }

    /// Blob transform at normalised radius `rval`
    #[inline]
    pub fn value(&self, rval: f64) -> f64 {
        let rval = rval.abs();
        if rval >= BLOB_TABLE_RANGE {
            return 0.0;
        }
        let idx = (rval / self.sampling) as usize;
        self.tabulated.get(idx).copied().unwrap_or(0.0)
    }

    /// Blob transform scaled to 1 at the origin
    #[inline]
    pub fn normalised(&self, rval: f64) -> f64 {
        let center = self.tabulated[0];
        if center == 0.0 {
            0.0
        } else {
            self.value(rval) / center
        }
    }

    pub fn len(&self) -> usize {
        self.tabulated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabulated.is_empty()
    }

    pub fn sampling(&self) -> f64 {
        self.sampling
    }
}
