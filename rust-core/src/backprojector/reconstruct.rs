use log::{debug, info, warn};
use ndarray::Zip;
use serde::{Deserialize, Serialize};

use crate::backprojector::backprojector::BackProjector;
use crate::backprojector::preweight::{inverse_weight, iterate_preweight, Preweighting};
use crate::config::{
    EMPTY_SHELL_EVIDENCE, FSC_MAX, FSC_MIN, MAP_EPSILON, ZERO_TAU2_PRIOR,
};
use crate::error::BackprojectorError;
use crate::fft::{cube_index, decenter, FourierTransformer};
use crate::grid::Volume;
use crate::interfaces::{AccumulatorState, PreweightMode};
use crate::kernels::{gridding_profile, GriddingKernel};
use crate::Result;

/// Parameters of [`BackProjector::reconstruct`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructParams {
    /// Iterations of the gridding preweight
    pub max_iter_preweight: usize,
    /// Regularise the weights with the signal spectrum (Wiener / MAP filter)
    pub do_map: bool,
    pub tau2_fudge: f64,
    /// The output is divided by this value
    pub normalise: f64,
    /// Derive tau2 from the FSC and re-estimate it from the reconstruction
    pub update_tau2_with_fsc: bool,
    pub map_half: PreweightMode,
    pub nr_threads: usize,
    /// First shell (original units) that is regularised when `do_map` is set
    pub minres_map: usize,
    /// Divide by the real-space profile of the insertion kernel
    pub do_gridding_correction: bool,
}

impl Default for ReconstructParams {
    fn default() -> Self {
        Self {
            max_iter_preweight: 10,
            do_map: false,
            tau2_fudge: 1.0,
            normalise: 1.0,
            update_tau2_with_fsc: false,
            map_half: PreweightMode::HalfMap,
            nr_threads: 1,
            minres_map: 0,
            do_gridding_correction: true,
        }
    }
}

impl ReconstructParams {
    pub fn with_max_iter_preweight(mut self, max_iter: usize) -> Self {
        self.max_iter_preweight = max_iter;
        self
    }

    /// Enable the MAP filter with the given tau2 fudge factor
    pub fn with_map(mut self, tau2_fudge: f64) -> Self {
        self.do_map = true;
        self.tau2_fudge = tau2_fudge;
        self
    }

    pub fn with_minres_map(mut self, minres_map: usize) -> Self {
        self.minres_map = minres_map;
        self
    }

    pub fn with_normalise(mut self, normalise: f64) -> Self {
        self.normalise = normalise;
        self
    }

    pub fn with_fsc_update(mut self) -> Self {
        self.update_tau2_with_fsc = true;
        self
    }

    pub fn with_preweight_mode(mut self, mode: PreweightMode) -> Self {
        self.map_half = mode;
        self
    }

    pub fn with_threads(mut self, nr_threads: usize) -> Self {
        self.nr_threads = nr_threads;
        self
    }

    pub fn with_gridding_correction(mut self, enabled: bool) -> Self {
        self.do_gridding_correction = enabled;
        self
    }
}

/// Caller-owned per-shell arrays, each of length `ori_size/2 + 1`.
///
/// `tau2` is read (and rewritten when tau2 is updated from the FSC), `sigma2` and
/// `evidence_vs_prior` are written.
#[derive(Debug)]
pub struct ShellArrays<'a> {
    pub tau2: &'a mut [f64],
    pub sigma2: &'a mut [f64],
    pub evidence_vs_prior: &'a mut [f64],
    pub fsc: Option<&'a [f64]>,
}

impl<'a> ShellArrays<'a> {
    pub fn new(tau2: &'a mut [f64], sigma2: &'a mut [f64], evidence_vs_prior: &'a mut [f64]) -> Self {
        Self {
            tau2,
            sigma2,
            evidence_vs_prior,
            fsc: None,
        }
    }

    pub fn with_fsc(mut self, fsc: &'a [f64]) -> Self {
        self.fsc = Some(fsc);
        self
    }
}

/// Recoverable conditions met during a reconstruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReconstructionWarning {
    /// Shells whose summed weight vanished; their noise spectrum was set to zero
    SingularWeight { shells: Vec<usize> },
    /// The gridding preweight stayed above its tolerance
    NonConvergentPreweight { iterations: usize, residual: f64 },
}

/// Outcome of [`BackProjector::reconstruct`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionReport {
    /// Preweight iterations run
    pub iterations: usize,
    /// Interior residual of the last preweight iteration, if any ran
    pub residual: Option<f64>,
    pub warnings: Vec<ReconstructionWarning>,
}

impl ReconstructionReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn preweight_converged(&self) -> bool {
        !self
            .warnings
            .iter()
            .any(|w| matches!(w, ReconstructionWarning::NonConvergentPreweight { .. }))
    }
}

/// Per-shell sums over the support
pub(crate) struct ShellStatistics {
    pub(crate) counts: Vec<usize>,
    pub(crate) weight_sums: Vec<f64>,
}

impl BackProjector {
    /// Reconstruct a real-space map from the accumulated data and weights.
    ///
    /// The grids are made Hermitian, symmetrised, optionally regularised, preweighted and
    /// transformed; `vol_out` is resized to `ori_size` in every used dimension with its
    /// origin in the center. The accumulator is consumed: it must be re-initialised before
    /// further insertions.
    pub fn reconstruct(
        &mut self,
        vol_out: &mut Volume<f64>,
        params: &ReconstructParams,
        shells: ShellArrays<'_>,
        transformer: &FourierTransformer,
    ) -> Result<ReconstructionReport> {
        self.ensure_accumulating()?;
        self.validate_reconstruction(params, &shells, transformer)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.nr_threads.max(1))
            .build()?;
        pool.install(|| self.reconstruct_in_pool(vol_out, params, shells, transformer))
    }

    fn validate_reconstruction(
        &self,
        params: &ReconstructParams,
        shells: &ShellArrays<'_>,
        transformer: &FourierTransformer,
    ) -> Result<()> {
        let n = self.grid.shell_count();
        let lengths = [
            ("tau2", shells.tau2.len()),
            ("sigma2", shells.sigma2.len()),
            ("evidence_vs_prior", shells.evidence_vs_prior.len()),
        ];
        for (name, len) in lengths {
            if len != n {
                return Err(BackprojectorError::DimensionMismatch(format!(
                    "{} has {} shells, expected {}",
                    name, len, n
                )));
            }
        }
        match shells.fsc {
            Some(fsc) if fsc.len() != n => {
                return Err(BackprojectorError::DimensionMismatch(format!(
                    "fsc has {} shells, expected {}",
                    fsc.len(),
                    n
                )));
            }
            None if params.update_tau2_with_fsc => {
                return Err(BackprojectorError::InvalidParameter(
                    "updating tau2 from the FSC requires an FSC curve".to_string(),
                ));
            }
            _ => {}
        }
        if transformer.shape() != self.grid.fft_shape() {
            return Err(BackprojectorError::DimensionMismatch(format!(
                "transformer planned for {:?}, padded box is {:?}",
                transformer.shape(),
                self.grid.fft_shape()
            )));
        }
        if !params.normalise.is_finite() || params.normalise == 0.0 {
            return Err(BackprojectorError::InvalidParameter(format!(
                "normalise must be finite and non-zero, got {}",
                params.normalise
            )));
        }
        if !(params.tau2_fudge >= 0.0) {
            return Err(BackprojectorError::InvalidParameter(format!(
                "tau2_fudge must be non-negative, got {}",
                params.tau2_fudge
            )));
        }
        Ok(())
    }

    fn reconstruct_in_pool(
        &mut self,
        vol_out: &mut Volume<f64>,
        params: &ReconstructParams,
        shells: ShellArrays<'_>,
        transformer: &FourierTransformer,
    ) -> Result<ReconstructionReport> {
        info!(
            "Reconstructing {}D map of size {} (padding {}, r_max {}, {} threads)",
            self.grid.ref_dim,
            self.grid.ori_size,
            self.grid.padding_factor,
            self.grid.r_max,
            params.nr_threads.max(1)
        );
        let ShellArrays {
            tau2,
            sigma2,
            evidence_vs_prior,
            fsc,
        } = shells;
        let mut warnings = Vec::new();

        // The x = 0 plane must be complete before it is read at rotated positions
        self.enforce_hermitian_symmetry()?;
        self.symmetrise()?;

        let statistics = self.shell_statistics();
        let singular = fill_sigma2(&statistics, sigma2);
        if !singular.is_empty() {
            warn!("Vanishing weights in shells {:?}, sigma2 set to zero there", singular);
            warnings.push(ReconstructionWarning::SingularWeight {
                shells: singular.clone(),
            });
        }

        let tau2_eff = match fsc {
            Some(fsc) if params.update_tau2_with_fsc => {
                tau2_from_fsc(fsc, sigma2, params, tau2);
                tau2.to_vec()
            }
            _ => tau2.iter().map(|t| params.tau2_fudge * t).collect(),
        };

        self.regularise_weights(params, &tau2_eff, &statistics, &singular, evidence_vs_prior);

        let preweight = self.preweight(params, transformer)?;
        if let (false, Some(residual)) = (preweight.converged(), preweight.residual) {
            warnings.push(ReconstructionWarning::NonConvergentPreweight {
                iterations: preweight.iterations,
                residual,
            });
        }

        Zip::from(self.grid.data.array_mut())
            .and(preweight.factors.array())
            .par_for_each(|d, &f| *d *= f);

        if params.update_tau2_with_fsc {
            self.update_tau2(params.tau2_fudge, tau2);
        }

        self.window_to_real_space(vol_out, params, transformer)?;
        self.state = AccumulatorState::Consumed;

        info!(
            "Reconstruction done: {} preweight iterations, {} warnings",
            preweight.iterations,
            warnings.len()
        );
        Ok(ReconstructionReport {
            iterations: preweight.iterations,
            residual: preweight.residual,
            warnings,
        })
    }

    fn shell_statistics(&self) -> ShellStatistics {
        let n = self.grid.shell_count();
        let os = self.grid.oversampling();
        let max_r2 = self.grid.max_r2();
        let mut counts = vec![0; n];
        let mut weight_sums = vec![0.0; n];

        for (index, &w) in self.weight.iter_logical() {
            let [k, i, j] = index;
            let r2 = k * k + i * i + j * j;
            if r2 > max_r2 {
                continue;
            }
            let shell = self.grid.shell_of(r2);
            counts[shell] += 1;
            weight_sums[shell] += os * w;
        }
        ShellStatistics {
            counts,
            weight_sums,
        }
    }

    /// Add the signal prior to the weights and fill `evidence_vs_prior`
    fn regularise_weights(
        &mut self,
        params: &ReconstructParams,
        tau2_eff: &[f64],
        statistics: &ShellStatistics,
        singular: &[usize],
        evidence_vs_prior: &mut [f64],
    ) {
        let os = self.grid.oversampling();
        let max_r2 = self.grid.max_r2();
        let origin = self.weight.origin();
        let mut evidence = vec![0.0; tau2_eff.len()];

        for ((a, b, c), w) in self.weight.array_mut().indexed_iter_mut() {
            let k = a as isize + origin[0];
            let i = b as isize + origin[1];
            let j = c as isize + origin[2];
            let r2 = k * k + i * i + j * j;
            if r2 > max_r2 {
                continue;
            }
            let shell = self.grid.shell_of(r2);
            let tau2 = tau2_eff[shell];
            if tau2 > 0.0 {
                evidence[shell] += *w * os * tau2;
            }
            if params.do_map && shell >= params.minres_map {
                if tau2 > 0.0 {
                    *w += 1.0 / (os * tau2);
                } else if *w > 0.0 {
                    *w += 1.0 / (ZERO_TAU2_PRIOR * *w);
                }
            }
        }

        for (shell, out) in evidence_vs_prior.iter_mut().enumerate() {
            *out = if shell > self.grid.r_max || singular.contains(&shell) {
                0.0
            } else if statistics.counts[shell] == 0 {
                EMPTY_SHELL_EVIDENCE
            } else {
                evidence[shell] / statistics.counts[shell] as f64
            };
        }
        if params.do_map {
            debug!("Regularised weights from shell {} on", params.minres_map);
        }
    }

    fn preweight(&self, params: &ReconstructParams, transformer: &FourierTransformer) -> Result<Preweighting> {
        let iterations = match params.map_half {
            PreweightMode::HalfMap => params.max_iter_preweight,
            PreweightMode::WholeMapHalvedIterations => params.max_iter_preweight / 2,
            PreweightMode::WholeMapSkipPreweight => {
                return Ok(inverse_weight(&self.weight, self.grid.max_r2()));
            }
        };
        iterate_preweight(&self.weight, &self.grid, &self.tab_ftblob, transformer, iterations)
    }

    /// `tau2[r] = fudge · ⟨|D·F|²⟩_r / (2 · os²)` from the preweighted grid
    fn update_tau2(&self, tau2_fudge: f64, tau2: &mut [f64]) {
        let os = self.grid.oversampling();
        let max_r2 = self.grid.max_r2();
        let mut power = vec![0.0; tau2.len()];
        let mut counts = vec![0usize; tau2.len()];

        for (index, d) in self.grid.data.iter_logical() {
            let [k, i, j] = index;
            let r2 = k * k + i * i + j * j;
            if r2 > max_r2 {
                continue;
            }
            let shell = self.grid.shell_of(r2);
            power[shell] += d.norm_sqr();
            counts[shell] += 1;
        }
        for (shell, t) in tau2.iter_mut().enumerate() {
            *t = if counts[shell] > 0 {
                tau2_fudge * power[shell] / counts[shell] as f64 / (2.0 * os * os)
            } else {
                0.0
            };
        }
    }

    /// Inverse transform of the preweighted grid, windowed to `ori_size` and corrected for
    /// the insertion kernel
    fn window_to_real_space(
        &self,
        vol_out: &mut Volume<f64>,
        params: &ReconstructParams,
        transformer: &FourierTransformer,
    ) -> Result<()> {
        let mut cube = transformer.zeros();
        decenter(&self.grid.data, &mut cube, self.grid.max_r2(), |v| v);
        transformer.inverse(&mut cube)?;

        let ori = self.grid.ori_size;
        let pad = self.grid.pad_size as f64;
        let (nz, ny, nx) = cube.dim();
        let kernel = GriddingKernel::for_interpolator(self.grid.interpolator);
        let mask_r2 = ((ori / 2) * (ori / 2)) as isize;
        let scale = 1.0 / params.normalise;
        let correct = params.do_gridding_correction;

        *vol_out = Volume::centered(ori, self.grid.ref_dim);
        let origin = vol_out.origin();
        Zip::indexed(vol_out.array_mut()).par_for_each(|(a, b, c), v| {
            let z = a as isize + origin[0];
            let y = b as isize + origin[1];
            let x = c as isize + origin[2];
            let value = cube[[cube_index(z, nz), cube_index(y, ny), cube_index(x, nx)]].re * scale;
            *v = if !correct {
                value
            } else {
                let r2 = z * z + y * y + x * x;
                if r2 > mask_r2 {
                    0.0
                } else {
                    let rval = (r2 as f64).sqrt() / pad;
                    value / gridding_profile(kernel, rval)
                }
            };
        });
        Ok(())
    }
}

/// `sigma2[r] = n_r / Σ os·W`; returns the shells whose weight sum vanished
pub(crate) fn fill_sigma2(statistics: &ShellStatistics, sigma2: &mut [f64]) -> Vec<usize> {
    let mut singular = Vec::new();
    for (shell, s) in sigma2.iter_mut().enumerate() {
        let sum = statistics.weight_sums[shell];
        if sum > MAP_EPSILON {
            *s = statistics.counts[shell] as f64 / sum;
        } else {
            *s = 0.0;
            if statistics.counts[shell] > 0 {
                singular.push(shell);
            }
        }
    }
    singular
}

/// `tau2 = fudge · fsc / (1 - fsc) · sigma2`, the FSC clamped to `[FSC_MIN, FSC_MAX]`
pub(crate) fn tau2_from_fsc(fsc: &[f64], sigma2: &[f64], params: &ReconstructParams, tau2: &mut [f64]) {
    for (shell, t) in tau2.iter_mut().enumerate() {
        let mut f = fsc[shell];
        if params.map_half.is_whole_map() {
            let f0 = f.max(0.0);
            f = (2.0 * f0 / (f0 + 1.0)).sqrt();
        }
        let f = f.clamp(FSC_MIN, FSC_MAX);
        let ssnr = f / (1.0 - f);
        *t = params.tau2_fudge * ssnr * sigma2[shell];
    }
}
