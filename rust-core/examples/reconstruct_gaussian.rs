/// Reconstruct a 3D Gaussian blob from simulated central slices.
///
/// Two independent half-sets are back-projected, their downsampled averages give an FSC
/// curve, and that curve drives a Wiener-filtered reconstruction of the joined data.
///
/// Run with `RUST_LOG=info cargo run --example reconstruct_gaussian`.
use std::f64::consts::PI;

use anyhow::Result;
use log::info;
use nalgebra::{Quaternion, UnitQuaternion};
use ndarray::Array2;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cryo_backprojector::backprojector::ReconstructionWarning;
use cryo_backprojector::grid::Volume;
use cryo_backprojector::interfaces::PreweightMode;
use cryo_backprojector::{BackProjector, BackProjectorConfig, ReconstructParams, ShellArrays};

const ORI_SIZE: usize = 32;
const SIGMA: f64 = 2.5;
const IMAGES_PER_HALF: usize = 400;
const NOISE: f64 = 2.0;

/// Noisy central slice of a Gaussian with unit real-space peak, FFTW half layout
fn noisy_slice(rng: &mut StdRng) -> Array2<Complex64> {
    let n = ORI_SIZE as f64;
    let amplitude = (2.0 * PI).powf(1.5) * SIGMA.powi(3);
    Array2::from_shape_fn((ORI_SIZE, ORI_SIZE / 2 + 1), |(i, j)| {
        let ip = if i < ORI_SIZE / 2 { i as f64 } else { i as f64 - n };
        let f2 = ip * ip + (j * j) as f64;
        let signal = amplitude * (-2.0 * PI * PI * SIGMA * SIGMA * f2 / (n * n)).exp();
        Complex64::new(
            signal + NOISE * rng.gen_range(-1.0..1.0),
            NOISE * rng.gen_range(-1.0..1.0),
        )
    })
}

fn random_orientation(rng: &mut StdRng) -> UnitQuaternion<f64> {
    let (u1, u2, u3): (f64, f64, f64) = (rng.gen(), rng.gen(), rng.gen());
    UnitQuaternion::from_quaternion(Quaternion::new(
        (1.0 - u1).sqrt() * (2.0 * PI * u2).sin(),
        (1.0 - u1).sqrt() * (2.0 * PI * u2).cos(),
        u1.sqrt() * (2.0 * PI * u3).sin(),
        u1.sqrt() * (2.0 * PI * u3).cos(),
    ))
}

fn half_set(config: &BackProjectorConfig, seed: u64) -> Result<BackProjector> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bp = BackProjector::new(config.clone())?;
    bp.initialise_data_and_weight(None)?;
    for _ in 0..IMAGES_PER_HALF {
        let rotation = random_orientation(&mut rng).to_rotation_matrix();
        let img = noisy_slice(&mut rng);
        bp.backproject(&img, rotation.matrix(), false, None)?;
    }
    Ok(bp)
}

fn main() -> Result<()> {
    env_logger::init();

    let config = BackProjectorConfig::new(ORI_SIZE, 3, "c1");
    let half1 = half_set(&config, 1)?;
    let half2 = half_set(&config, 2)?;

    let avg1 = half1.get_downsampled_average()?;
    let avg2 = half2.get_downsampled_average()?;
    let fsc = half1.calculate_downsampled_fourier_shell_correlation(&avg1, &avg2)?;
    println!("FSC between half-sets:");
    for (shell, value) in fsc.iter().enumerate() {
        println!("  shell {:2}: {:7.4}", shell, value);
    }

    let mut joined = half1;
    joined.accumulate(&half2)?;
    let transformer = joined.create_transformer();

    let shells = joined.grid.shell_count();
    let mut tau2 = vec![0.0; shells];
    let mut sigma2 = vec![0.0; shells];
    let mut evidence = vec![0.0; shells];
    let params = ReconstructParams::default()
        .with_map(1.0)
        .with_fsc_update()
        .with_preweight_mode(PreweightMode::WholeMapHalvedIterations)
        .with_threads(4);

    let mut map: Volume<f64> = Volume::centered(ORI_SIZE, 3);
    let report = joined.reconstruct(
        &mut map,
        &params,
        ShellArrays::new(&mut tau2, &mut sigma2, &mut evidence).with_fsc(&fsc),
        &transformer,
    )?;
    info!(
        "Preweight: {} iterations, residual {:?}",
        report.iterations, report.residual
    );
    for warning in &report.warnings {
        match warning {
            ReconstructionWarning::SingularWeight { shells } => {
                println!("No weight in shells {:?}", shells)
            }
            ReconstructionWarning::NonConvergentPreweight { iterations, residual } => {
                println!("Preweight residual {:.2e} after {} iterations", residual, iterations)
            }
        }
    }

    println!("\nshell      tau2    sigma2  evidence");
    for shell in 0..shells {
        println!(
            "{:5} {:9.3e} {:9.3e} {:9.3e}",
            shell, tau2[shell], sigma2[shell], evidence[shell]
        );
    }

    println!("\nProfile along x (expected exp(-x^2 / 2 sigma^2)):");
    for x in 0..6isize {
        let expected = (-((x * x) as f64) / (2.0 * SIGMA * SIGMA)).exp();
        println!("  x = {}: {:7.4} (expected {:6.4})", x, map[[0, 0, x]], expected);
    }
    Ok(())
}
