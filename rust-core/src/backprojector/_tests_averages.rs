#[cfg(test)]
mod _tests_averages {
    use super::super::backprojector::BackProjector;
    use crate::config::BackProjectorConfig;
    use crate::error::BackprojectorError;
    use crate::grid::{fftw_frequency, Volume};
    use crate::interfaces::Interpolator;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Quaternion, UnitQuaternion};
    use ndarray::Array2;
    use num_complex::Complex64;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    const N: usize = 16;

    fn random_image(seed: u64) -> Array2<Complex64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array2::from_shape_fn((N, N / 2 + 1), |_| {
            Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
        })
    }

    fn identity_insertion(img: &Array2<Complex64>) -> BackProjector {
        let mut bp = BackProjector::new(
            BackProjectorConfig::new(N, 2, "c1").with_interpolator(Interpolator::Nearest),
        )
        .unwrap();
        bp.initialise_data_and_weight(None).unwrap();
        bp.backrotate_2d(img, &Matrix3::identity(), false, None).unwrap();
        bp
    }

    #[test]
    fn test_average_recovers_inserted_image() {
        let img = random_image(1);
        let bp = identity_insertion(&img);
        let avg = bp.get_downsampled_average().unwrap();
        // Radius r_max + 1
        assert_eq!(avg.shape(), [1, 19, 10]);

        let pf2 = 4;
        let max_r2 = bp.grid.max_r2();
        let mut checked = 0;
        for ((i, j), value) in img.indexed_iter() {
            let ip = fftw_frequency(i, N);
            let jp = j as isize;
            if jp == 0 && ip < 0 {
                continue;
            }
            let r2 = ip * ip + jp * jp;
            if r2 > 64 || pf2 * r2 > max_r2 {
                continue;
            }
            assert_eq!(avg[[0, ip, jp]], *value);
            checked += 1;
        }
        assert!(checked > 100);
        // Nothing is inserted on the negative-y half of the x = 0 column
        assert_eq!(avg[[0, -3, 0]], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_fsc_of_identical_halves() {
        let bp = identity_insertion(&random_image(2));
        let avg = bp.get_downsampled_average().unwrap();
        let fsc = bp
            .calculate_downsampled_fourier_shell_correlation(&avg, &avg)
            .unwrap();
        assert_eq!(fsc.len(), N / 2 + 1);
        for value in &fsc[..8] {
            assert_relative_eq!(*value, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_fsc_of_opposite_halves() {
        let bp = identity_insertion(&random_image(3));
        let avg = bp.get_downsampled_average().unwrap();
        let negated = Volume::from_array(avg.array().mapv(|v| -v), avg.origin());
        let fsc = bp
            .calculate_downsampled_fourier_shell_correlation(&avg, &negated)
            .unwrap();
        for value in &fsc[..8] {
            assert_relative_eq!(*value, -1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_fsc_of_independent_halves_is_small() {
        let bp1 = identity_insertion(&random_image(4));
        let bp2 = identity_insertion(&random_image(5));
        let avg1 = bp1.get_downsampled_average().unwrap();
        let avg2 = bp2.get_downsampled_average().unwrap();
        let fsc = bp1
            .calculate_downsampled_fourier_shell_correlation(&avg1, &avg2)
            .unwrap();
        // Outer shells hold enough voxels for random phases to decorrelate
        for value in &fsc[5..8] {
            assert!(value.abs() < 0.8, "fsc {}", value);
        }
    }

    /// Central slice of a 3D Gaussian blob in half layout
    fn blob_slice(sigma: f64) -> Array2<Complex64> {
        Array2::from_shape_fn((N, N / 2 + 1), |(i, j)| {
            let ip = fftw_frequency(i, N) as f64;
            let jp = j as f64;
            let f2 = (ip * ip + jp * jp) / (N * N) as f64;
            Complex64::new((-2.0 * PI * PI * sigma * sigma * f2).exp(), 0.0)
        })
    }

    fn uniform_rotation(rng: &mut StdRng) -> Matrix3<f64> {
        let (u1, u2, u3): (f64, f64, f64) = (rng.gen(), rng.gen(), rng.gen());
        let q = Quaternion::new(
            (1.0 - u1).sqrt() * (2.0 * PI * u2).sin(),
            (1.0 - u1).sqrt() * (2.0 * PI * u2).cos(),
            u1.sqrt() * (2.0 * PI * u3).sin(),
            u1.sqrt() * (2.0 * PI * u3).cos(),
        );
        UnitQuaternion::from_quaternion(q)
            .to_rotation_matrix()
            .into_inner()
    }

    #[test]
    fn test_fsc_of_half_sets_of_a_blob() {
        let slice = blob_slice(1.5);
        let mut rng = StdRng::seed_from_u64(12);
        let mut halves: Vec<BackProjector> = (0..2)
            .map(|_| {
                let mut bp = BackProjector::new(BackProjectorConfig::new(N, 3, "c1")).unwrap();
                bp.initialise_data_and_weight(None).unwrap();
                bp
            })
            .collect();
        for p in 0..1000 {
            let a = uniform_rotation(&mut rng);
            halves[p % 2].backproject(&slice, &a, false, None).unwrap();
        }

        let avg1 = halves[0].get_downsampled_average().unwrap();
        let avg2 = halves[1].get_downsampled_average().unwrap();
        let fsc = halves[0]
            .calculate_downsampled_fourier_shell_correlation(&avg1, &avg2)
            .unwrap();

        assert_eq!(fsc.len(), N / 2 + 1);
        assert_relative_eq!(fsc[0], 1.0, epsilon = 1e-12);
        for shell in 0..N / 2 {
            assert!(fsc[shell] > 0.99, "shell {}: {}", shell, fsc[shell]);
            assert!(
                fsc[shell + 1] <= fsc[shell] + 5e-4,
                "fsc rises from {} to {} at shell {}",
                fsc[shell],
                fsc[shell + 1],
                shell + 1
            );
        }
    }

    #[test]
    fn test_fsc_shape_mismatch() {
        let bp = identity_insertion(&random_image(6));
        let avg = bp.get_downsampled_average().unwrap();
        let other: Volume<Complex64> = Volume::half_hermitian(5, 2);
        assert!(matches!(
            bp.calculate_downsampled_fourier_shell_correlation(&avg, &other),
            Err(BackprojectorError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_average_requires_allocation() {
        let bp = BackProjector::new(BackProjectorConfig::new(N, 3, "c1")).unwrap();
        assert!(matches!(
            bp.get_downsampled_average(),
            Err(BackprojectorError::InvalidState(_))
        ));
    }
}
