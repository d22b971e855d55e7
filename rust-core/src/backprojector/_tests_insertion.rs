#[cfg(test)]
mod _tests_insertion {
    use super::super::backprojector::BackProjector;
    use crate::config::BackProjectorConfig;
    use crate::error::BackprojectorError;
    use crate::interfaces::Interpolator;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Rotation3};
    use ndarray::{Array1, Array2, Array3};
    use num_complex::Complex64;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn accumulator(config: BackProjectorConfig) -> BackProjector {
        let mut bp = BackProjector::new(config).unwrap();
        bp.initialise_data_and_weight(None).unwrap();
        bp
    }

    fn zero_image(n: usize) -> Array2<Complex64> {
        Array2::zeros((n, n / 2 + 1))
    }

    fn random_image(n: usize, rng: &mut StdRng) -> Array2<Complex64> {
        Array2::from_shape_fn((n, n / 2 + 1), |_| {
            Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
        })
    }

    fn nonzero_weights(bp: &BackProjector) -> usize {
        bp.weight().array().iter().filter(|&&w| w != 0.0).count()
    }

    // ==================== Kernels ====================

    #[test]
    fn test_nearest_identity_2d() {
        let mut bp = accumulator(
            BackProjectorConfig::new(8, 2, "c1").with_interpolator(Interpolator::Nearest),
        );
        let v = Complex64::new(1.5, -0.5);
        let mut img = zero_image(8);
        img[[1, 2]] = v;
        img[[1, 0]] = Complex64::new(2.0, 0.0);
        // Negative-y half of the x = 0 column is redundant and never inserted
        img[[7, 0]] = Complex64::new(9.0, 0.0);

        bp.backrotate_2d(&img, &Matrix3::identity(), false, None).unwrap();

        assert_eq!(bp.data()[[0, 2, 4]], v);
        assert_eq!(bp.weight()[[0, 2, 4]], 1.0);
        assert_eq!(bp.data()[[0, 2, 0]], Complex64::new(2.0, 0.0));
        assert_eq!(bp.data()[[0, -2, 0]], Complex64::new(0.0, 0.0));
        assert_eq!(nonzero_weights(&bp), 2);
    }

    #[test]
    fn test_rotation_folds_into_stored_half() {
        let quarter_turn = Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let v = Complex64::new(1.0, 2.0);
        let mut img = zero_image(8);
        img[[1, 2]] = v;

        let config = BackProjectorConfig::new(8, 2, "c1").with_interpolator(Interpolator::Nearest);
        let mut bp = accumulator(config.clone());
        bp.backrotate_2d(&img, &quarter_turn, false, None).unwrap();
        // (x, y) = 2 * (-1, 2) lies in the x < 0 half and is mirrored with conjugation
        assert_eq!(bp.data()[[0, -4, 2]], v.conj());

        let mut bp = accumulator(config);
        bp.backrotate_2d(&img, &quarter_turn, true, None).unwrap();
        assert_eq!(bp.data()[[0, -4, 2]], v);
    }

    #[test]
    fn test_trilinear_splat_weights() {
        let (c, s) = (0.6, 0.8);
        let rotation = Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0);
        let mut img = zero_image(8);
        img[[0, 1]] = Complex64::new(2.0, 0.0);

        let mut bp = accumulator(BackProjectorConfig::new(8, 2, "c1").with_r_min_nn(0));
        bp.backrotate_2d(&img, &rotation, false, None).unwrap();
        // Target point (x, y) = (1.2, 1.6)
        assert_relative_eq!(bp.weight()[[0, 1, 1]], 0.32, epsilon = 1e-12);
        assert_relative_eq!(bp.weight()[[0, 1, 2]], 0.08, epsilon = 1e-12);
        assert_relative_eq!(bp.weight()[[0, 2, 1]], 0.48, epsilon = 1e-12);
        assert_relative_eq!(bp.weight()[[0, 2, 2]], 0.12, epsilon = 1e-12);
        assert_relative_eq!(bp.data()[[0, 2, 1]].re, 0.96, epsilon = 1e-12);
        assert_relative_eq!(bp.weight().array().sum(), 1.0, epsilon = 1e-12);

        // Below r_min_nn the same sample goes to its nearest voxel
        let mut bp = accumulator(BackProjectorConfig::new(8, 2, "c1"));
        bp.backrotate_2d(&img, &rotation, false, None).unwrap();
        assert_eq!(bp.weight()[[0, 2, 1]], 1.0);
        assert_eq!(nonzero_weights(&bp), 1);
    }

    #[test]
    fn test_backproject_central_slice() {
        // Source x becomes target -z, source y stays y
        let a = Matrix3::new(0.0, 0.0, 1.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0);
        let v = Complex64::new(0.25, 0.75);
        let mut img = zero_image(8);
        img[[1, 2]] = v;

        let mut bp = accumulator(
            BackProjectorConfig::new(8, 3, "c1").with_interpolator(Interpolator::Nearest),
        );
        bp.backproject(&img, &a, false, None).unwrap();
        assert_eq!(bp.data()[[-4, 2, 0]], v);
        assert_eq!(bp.weight()[[-4, 2, 0]], 1.0);
        assert_eq!(nonzero_weights(&bp), 1);
    }

    #[test]
    fn test_backrotate_3d_identity() {
        let v = Complex64::new(-1.0, 0.5);
        let mut vol: Array3<Complex64> = Array3::zeros((8, 8, 5));
        vol[[1, 0, 1]] = v;
        vol[[7, 2, 2]] = v;

        let mut bp = accumulator(
            BackProjectorConfig::new(8, 3, "c1")
                .with_interpolator(Interpolator::Nearest)
                .with_data_dim(3),
        );
        bp.backrotate_3d(&vol, &Matrix3::identity(), false, None).unwrap();
        assert_eq!(bp.data()[[2, 0, 2]], v);
        assert_eq!(bp.data()[[-2, 4, 4]], v);
        assert_eq!(nonzero_weights(&bp), 2);
    }

    #[test]
    fn test_backrotate_3d_weights_are_uniform_after_enforcement() {
        let vol: Array3<Complex64> = Array3::from_elem((8, 8, 5), Complex64::new(1.0, 0.0));
        let mut bp = accumulator(
            BackProjectorConfig::new(8, 3, "c1")
                .with_interpolator(Interpolator::Nearest)
                .with_data_dim(3),
        );
        bp.backrotate_3d(&vol, &Matrix3::identity(), false, None).unwrap();
        bp.enforce_hermitian_symmetry().unwrap();

        let max_r2 = bp.grid.max_r2();
        let mut covered = 0;
        for ([k, i, j], w) in bp.weight().iter_logical() {
            let r2 = k * k + i * i + j * j;
            if k % 2 != 0 || i % 2 != 0 || j % 2 != 0 {
                assert_eq!(*w, 0.0);
            } else if r2 <= max_r2 {
                // x = 0 plane included: one sample per target voxel
                assert_eq!(*w, 1.0, "weight at {:?}", [k, i, j]);
                covered += 1;
            }
        }
        assert!(covered > 100);
    }

    #[test]
    fn test_backrotate_3d_quarter_turn_does_not_double_the_source_plane() {
        // 90 degrees about y sends the source x = 0 plane into the x > 0 interior
        let rotation = Matrix3::new(0.0, 0.0, 1.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0);
        let vol: Array3<Complex64> = Array3::from_elem((8, 8, 5), Complex64::new(1.0, 0.0));
        let mut bp = accumulator(
            BackProjectorConfig::new(8, 3, "c1")
                .with_interpolator(Interpolator::Nearest)
                .with_data_dim(3),
        );
        bp.backrotate_3d(&vol, &rotation, false, None).unwrap();
        let max_w = bp.weight().array().iter().cloned().fold(0.0, f64::max);
        assert_eq!(max_w, 1.0);
    }

    // ==================== Weights and cutoffs ====================

    #[test]
    fn test_per_pixel_weights() {
        let mut img = zero_image(8);
        img[[1, 1]] = Complex64::new(1.0, 1.0);
        img[[2, 1]] = Complex64::new(1.0, 1.0);
        img[[3, 1]] = Complex64::new(1.0, 1.0);
        let mut weights = Array2::from_elem((8, 5), 1.0);
        weights[[1, 1]] = 2.5;
        weights[[2, 1]] = 0.0;
        weights[[3, 1]] = -1.0;

        let mut bp = accumulator(
            BackProjectorConfig::new(8, 2, "c1").with_interpolator(Interpolator::Nearest),
        );
        bp.backrotate_2d(&img, &Matrix3::identity(), false, Some(&weights)).unwrap();
        assert_eq!(bp.weight()[[0, 2, 2]], 2.5);
        assert_eq!(bp.data()[[0, 2, 2]], Complex64::new(2.5, 2.5));
        assert_eq!(bp.weight()[[0, 4, 2]], 0.0);
        assert_eq!(bp.weight()[[0, 6, 2]], 0.0);
    }

    #[test]
    fn test_source_radius_cutoff() {
        let mut bp = BackProjector::new(
            BackProjectorConfig::new(8, 2, "c1").with_interpolator(Interpolator::Nearest),
        )
        .unwrap();
        bp.initialise_data_and_weight(Some(4)).unwrap();
        let mut img = zero_image(8);
        img[[0, 2]] = Complex64::new(1.0, 0.0);
        img[[0, 3]] = Complex64::new(1.0, 0.0);
        img[[2, 2]] = Complex64::new(1.0, 0.0);
        bp.backrotate_2d(&img, &Matrix3::identity(), false, None).unwrap();
        assert_eq!(bp.weight()[[0, 0, 4]], 1.0);
        assert_eq!(nonzero_weights(&bp), 1);
    }

    #[test]
    fn test_support_is_respected() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut bp = accumulator(BackProjectorConfig::new(16, 3, "c1").with_r_min_nn(2));
        for _ in 0..20 {
            let rot = Rotation3::from_euler_angles(
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-1.5..1.5),
                rng.gen_range(-3.0..3.0),
            );
            let img = random_image(16, &mut rng);
            bp.backproject(&img, rot.matrix(), false, None).unwrap();
        }
        let max_r2 = bp.grid.max_r2();
        for (index, value) in bp.data().iter_logical() {
            let [k, i, j] = index;
            let w = bp.weight()[index];
            assert!(w >= 0.0);
            if k * k + i * i + j * j > max_r2 {
                assert_eq!(*value, Complex64::new(0.0, 0.0));
                assert_eq!(w, 0.0);
            }
        }
        assert!(bp.weight().array().sum() > 0.0);
    }

    #[test]
    fn test_insertions_are_additive() {
        let mut rng = StdRng::seed_from_u64(17);
        let rot = Rotation3::from_euler_angles(0.4, 0.9, -1.3);
        let f1 = random_image(16, &mut rng);
        let f2 = random_image(16, &mut rng);
        let (w1, w2) = (0.7, 1.8);
        let weights1 = Array2::from_elem((16, 9), w1);
        let weights2 = Array2::from_elem((16, 9), w2);

        let config = BackProjectorConfig::new(16, 3, "c1").with_r_min_nn(3);
        let mut separate = accumulator(config.clone());
        separate.backproject(&f1, rot.matrix(), false, Some(&weights1)).unwrap();
        separate.backproject(&f2, rot.matrix(), false, Some(&weights2)).unwrap();

        let combined_img = (&f1 * w1 + &f2 * w2) / (w1 + w2);
        let combined_weights = Array2::from_elem((16, 9), w1 + w2);
        let mut combined = accumulator(config);
        combined
            .backproject(&combined_img, rot.matrix(), false, Some(&combined_weights))
            .unwrap();

        for (index, value) in separate.data().iter_logical() {
            assert!((*value - combined.data()[index]).norm() < 1e-10);
            assert_relative_eq!(separate.weight()[index], combined.weight()[index], epsilon = 1e-10);
        }
    }

    // ==================== Dispatch and errors ====================

    #[test]
    fn test_dispatch_matches_direct_call() {
        let mut rng = StdRng::seed_from_u64(23);
        let rot = Rotation3::from_euler_angles(0.1, 0.2, 0.3).into_inner();
        let img = random_image(8, &mut rng);

        let mut direct = accumulator(BackProjectorConfig::new(8, 3, "c1"));
        direct.backproject(&img, &rot, true, None).unwrap();
        let mut dispatched = accumulator(BackProjectorConfig::new(8, 3, "c1"));
        dispatched
            .set_fourier_transform(&img.clone().into_dyn(), &rot, true, None)
            .unwrap();
        assert_eq!(direct.data(), dispatched.data());
        assert_eq!(direct.weight(), dispatched.weight());
    }

    #[test]
    fn test_dimension_errors() {
        let mut bp2 = accumulator(BackProjectorConfig::new(8, 2, "c1"));
        let mut bp3 = accumulator(BackProjectorConfig::new(8, 3, "c1"));
        let id = Matrix3::identity();
        let vol: Array3<Complex64> = Array3::zeros((8, 8, 5));

        assert!(matches!(
            bp2.set_fourier_transform(&vol.clone().into_dyn(), &id, false, None),
            Err(BackprojectorError::DimensionMismatch(_))
        ));
        let line: Array1<Complex64> = Array1::zeros(5);
        assert!(matches!(
            bp3.set_fourier_transform(&line.into_dyn(), &id, false, None),
            Err(BackprojectorError::DimensionMismatch(_))
        ));
        let wrong_weights = Array2::from_elem((8, 4), 1.0).into_dyn();
        assert!(matches!(
            bp2.set_fourier_transform(&zero_image(8).into_dyn(), &id, false, Some(&wrong_weights)),
            Err(BackprojectorError::DimensionMismatch(_))
        ));
        let not_half: Array2<Complex64> = Array2::zeros((8, 8));
        assert!(matches!(
            bp2.backrotate_2d(&not_half, &id, false, None),
            Err(BackprojectorError::DimensionMismatch(_))
        ));
        assert!(matches!(
            bp2.backproject(&zero_image(8), &id, false, None),
            Err(BackprojectorError::DimensionMismatch(_))
        ));
        assert!(matches!(
            bp3.backrotate_2d(&zero_image(8), &id, false, None),
            Err(BackprojectorError::DimensionMismatch(_))
        ));
        assert!(bp3.backrotate_3d(&vol, &id, false, None).is_ok());
    }

    #[test]
    fn test_insert_before_initialisation() {
        let mut bp = BackProjector::new(BackProjectorConfig::new(8, 2, "c1")).unwrap();
        assert!(matches!(
            bp.backrotate_2d(&zero_image(8), &Matrix3::identity(), false, None),
            Err(BackprojectorError::InvalidState(_))
        ));
    }
}
