#[cfg(test)]
mod _tests_transformer {
    use super::super::transformer::FourierTransformer;
    use crate::error::BackprojectorError;
    use approx::assert_relative_eq;
    use ndarray::Array3;
    use num_complex::Complex64;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_box(shape: [usize; 3], seed: u64) -> Array3<Complex64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array3::from_shape_fn((shape[0], shape[1], shape[2]), |_| {
            Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
        })
    }

    #[test]
    fn test_round_trip_3d() {
        let shape = [8, 6, 10];
        let transformer = FourierTransformer::new(shape);
        let original = random_box(shape, 7);
        let mut data = original.clone();
        transformer.forward(&mut data).unwrap();
        transformer.inverse(&mut data).unwrap();
        for (a, b) in data.iter().zip(original.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_round_trip_2d() {
        let shape = [1, 12, 12];
        let transformer = FourierTransformer::new(shape);
        let original = random_box(shape, 11);
        let mut data = original.clone();
        transformer.inverse(&mut data).unwrap();
        transformer.forward(&mut data).unwrap();
        for (a, b) in data.iter().zip(original.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_delta_transforms_to_constant() {
        let shape = [4, 4, 4];
        let transformer = FourierTransformer::new(shape);
        let mut data = transformer.zeros();
        data[[0, 0, 0]] = Complex64::new(1.0, 0.0);
        transformer.forward(&mut data).unwrap();
        for v in data.iter() {
            assert_relative_eq!(v.re, 1.0, epsilon = 1e-12);
            assert_relative_eq!(v.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_frequency() {
        // exp(+2πi x/n) concentrates in bin 1 of the forward (negative exponent) transform
        let n = 16;
        let transformer = FourierTransformer::new([1, 1, n]);
        let mut data = Array3::from_shape_fn((1, 1, n), |(_, _, x)| {
            Complex64::from_polar(1.0, 2.0 * std::f64::consts::PI * x as f64 / n as f64)
        });
        transformer.forward(&mut data).unwrap();
        assert_relative_eq!(data[[0, 0, 1]].re, n as f64, epsilon = 1e-9);
        assert_relative_eq!(data[[0, 0, 0]].norm(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(data[[0, 0, n - 1]].norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_shape_mismatch() {
        let transformer = FourierTransformer::new([1, 8, 8]);
        let mut data = Array3::zeros((1, 8, 9));
        assert!(matches!(
            transformer.forward(&mut data),
            Err(BackprojectorError::DimensionMismatch(_))
        ));
        assert_eq!(transformer.len(), 64);
    }
}
