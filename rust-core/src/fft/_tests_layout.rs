#[cfg(test)]
mod _tests_layout {
    use super::super::layout::{cube_frequency, cube_index, decenter, recenter};
    use crate::grid::volume::Volume;
    use ndarray::Array3;
    use num_complex::Complex64;

    #[test]
    fn test_frequency_index_mapping() {
        assert_eq!(cube_frequency(0, 8), 0);
        assert_eq!(cube_frequency(3, 8), 3);
        assert_eq!(cube_frequency(4, 8), -4);
        assert_eq!(cube_frequency(7, 8), -1);
        assert_eq!(cube_frequency(0, 1), 0);
        for f in -4..4 {
            assert_eq!(cube_frequency(cube_index(f, 8), 8), f);
        }
    }

    #[test]
    fn test_decenter_uses_hermitian_partner() {
        let mut half: Volume<Complex64> = Volume::half_hermitian(3, 3);
        half[[1, -2, 2]] = Complex64::new(1.0, 2.0);
        half[[0, 0, 0]] = Complex64::new(5.0, 0.0);

        let mut cube = Array3::zeros((8, 8, 8));
        decenter(&half, &mut cube, 9, |v| v);

        assert_eq!(cube[[1, 6, 2]], Complex64::new(1.0, 2.0));
        assert_eq!(cube[[7, 2, 6]], Complex64::new(1.0, -2.0));
        assert_eq!(cube[[0, 0, 0]], Complex64::new(5.0, 0.0));
        let nonzero = cube.iter().filter(|v| v.norm() > 0.0).count();
        assert_eq!(nonzero, 3);
    }

    #[test]
    fn test_decenter_respects_radius_and_converts() {
        let mut half: Volume<f64> = Volume::half_hermitian(3, 2);
        half[[0, 0, 3]] = 2.0;
        half[[0, 1, 1]] = 3.0;

        let mut cube: Array3<Complex64> = Array3::zeros((1, 8, 8));
        decenter(&half, &mut cube, 4, |w| Complex64::new(w, 0.0));

        assert_eq!(cube[[0, 0, 3]], Complex64::new(0.0, 0.0));
        assert_eq!(cube[[0, 1, 1]], Complex64::new(3.0, 0.0));
        assert_eq!(cube[[0, 7, 7]], Complex64::new(3.0, 0.0));
    }

    #[test]
    fn test_recenter_inverts_decenter() {
        let mut half: Volume<Complex64> = Volume::half_hermitian(3, 3);
        for (n, (idx, _)) in half.clone().iter_logical().enumerate() {
            half[idx] = Complex64::new(n as f64, -(n as f64));
        }
        let mut cube = Array3::zeros((8, 8, 8));
        decenter(&half, &mut cube, 9, |v| v);

        let mut back: Volume<Complex64> = Volume::half_hermitian(3, 3);
        recenter(&cube, &mut back, 9, |v| v);

        for (idx, value) in back.iter_logical() {
            let r2 = idx[0] * idx[0] + idx[1] * idx[1] + idx[2] * idx[2];
            if r2 <= 9 && idx[2] > 0 {
                assert_eq!(*value, half[idx]);
            } else if r2 > 9 {
                assert_eq!(*value, Complex64::new(0.0, 0.0));
            }
        }
    }
}
