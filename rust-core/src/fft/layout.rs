use ndarray::{Array3, Zip};
use num_traits::Zero;

use crate::grid::volume::{Hermitian, Volume};

/// Signed frequency of index `index` on a full FFT axis of length `size`.
///
/// Indices below `size/2` are non-negative frequencies, the rest wrap to negative ones.
#[inline]
pub fn cube_frequency(index: usize, size: usize) -> isize {
    if index < size / 2 || size == 1 {
        index as isize
    } else {
        index as isize - size as isize
    }
}

/// Index of signed frequency `frequency` on a full FFT axis of length `size`
#[inline]
pub fn cube_index(frequency: isize, size: usize) -> usize {
    frequency.rem_euclid(size as isize) as usize
}

/// Expand a half-Hermitian grid into a full FFT box.
///
/// Elements with `kp² + ip² + jp² > max_r2` are zero; elements with `jp < 0` are taken from
/// the Hermitian partner of `(-kp, -ip, -jp)`.
pub fn decenter<T, U>(src: &Volume<T>, dst: &mut Array3<U>, max_r2: isize, convert: impl Fn(T) -> U + Sync)
where
    T: Hermitian + Sync,
    U: Zero + Send,
{
    let (nz, ny, nx) = dst.dim();
    Zip::indexed(dst).par_for_each(|(k, i, j), value| {
        let kp = cube_frequency(k, nz);
        let ip = cube_frequency(i, ny);
        let jp = cube_frequency(j, nx);
        *value = if kp * kp + ip * ip + jp * jp > max_r2 {
            U::zero()
        } else if jp >= 0 {
            src.get(kp, ip, jp).map_or_else(U::zero, |v| convert(*v))
        } else {
            src.get(-kp, -ip, -jp)
                .map_or_else(U::zero, |v| convert(v.hermitian_partner()))
        };
    });
}

/// Gather the half-Hermitian grid back from a full FFT box; elements outside `max_r2` are zero.
pub fn recenter<T, U>(src: &Array3<U>, dst: &mut Volume<T>, max_r2: isize, convert: impl Fn(U) -> T + Sync)
where
    T: Zero + Send,
    U: Copy + Sync,
{
    let (nz, ny, nx) = src.dim();
    let origin = dst.origin();
    Zip::indexed(dst.array_mut()).par_for_each(|(a, b, c), value| {
        let kp = a as isize + origin[0];
        let ip = b as isize + origin[1];
        let jp = c as isize + origin[2];
        *value = if kp * kp + ip * ip + jp * jp > max_r2 {
            T::zero()
        } else {
            convert(src[[cube_index(kp, nz), cube_index(ip, ny), cube_index(jp, nx)]])
        };
    });
}
