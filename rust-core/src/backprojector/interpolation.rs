use std::ops::{Add, Mul};

use nalgebra::Vector3;
use num_complex::Complex64;
use num_traits::Zero;

use crate::grid::{Hermitian, Volume};

/// Grid point reached by a splat or a read, with its interpolation weight
struct Corner {
    index: [isize; 3],
    weight: f64,
}

/// Fold a point into the stored half (`x ≥ 0`); returns whether it was mirrored.
#[inline]
fn fold(point: Vector3<f64>) -> (Vector3<f64>, bool) {
    if point.x < 0.0 {
        (-point, true)
    } else {
        (point, false)
    }
}

/// The up to eight grid points around `point` with trilinear weights; the z axis is not
/// interpolated when `planar` is set.
fn trilinear_corners(point: &Vector3<f64>, planar: bool) -> impl Iterator<Item = Corner> {
    let x0 = point.x.floor();
    let y0 = point.y.floor();
    let z0 = if planar { 0.0 } else { point.z.floor() };
    let fx = point.x - x0;
    let fy = point.y - y0;
    let fz = if planar { 0.0 } else { point.z - z0 };
    let depth = if planar { 1 } else { 2 };

    (0..depth).flat_map(move |dz| {
        (0..2).flat_map(move |dy| {
            (0..2).map(move |dx| {
                let wz = if dz == 0 { 1.0 - fz } else { fz };
                let wy = if dy == 0 { 1.0 - fy } else { fy };
                let wx = if dx == 0 { 1.0 - fx } else { fx };
                Corner {
                    index: [
                        z0 as isize + dz,
                        y0 as isize + dy,
                        x0 as isize + dx,
                    ],
                    weight: wz * wy * wx,
                }
            })
        })
    })
}

#[inline]
fn within(index: &[isize; 3], max_r2: isize) -> bool {
    index[0] * index[0] + index[1] * index[1] + index[2] * index[2] <= max_r2
}

/// Add `value · weight` to the nearest grid point of `point` and `weight` to its weight.
///
/// Points with `x < 0` are mirrored and their value conjugated. Grid points outside the
/// sphere `max_r2` or outside the arrays are dropped.
pub fn splat_nearest(
    data: &mut Volume<Complex64>,
    weights: &mut Volume<f64>,
    point: Vector3<f64>,
    value: Complex64,
    weight: f64,
    max_r2: isize,
) {
    let mut index = [
        point.z.round() as isize,
        point.y.round() as isize,
        point.x.round() as isize,
    ];
    let mut value = value;
    if index[2] < 0 {
        index = [-index[0], -index[1], -index[2]];
        value = value.conj();
    }
    if !within(&index, max_r2) {
        return;
    }
    if let (Some(d), Some(w)) = (
        data.get_mut(index[0], index[1], index[2]),
        weights.get_mut(index[0], index[1], index[2]),
    ) {
        *d += value * weight;
        *w += weight;
    }
}

/// Distribute `value · weight` over the grid points around `point` with trilinear weights.
///
/// The point is mirrored into `x ≥ 0` first (conjugating the value), so all neighbours lie
/// in the stored half. Neighbours outside `max_r2` or outside the arrays are dropped.
pub fn splat_trilinear(
    data: &mut Volume<Complex64>,
    weights: &mut Volume<f64>,
    point: Vector3<f64>,
    value: Complex64,
    weight: f64,
    max_r2: isize,
) {
    let (point, mirrored) = fold(point);
    let value = if mirrored { value.conj() } else { value };
    let planar = data.shape()[0] == 1;

    for corner in trilinear_corners(&point, planar) {
        if corner.weight == 0.0 || !within(&corner.index, max_r2) {
            continue;
        }
        let [k, i, j] = corner.index;
        if let (Some(d), Some(w)) = (data.get_mut(k, i, j), weights.get_mut(k, i, j)) {
            *d += value * (weight * corner.weight);
            *w += weight * corner.weight;
        }
    }
}

/// Trilinear read of a half-Hermitian grid at an arbitrary point.
///
/// Points with `x < 0` read the Hermitian partner of the mirrored point. Neighbours outside
/// the array contribute zero.
pub fn sample_trilinear<T>(vol: &Volume<T>, point: Vector3<f64>) -> T
where
    T: Hermitian + Zero + Add<Output = T> + Mul<f64, Output = T>,
{
    let (point, mirrored) = fold(point);
    let planar = vol.shape()[0] == 1;

    let mut sum = T::zero();
    for corner in trilinear_corners(&point, planar) {
        if corner.weight == 0.0 {
            continue;
        }
        let [k, i, j] = corner.index;
        if let Some(v) = vol.get(k, i, j) {
            sum = sum + *v * corner.weight;
        }
    }

    if mirrored {
        sum.hermitian_partner()
    } else {
        sum
    }
}
