use std::ops::{Index, IndexMut};

use ndarray::Array3;
use num_complex::Complex64;
use num_traits::Zero;

/// Values stored in a half-Hermitian array: the value at `-f` is the Hermitian partner of
/// the value at `f`.
pub trait Hermitian: Copy {
    fn hermitian_partner(self) -> Self;
}

impl Hermitian for f64 {
    #[inline]
    fn hermitian_partner(self) -> Self {
        self
    }
}

impl Hermitian for Complex64 {
    #[inline]
    fn hermitian_partner(self) -> Self {
        self.conj()
    }
}

/// Logical (signed) frequency of index `index` along an FFTW-layout axis of length `size`.
#[inline]
pub fn fftw_frequency(index: usize, size: usize) -> isize {
    if index <= size / 2 {
        index as isize
    } else {
        index as isize - size as isize
    }
}

/// A 3D array addressed by signed logical indices `(k, i, j)` (slowest to fastest).
///
/// `origin` holds the logical index of physical element `[0, 0, 0]`. Two-dimensional data
/// uses a single plane along the slowest axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume<T> {
    data: Array3<T>,
    origin: [isize; 3],
}

impl<T: Clone + Zero> Volume<T> {
    pub fn zeros(shape: [usize; 3], origin: [isize; 3]) -> Self {
        Self {
            data: Array3::zeros((shape[0], shape[1], shape[2])),
            origin,
        }
    }

    /// Half-Hermitian array with `kp, ip ∈ [-radius, radius]` and `jp ∈ [0, radius]`.
    /// For `ndim == 2` the `kp` axis collapses to the single plane `kp = 0`.
    pub fn half_hermitian(radius: usize, ndim: usize) -> Self {
        let r = radius as isize;
        let side = 2 * radius + 1;
        if ndim == 3 {
            Self::zeros([side, side, radius + 1], [-r, -r, 0])
        } else {
            Self::zeros([1, side, radius + 1], [0, -r, 0])
        }
    }

    /// Real-space box of side `size` in every used dimension, logical origin in the center.
    pub fn centered(size: usize, ndim: usize) -> Self {
        let h = (size / 2) as isize;
        if ndim == 3 {
            Self::zeros([size, size, size], [-h, -h, -h])
        } else {
            Self::zeros([1, size, size], [0, -h, -h])
        }
    }

    /// Set every element to zero
    pub fn clear(&mut self) {
        self.data.fill(T::zero());
    }
}

impl<T> Volume<T> {
    /// Wrap an existing array
    pub fn from_array(data: Array3<T>, origin: [isize; 3]) -> Self {
        Self { data, origin }
    }

    pub fn shape(&self) -> [usize; 3] {
        let (z, y, x) = self.data.dim();
        [z, y, x]
    }

    pub fn origin(&self) -> [isize; 3] {
        self.origin
    }

    /// Inclusive logical range `(first, last)` along `axis`
    pub fn logical_range(&self, axis: usize) -> (isize, isize) {
        let first = self.origin[axis];
        (first, first + self.shape()[axis] as isize - 1)
    }

    #[inline]
    fn offset(&self, k: isize, i: isize, j: isize) -> Option<[usize; 3]> {
        let (z, y, x) = self.data.dim();
        let a = k - self.origin[0];
        let b = i - self.origin[1];
        let c = j - self.origin[2];
        if a < 0 || b < 0 || c < 0 || a as usize >= z || b as usize >= y || c as usize >= x {
            None
        } else {
            Some([a as usize, b as usize, c as usize])
        }
    }

    #[inline]
    pub fn contains(&self, k: isize, i: isize, j: isize) -> bool {
        self.offset(k, i, j).is_some()
    }

    #[inline]
    pub fn get(&self, k: isize, i: isize, j: isize) -> Option<&T> {
        self.offset(k, i, j).map(|p| &self.data[p])
    }

    #[inline]
    pub fn get_mut(&mut self, k: isize, i: isize, j: isize) -> Option<&mut T> {
        self.offset(k, i, j).map(move |p| &mut self.data[p])
    }

    /// Logical index of a physical position
    #[inline]
    pub fn to_logical(&self, physical: (usize, usize, usize)) -> [isize; 3] {
        [
            physical.0 as isize + self.origin[0],
            physical.1 as isize + self.origin[1],
            physical.2 as isize + self.origin[2],
        ]
    }

    /// Iterate over all elements with their logical index
    pub fn iter_logical(&self) -> impl Iterator<Item = ([isize; 3], &T)> + '_ {
        self.data
            .indexed_iter()
            .map(move |(p, v)| (self.to_logical(p), v))
    }

    pub fn array(&self) -> &Array3<T> {
        &self.data
    }

    pub fn array_mut(&mut self) -> &mut Array3<T> {
        &mut self.data
    }

    pub fn into_array(self) -> Array3<T> {
        self.data
    }

    /// Whether both arrays cover the same logical region
    pub fn same_geometry<U>(&self, other: &Volume<U>) -> bool {
        self.shape() == other.shape() && self.origin == other.origin()
    }
}

impl<T> Index<[isize; 3]> for Volume<T> {
    type Output = T;

    fn index(&self, index: [isize; 3]) -> &T {
        match self.offset(index[0], index[1], index[2]) {
            Some(p) => &self.data[p],
            None => panic!("logical index {:?} outside volume {:?}", index, self.shape()),
        }
    }
}

impl<T> IndexMut<[isize; 3]> for Volume<T> {
    fn index_mut(&mut self, index: [isize; 3]) -> &mut T {
        match self.offset(index[0], index[1], index[2]) {
            Some(p) => &mut self.data[p],
            None => panic!("logical index {:?} outside volume {:?}", index, self.shape()),
        }
    }
}

impl<T> From<Volume<T>> for Array3<T> {
    fn from(volume: Volume<T>) -> Self {
        volume.data
    }
}
