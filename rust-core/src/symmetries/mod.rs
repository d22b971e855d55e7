// Symmetries module: point-group rotations used to symmetrise the Fourier grid
// This module turns a point-group symbol into the finite set of 3x3 rotations of that group

// ======================== MODULE DECLARATIONS ========================
pub mod point_groups;
pub mod symmetry_list;
pub mod symmetry_operations;

mod _tests_symmetry_list;

// ======================== SYMMETRY OPERATIONS ========================
pub use symmetry_operations::SymmetryOperation; // struct - proper rotation of the Fourier grid
// SymmetryOperation impl methods:
//   identity() -> Self                                    - identity rotation
//   from_axis_angle(axis: Vector3<f64>, angle: f64) -> Self - rotation about an axis (radians)
//   fold(axis: Vector3<f64>, n: u32) -> Self              - n-fold rotation about an axis
//   apply(&self, point: Vector3<f64>) -> Vector3<f64>     - rotates a point
//   compose(&self, other: &Self) -> Self                  - self after other
//   inverse(&self) -> Self                                - transposed rotation
//   order(&self) -> usize                                 - smallest n with R^n = I
//   is_identity(&self) -> bool

// ======================== POINT GROUPS ========================
pub use point_groups::{
    PointGroup,      // enum - Cyclic(n), Dihedral(n), Tetrahedral, Octahedral, Icosahedral(convention)
    IcosahedralConvention, // enum - orientation of the icosahedral group (I1..I4)
    close_group,     // fn(generators: &[SymmetryOperation]) -> Vec<SymmetryOperation> - group closure
};
// PointGroup impl methods:
//   parse(symbol: &str) -> Result<Self>                  - "c1", "d2", "t", "o", "i", "i1".."i4"
//   generators(&self) -> Vec<SymmetryOperation>          - generating rotations
//   order(&self) -> usize                                - number of group elements

// ======================== SYMMETRY LISTS ========================
pub use symmetry_list::SymList; // struct - ordered non-identity rotations of a point group
