use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::BackprojectorError;
use crate::symmetries::symmetry_operations::SymmetryOperation;
use crate::Result;

/// Upper bound on the size of any supported point group (icosahedral: 60)
const MAX_GROUP_ORDER: usize = 120;

/// Orientation of the icosahedral group with respect to the grid axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IcosahedralConvention {
    /// `I2` turned by 90° about z
    I1,
    /// Two-fold axes on x, y and z; a five-fold axis through (0, 1, φ)
    I2,
    /// Five-fold axis on z, two-fold axis on x
    I3,
    /// `I3` turned by 90° about z
    I4,
}

/// Crystallographic and non-crystallographic proper point groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointGroup {
    /// Cn: n-fold axis along z
    Cyclic(u32),
    /// Dn: n-fold axis along z and a two-fold axis along x
    Dihedral(u32),
    /// T: two-fold axes on x, y, z and three-fold axes on the body diagonals
    Tetrahedral,
    /// O: four-fold axes on x, y, z
    Octahedral,
    Icosahedral(IcosahedralConvention),
}

impl PointGroup {
    /// Parse a point-group symbol such as "c1", "C4", "d2", "t", "o", "i" or "i3".
    pub fn parse(symbol: &str) -> Result<Self> {
        let lower = symbol.trim().to_ascii_lowercase();
        let unknown = || BackprojectorError::UnknownSymmetry(symbol.to_string());

        let (head, tail) = lower.split_at(lower.chars().next().map_or(0, |c| c.len_utf8()));
        let order = || -> Result<u32> {
            match tail.parse::<u32>() {
                Ok(n) if n >= 1 => Ok(n),
                _ => Err(unknown()),
            }
        };

        match head {
            "c" => Ok(PointGroup::Cyclic(order()?)),
            "d" => Ok(PointGroup::Dihedral(order()?)),
            "t" if tail.is_empty() => Ok(PointGroup::Tetrahedral),
            "o" if tail.is_empty() => Ok(PointGroup::Octahedral),
            "i" => match tail {
                "" | "2" => Ok(PointGroup::Icosahedral(IcosahedralConvention::I2)),
                "1" => Ok(PointGroup::Icosahedral(IcosahedralConvention::I1)),
                "3" => Ok(PointGroup::Icosahedral(IcosahedralConvention::I3)),
                "4" => Ok(PointGroup::Icosahedral(IcosahedralConvention::I4)),
                _ => Err(unknown()),
            },
            _ => Err(unknown()),
        }
    }

    /// Rotations generating the group
    pub fn generators(&self) -> Vec<SymmetryOperation> {
        let x = Vector3::x();
        let z = Vector3::z();
        let diagonal = Vector3::new(1.0, 1.0, 1.0);

        match *self {
            PointGroup::Cyclic(n) => vec![SymmetryOperation::fold(z, n)],
            PointGroup::Dihedral(n) => vec![
                SymmetryOperation::fold(z, n),
                SymmetryOperation::fold(x, 2),
            ],
            PointGroup::Tetrahedral => vec![
                SymmetryOperation::fold(z, 2),
                SymmetryOperation::fold(diagonal, 3),
            ],
            PointGroup::Octahedral => vec![
                SymmetryOperation::fold(z, 4),
                SymmetryOperation::fold(diagonal, 3),
            ],
            PointGroup::Icosahedral(convention) => {
                let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
                let crowther = [
                    SymmetryOperation::fold(Vector3::new(0.0, 1.0, phi), 5),
                    SymmetryOperation::fold(diagonal, 3),
                ];
                // Change of frame applied to the I2 generators
                let quarter_z = SymmetryOperation::fold(z, 4);
                let five_fold_to_z = SymmetryOperation::from_axis_angle(x, (1.0 / phi).atan());
                let frame = match convention {
                    IcosahedralConvention::I1 => quarter_z,
                    IcosahedralConvention::I2 => SymmetryOperation::identity(),
                    IcosahedralConvention::I3 => five_fold_to_z,
                    IcosahedralConvention::I4 => quarter_z.compose(&five_fold_to_z),
                };
                crowther
                    .iter()
                    .map(|g| frame.compose(g).compose(&frame.inverse()))
                    .collect()
            }
        }
    }

    /// Number of rotations in the group, identity included
    pub fn order(&self) -> usize {
        match *self {
            PointGroup::Cyclic(n) => n as usize,
            PointGroup::Dihedral(n) => 2 * n as usize,
            PointGroup::Tetrahedral => 12,
            PointGroup::Octahedral => 24,
            PointGroup::Icosahedral(_) => 60,
        }
    }
}

impl fmt::Display for PointGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointGroup::Cyclic(n) => write!(f, "C{}", n),
            PointGroup::Dihedral(n) => write!(f, "D{}", n),
            PointGroup::Tetrahedral => write!(f, "T"),
            PointGroup::Octahedral => write!(f, "O"),
            PointGroup::Icosahedral(convention) => write!(f, "{:?}", convention),
        }
    }
}

/// Close a set of generators under composition.
///
/// The identity comes first, then elements in the order they are discovered, so the result
/// is deterministic for a given generator list.
pub fn close_group(generators: &[SymmetryOperation]) -> Vec<SymmetryOperation> {
    let mut elements = vec![SymmetryOperation::identity()];
    let mut frontier = 0;

    while frontier < elements.len() && elements.len() <= MAX_GROUP_ORDER {
        let current = elements[frontier];
        for generator in generators {
            let candidate = generator.compose(&current);
            if !elements.iter().any(|e| e.approx_eq(&candidate)) {
                elements.push(candidate);
            }
        }
        frontier += 1;
    }

    elements
}
