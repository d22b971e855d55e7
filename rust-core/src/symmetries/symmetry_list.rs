use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::symmetries::point_groups::{close_group, PointGroup};
use crate::symmetries::symmetry_operations::SymmetryOperation;
use crate::Result;

/// The non-identity rotations of a point group.
///
/// The identity is implicit: index 0 is the first non-identity rotation, so an empty list
/// means C1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymList {
    group: PointGroup,
    operations: Vec<SymmetryOperation>,
}

impl SymList {
    /// Build the list from a point-group symbol
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        Ok(Self::from_group(PointGroup::parse(symbol)?))
    }

    pub fn from_group(group: PointGroup) -> Self {
        let operations = close_group(&group.generators())
            .into_iter()
            .filter(|op| !op.is_identity())
            .collect();
        Self { group, operations }
    }

    pub fn group(&self) -> PointGroup {
        self.group
    }

    /// Number of non-identity rotations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of rotations including the identity
    pub fn true_symmetry_count(&self) -> usize {
        self.operations.len() + 1
    }

    pub fn rotation(&self, index: usize) -> Option<&Matrix3<f64>> {
        self.operations.get(index).map(|op| &op.rotation)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymmetryOperation> {
        self.operations.iter()
    }

    /// All rotations of the group, identity first
    pub fn with_identity(&self) -> Vec<SymmetryOperation> {
        std::iter::once(SymmetryOperation::identity())
            .chain(self.operations.iter().copied())
            .collect()
    }
}
