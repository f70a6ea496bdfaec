//! Indexed output meshes.

use glam::DVec3;

/// An indexed mesh with `N` point indices per cell and one label per cell.
///
/// Points are unique and stored in insertion order; every cell references
/// points that were emitted before it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexedMesh<const N: usize> {
    points: Vec<DVec3>,
    cells: Vec<[u32; N]>,
    labels: Vec<u32>,
}

/// Largest number of materials a mesh can carry; interface keys set one bit
/// of a `u64` per material.
pub const MAX_MATERIALS: usize = 64;

/// A tetrahedral mesh whose cell labels are material indices.
pub type TetMesh = IndexedMesh<4>;

/// A triangle mesh whose cell labels are interface-key indices.
pub type TriangleMesh = IndexedMesh<3>;

impl<const N: usize> IndexedMesh<N> {
    /// Creates a mesh from its parts.
    ///
    /// # Panics
    /// Panics if `cells` and `labels` differ in length or a cell references
    /// a point that does not exist.
    #[must_use]
    pub fn new(points: Vec<DVec3>, cells: Vec<[u32; N]>, labels: Vec<u32>) -> Self {
        assert_eq!(cells.len(), labels.len(), "one label is required per cell");
        assert!(
            cells.iter().flatten().all(|&i| (i as usize) < points.len()),
            "cell index out of range ({} points)",
            points.len()
        );
        Self {
            points,
            cells,
            labels,
        }
    }

    /// Returns the points.
    #[must_use]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Returns the cells.
    #[must_use]
    pub fn cells(&self) -> &[[u32; N]] {
        &self.cells
    }

    /// Returns the per-cell labels.
    #[must_use]
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Returns the number of points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Returns the number of cells.
    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the mesh has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the positions of the points of cell `index`.
    #[must_use]
    pub fn cell_points(&self, index: usize) -> [DVec3; N] {
        self.cells[index].map(|i| self.points[i as usize])
    }

    /// Returns the axis-aligned bounding box of the points.
    #[must_use]
    pub fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }

    /// Consumes the mesh, returning points, cells and labels.
    #[must_use]
    pub fn into_parts(self) -> (Vec<DVec3>, Vec<[u32; N]>, Vec<u32>) {
        (self.points, self.cells, self.labels)
    }
}

impl TetMesh {
    /// Returns the signed volume of tetrahedron `index`.
    #[must_use]
    pub fn signed_volume(&self, index: usize) -> f64 {
        let [a, b, c, d] = self.cell_points(index);
        (b - a).dot((c - a).cross(d - a)) / 6.0
    }
}

impl TriangleMesh {
    /// Returns the area of triangle `index`.
    #[must_use]
    pub fn area(&self, index: usize) -> f64 {
        let [a, b, c] = self.cell_points(index);
        0.5 * (b - a).cross(c - a).length()
    }
}
