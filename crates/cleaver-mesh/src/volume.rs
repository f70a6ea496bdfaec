//! Volume mesh extraction from a raw tetrahedral soup.

use cleaver_core::{TetMesh, TetSoup};

use crate::point_index::PointIndex;

/// Builds an indexed tetrahedral mesh from `soup`.
///
/// Tetrahedra keep their order and vertex order; each cell is labeled with
/// its tetrahedron's material. Vertices are numbered in the order they are
/// first met.
///
/// # Panics
/// Panics if a tetrahedron references a missing vertex; see
/// [`TetSoup::check_indices`].
#[must_use]
pub fn extract_volume_mesh(soup: &TetSoup) -> TetMesh {
    let mut index = PointIndex::new();
    let mut cells = Vec::with_capacity(soup.tets.len());
    let mut labels = Vec::with_capacity(soup.tets.len());
    for tet in &soup.tets {
        cells.push(tet.verts.map(|v| index.insert(soup.vertices[v])));
        labels.push(tet.material);
    }
    log::debug!(
        "volume mesh: {} points, {} tetrahedra (soup had {} vertices)",
        index.len(),
        cells.len(),
        soup.vertices.len()
    );
    TetMesh::new(index.into_points(), cells, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleaver_core::{DVec3, RawTet};
    use proptest::prelude::*;

    /// Rebuilds a soup from an extracted mesh.
    fn soup_of(mesh: &TetMesh) -> TetSoup {
        TetSoup {
            vertices: mesh.points().to_vec(),
            tets: mesh
                .cells()
                .iter()
                .zip(mesh.labels())
                .map(|(cell, &material)| RawTet {
                    verts: cell.map(|i| i as usize),
                    material,
                })
                .collect(),
            faces: Vec::new(),
        }
    }

    #[test]
    fn test_duplicate_vertices_are_merged() {
        // Two tets sharing a face, with the shared vertices stored twice.
        let soup = TetSoup {
            vertices: vec![
                DVec3::ZERO,
                DVec3::X,
                DVec3::Y,
                DVec3::Z,
                DVec3::X,
                DVec3::Y,
                DVec3::Z,
                DVec3::ONE,
            ],
            tets: vec![
                RawTet {
                    verts: [0, 1, 2, 3],
                    material: 0,
                },
                RawTet {
                    verts: [4, 5, 6, 7],
                    material: 2,
                },
            ],
            faces: Vec::new(),
        };
        let mesh = extract_volume_mesh(&soup);
        assert_eq!(mesh.num_points(), 5);
        assert_eq!(mesh.cells(), &[[0, 1, 2, 3], [1, 2, 3, 4]]);
        assert_eq!(mesh.labels(), &[0, 2]);
    }

    #[test]
    fn test_unused_vertices_are_dropped() {
        let soup = TetSoup {
            vertices: vec![DVec3::splat(9.0), DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z],
            tets: vec![RawTet {
                verts: [4, 3, 2, 1],
                material: 1,
            }],
            faces: Vec::new(),
        };
        let mesh = extract_volume_mesh(&soup);
        assert_eq!(mesh.points(), &[DVec3::Z, DVec3::Y, DVec3::X, DVec3::ZERO]);
        assert_eq!(mesh.cells(), &[[0, 1, 2, 3]]);
    }

    #[test]
    fn test_empty_soup() {
        let mesh = extract_volume_mesh(&TetSoup::default());
        assert!(mesh.is_empty());
        assert_eq!(mesh.num_points(), 0);
    }

    fn arb_soup() -> impl Strategy<Value = TetSoup> {
        // Integer coordinates on a small grid produce plenty of duplicates.
        let vertices = prop::collection::vec((0..3_i32, 0..3_i32, 0..3_i32), 4..40);
        vertices.prop_flat_map(|coords| {
            let n = coords.len();
            let tets = prop::collection::vec((prop::array::uniform4(0..n), 0..5_u32), 1..30);
            (Just(coords), tets)
        })
        .prop_map(|(coords, tets)| TetSoup {
            vertices: coords
                .into_iter()
                .map(|(x, y, z)| DVec3::new(f64::from(x), f64::from(y), f64::from(z)))
                .collect(),
            tets: tets
                .into_iter()
                .map(|(verts, material)| RawTet { verts, material })
                .collect(),
            faces: Vec::new(),
        })
    }

    proptest! {
        #[test]
        fn test_extraction_is_idempotent(soup in arb_soup()) {
            let once = extract_volume_mesh(&soup);
            let twice = extract_volume_mesh(&soup_of(&once));
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(once, extract_volume_mesh(&soup));
        }

        #[test]
        fn test_cells_preserve_positions(soup in arb_soup()) {
            let mesh = extract_volume_mesh(&soup);
            prop_assert_eq!(mesh.num_cells(), soup.num_tets());
            for t in 0..soup.num_tets() {
                prop_assert_eq!(mesh.cell_points(t), soup.tet_positions(t));
            }
        }
    }
}
