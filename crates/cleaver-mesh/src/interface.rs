//! Interface mesh extraction.
//!
//! Faces shared by two tetrahedra of different materials form the interface
//! surface. Each material pair `(a, b)` is identified by the key
//! `2^a + 2^b`; triangles are labeled with the position of their key in
//! order of first appearance.

#![allow(clippy::cast_possible_truncation)]

use std::collections::HashMap;

use cleaver_core::{CleaverError, Result, TetSoup, TriangleMesh};

use crate::point_index::PointIndex;

/// Number of material labels representable in an interface key.
pub const MAX_INTERFACE_LABELS: u32 = u64::BITS;

/// Returns the interface key of two distinct materials.
pub fn interface_key(a: u32, b: u32) -> Result<u64> {
    for label in [a, b] {
        if label >= MAX_INTERFACE_LABELS {
            return Err(CleaverError::LabelOutOfRange(label));
        }
    }
    Ok((1_u64 << a) + (1_u64 << b))
}

/// Returns the material pair `(low, high)` encoded by an interface key.
///
/// Returns `None` if `key` does not encode two distinct materials.
#[must_use]
pub fn decode_interface_key(key: u64) -> Option<(u32, u32)> {
    if key.count_ones() != 2 {
        return None;
    }
    let low = key.trailing_zeros();
    let high = u64::BITS - 1 - key.leading_zeros();
    Some((low, high))
}

/// An interface mesh together with the keys its labels refer to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterfaceMesh {
    /// Triangles labeled with an index into `keys`.
    pub mesh: TriangleMesh,
    /// Interface keys in order of first appearance.
    pub keys: Vec<u64>,
}

impl InterfaceMesh {
    /// Returns the material pair of triangle `index`.
    #[must_use]
    pub fn materials(&self, index: usize) -> Option<(u32, u32)> {
        let key = self.keys[self.mesh.labels()[index] as usize];
        decode_interface_key(key)
    }
}

/// Extracts the triangles separating different materials from `soup`.
pub fn extract_interface_mesh(soup: &TetSoup) -> Result<TriangleMesh> {
    Ok(extract_interface(soup)?.mesh)
}

/// Extracts the interface triangles and the key table of their labels.
///
/// # Panics
/// Panics if a face references a missing vertex or tetrahedron; see
/// [`TetSoup::check_indices`].
pub fn extract_interface(soup: &TetSoup) -> Result<InterfaceMesh> {
    let mut index = PointIndex::new();
    let mut key_index: HashMap<u64, u32> = HashMap::new();
    let mut keys = Vec::new();
    let mut cells = Vec::new();
    let mut labels = Vec::new();

    for face in &soup.faces {
        let Some((t0, t1)) = face.neighbors() else {
            continue;
        };
        let a = soup.tets[t0].material;
        let b = soup.tets[t1].material;
        if a == b {
            continue;
        }
        let key = interface_key(a, b)?;
        let label = *key_index.entry(key).or_insert_with(|| {
            keys.push(key);
            (keys.len() - 1) as u32
        });
        cells.push(face.verts.map(|v| index.insert(soup.vertices[v])));
        labels.push(label);
    }

    log::debug!(
        "interface mesh: {} points, {} triangles, {} interfaces",
        index.len(),
        cells.len(),
        keys.len()
    );
    Ok(InterfaceMesh {
        mesh: TriangleMesh::new(index.into_points(), cells, labels),
        keys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleaver_core::{DVec3, RawFace, RawTet};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn soup(materials: &[u32], faces: &[[Option<usize>; 2]]) -> TetSoup {
        // Each face gets its own three vertices; only their positions matter here.
        let vertices = (0..faces.len() * 3)
            .map(|i| DVec3::new(i as f64, (i % 3) as f64, 0.0))
            .collect();
        TetSoup {
            vertices,
            tets: materials
                .iter()
                .map(|&material| RawTet {
                    verts: [0, 0, 0, 0],
                    material,
                })
                .collect(),
            faces: faces
                .iter()
                .enumerate()
                .map(|(f, &tets)| RawFace {
                    tets,
                    verts: [3 * f, 3 * f + 1, 3 * f + 2],
                })
                .collect(),
        }
    }

    #[test]
    fn test_key_encoding() {
        assert_eq!(interface_key(0, 1).unwrap(), 3);
        assert_eq!(interface_key(2, 0).unwrap(), 5);
        assert_eq!(interface_key(63, 62).unwrap(), (1 << 63) + (1 << 62));
        assert_eq!(decode_interface_key(5), Some((0, 2)));
        assert_eq!(decode_interface_key(4), None);
        assert!(matches!(interface_key(64, 0), Err(CleaverError::LabelOutOfRange(64))));
    }

    #[test]
    fn test_skips_boundary_and_same_label_faces() {
        let soup = soup(
            &[0, 0, 1],
            &[
                [Some(0), None],
                [Some(0), Some(1)],
                [Some(1), Some(2)],
                [None, Some(2)],
            ],
        );
        let interface = extract_interface(&soup).unwrap();
        assert_eq!(interface.mesh.num_cells(), 1);
        assert_eq!(interface.mesh.points(), &soup.face_positions(2));
        assert_eq!(interface.keys, vec![3]);
        assert_eq!(interface.materials(0), Some((0, 1)));
    }

    #[test]
    fn test_keys_indexed_in_order_of_first_appearance() {
        let soup = soup(
            &[0, 2, 1],
            &[
                [Some(0), Some(1)],
                [Some(1), Some(2)],
                [Some(2), Some(0)],
                [Some(1), Some(0)],
            ],
        );
        let interface = extract_interface(&soup).unwrap();
        assert_eq!(interface.keys, vec![5, 6, 3]);
        assert_eq!(interface.mesh.labels(), &[0, 1, 2, 0]);
    }

    #[test]
    fn test_rejects_large_labels() {
        let soup = soup(&[0, 70], &[[Some(0), Some(1)]]);
        assert!(matches!(
            extract_interface_mesh(&soup),
            Err(CleaverError::LabelOutOfRange(70))
        ));
    }

    #[test]
    fn test_shared_face_vertices_are_merged() {
        let mut soup = soup(&[0, 1, 2], &[[Some(0), Some(1)], [Some(1), Some(2)]]);
        soup.faces[1].verts = [0, 1, 5];
        let mesh = extract_interface_mesh(&soup).unwrap();
        assert_eq!(mesh.num_points(), 4);
        assert_eq!(mesh.cells(), &[[0, 1, 2], [0, 1, 3]]);
    }

    fn arb_soup() -> impl Strategy<Value = TetSoup> {
        prop::collection::vec(0..6_u32, 1..12).prop_flat_map(|materials| {
            let n = materials.len();
            let faces = prop::collection::vec(
                (0..n, prop::option::of(0..n)).prop_map(|(a, b)| [Some(a), b]),
                0..40,
            );
            (Just(materials), faces)
        })
        .prop_map(|(materials, faces)| soup(&materials, &faces))
    }

    proptest! {
        #[test]
        fn test_only_mixed_faces_are_kept(soup in arb_soup()) {
            let interface = extract_interface(&soup).unwrap();
            let mixed = soup
                .faces
                .iter()
                .filter_map(RawFace::neighbors)
                .filter(|&(a, b)| soup.tets[a].material != soup.tets[b].material)
                .count();
            prop_assert_eq!(interface.mesh.num_cells(), mixed);
            for t in 0..interface.mesh.num_cells() {
                let (low, high) = interface.materials(t).unwrap();
                prop_assert!(low < high);
            }
        }

        #[test]
        fn test_one_key_per_material_pair(soup in arb_soup()) {
            let interface = extract_interface(&soup).unwrap();
            let pairs: HashSet<(u32, u32)> = soup
                .faces
                .iter()
                .filter_map(RawFace::neighbors)
                .map(|(a, b)| (soup.tets[a].material, soup.tets[b].material))
                .filter(|(a, b)| a != b)
                .map(|(a, b)| (a.min(b), a.max(b)))
                .collect();
            let labels: HashSet<u32> = interface.mesh.labels().iter().copied().collect();
            prop_assert_eq!(labels.len(), pairs.len());
            prop_assert_eq!(interface.keys.len(), pairs.len());
        }
    }
}
