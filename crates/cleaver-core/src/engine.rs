//! The contract between the pipeline and a tetrahedral cleaving engine.
//!
//! An engine receives the validated [`Volume`] and an [`EngineConfig`] and
//! returns a [`TetSoup`]: a shared vertex table, tetrahedra referencing it by
//! index with one material label each, and the faces between them. The soup
//! must already be stripped of exterior tetrahedra. Any engine that honors
//! this contract can be plugged into the pipeline.

use glam::DVec3;

use crate::error::{CleaverError, EngineError, Result};
use crate::field::Volume;
use crate::options::EngineConfig;

/// A tetrahedron of the raw engine output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTet {
    /// Indices into [`TetSoup::vertices`].
    pub verts: [usize; 4],
    /// Material label.
    pub material: u32,
}

/// A triangular face of the raw engine output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFace {
    /// Indices into [`TetSoup::tets`]; boundary faces have one `None`.
    pub tets: [Option<usize>; 2],
    /// Indices into [`TetSoup::vertices`].
    pub verts: [usize; 3],
}

impl RawFace {
    /// Returns both neighbors if the face is shared by two tetrahedra.
    #[must_use]
    pub fn neighbors(&self) -> Option<(usize, usize)> {
        match self.tets {
            [Some(a), Some(b)] => Some((a, b)),
            _ => None,
        }
    }
}

/// Raw tetrahedral output of a cleaving engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TetSoup {
    pub vertices: Vec<DVec3>,
    pub tets: Vec<RawTet>,
    pub faces: Vec<RawFace>,
}

impl TetSoup {
    /// Returns the positions of the vertices of tetrahedron `index`.
    #[must_use]
    pub fn tet_positions(&self, index: usize) -> [DVec3; 4] {
        self.tets[index].verts.map(|v| self.vertices[v])
    }

    /// Returns the positions of the vertices of face `index`.
    #[must_use]
    pub fn face_positions(&self, index: usize) -> [DVec3; 3] {
        self.faces[index].verts.map(|v| self.vertices[v])
    }

    /// Returns the number of tetrahedra.
    #[must_use]
    pub fn num_tets(&self) -> usize {
        self.tets.len()
    }

    /// Returns true if the soup holds no tetrahedra.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tets.is_empty()
    }

    /// Checks that every vertex and tetrahedron reference is in range.
    pub fn check_indices(&self) -> Result<()> {
        let num_vertices = self.vertices.len();
        for (t, tet) in self.tets.iter().enumerate() {
            if let Some(&v) = tet.verts.iter().find(|&&v| v >= num_vertices) {
                return Err(CleaverError::InvalidSoup(format!(
                    "tetrahedron {t} references vertex {v} of {num_vertices}"
                )));
            }
        }
        for (f, face) in self.faces.iter().enumerate() {
            if let Some(&v) = face.verts.iter().find(|&&v| v >= num_vertices) {
                return Err(CleaverError::InvalidSoup(format!(
                    "face {f} references vertex {v} of {num_vertices}"
                )));
            }
            if let Some(t) = face.tets.iter().flatten().find(|&&t| t >= self.tets.len()) {
                return Err(CleaverError::InvalidSoup(format!(
                    "face {f} references tetrahedron {t} of {}",
                    self.tets.len()
                )));
            }
        }
        Ok(())
    }
}

/// A tetrahedral meshing engine.
///
/// The call is blocking. The engine gets exclusive access to the volume for
/// its duration and may attach a sizing field to it.
pub trait CleavingEngine {
    /// Returns a short name for log messages.
    fn name(&self) -> &str;

    /// Meshes the volume.
    fn cleave(&mut self, volume: &mut Volume, config: &EngineConfig) -> std::result::Result<TetSoup, EngineError>;
}

impl<E: CleavingEngine + ?Sized> CleavingEngine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn cleave(&mut self, volume: &mut Volume, config: &EngineConfig) -> std::result::Result<TetSoup, EngineError> {
        (**self).cleave(volume, config)
    }
}
