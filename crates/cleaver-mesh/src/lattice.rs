//! A reference cleaving engine on a regular background lattice.
//!
//! The lattice covers the bounds of the volume (plus `padding` cells on every
//! side) with cubes of a constant edge length. Each cube is split into six
//! tetrahedra around its main diagonal, which makes neighboring cubes
//! conform. A tetrahedron takes the material whose field is largest at its
//! centroid. Vertices are not moved onto material boundaries, so interfaces
//! follow the lattice faces.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::collections::HashMap;

use cleaver_core::{
    CleavingEngine, DVec3, EngineConfig, EngineError, RawFace, RawTet, ScalarField, SizingMode, TetSoup, UVec3, Volume,
};

/// Cube corners are numbered by bits: x = 1, y = 2, z = 4.
const CUBE_CORNERS: [[u32; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// The six positively oriented tetrahedra sharing the diagonal from corner 0 to 7.
const CUBE_TETS: [[usize; 4]; 6] = [
    [0, 1, 3, 7],
    [0, 1, 7, 5],
    [0, 2, 7, 3],
    [0, 2, 6, 7],
    [0, 4, 5, 7],
    [0, 4, 7, 6],
];

/// Vertex positions of the four faces of a tetrahedron.
const TET_FACES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];

/// Name of the sizing field attached to the volume.
pub const SIZING_FIELD_NAME: &str = "sizing";

/// Largest number of lattice cells the engine will generate.
pub const MAX_LATTICE_CELLS: usize = 1 << 24;

/// A [`CleavingEngine`] that labels a regular tetrahedral lattice.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatticeEngine;

impl LatticeEngine {
    /// Creates a lattice engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the lattice edge length for a volume with voxel `spacing`.
    #[must_use]
    pub fn step(spacing: DVec3, config: &EngineConfig) -> f64 {
        spacing.max_element() / config.sampling_rate * config.feature_scaling
    }
}

impl CleavingEngine for LatticeEngine {
    fn name(&self) -> &str {
        "lattice"
    }

    fn cleave(&mut self, volume: &mut Volume, config: &EngineConfig) -> Result<TetSoup, EngineError> {
        let Some(first) = volume.fields().first() else {
            return Err("volume has no material fields".into());
        };
        let (field_dims, field_spacing, field_origin) = (first.dims(), first.spacing(), first.origin());
        let Some((lo, hi)) = volume.bounds() else {
            return Err("volume has no material fields".into());
        };

        if config.sizing_mode == SizingMode::Adaptive {
            log::debug!("lattice engine has no adaptive sizing, using constant element size");
        }
        let step = Self::step(field_spacing, config);
        if !(step.is_finite() && step > 0.0) {
            return Err(format!("invalid lattice step {step}").into());
        }

        let padding = DVec3::splat(f64::from(config.padding) * step);
        let lo = lo - padding;
        let hi = hi + padding;
        let cells = ((hi - lo) / step).ceil().max(DVec3::ONE).as_uvec3();
        let num_cells = cells.x as usize * cells.y as usize * cells.z as usize;
        if num_cells > MAX_LATTICE_CELLS {
            return Err(format!("lattice of {cells} cells exceeds {MAX_LATTICE_CELLS} cells").into());
        }

        let sizing_data = vec![step as f32; field_dims.x as usize * field_dims.y as usize * field_dims.z as usize];
        let mut sizing = ScalarField::new(SIZING_FIELD_NAME, field_dims, field_spacing, sizing_data)?;
        sizing.set_origin(field_origin);
        volume.set_sizing_field(sizing);

        let soup = build_lattice(volume.fields(), lo, step, cells);
        let message = format!(
            "lattice engine: {} x {} x {} cells of size {step}, {} tetrahedra, {} faces",
            cells.x,
            cells.y,
            cells.z,
            soup.tets.len(),
            soup.faces.len()
        );
        if config.verbose {
            log::info!("{message}");
        } else {
            log::debug!("{message}");
        }
        Ok(soup)
    }
}

fn build_lattice(fields: &[ScalarField], lo: DVec3, step: f64, cells: UVec3) -> TetSoup {
    let points = cells + UVec3::ONE;
    let vertex = |i: u32, j: u32, k: u32| i as usize + points.x as usize * (j as usize + points.y as usize * k as usize);

    let mut vertices = Vec::with_capacity(points.x as usize * points.y as usize * points.z as usize);
    for k in 0..points.z {
        for j in 0..points.y {
            for i in 0..points.x {
                vertices.push(lo + UVec3::new(i, j, k).as_dvec3() * step);
            }
        }
    }

    let mut tets = Vec::new();
    for k in 0..cells.z {
        for j in 0..cells.y {
            for i in 0..cells.x {
                let corners = CUBE_CORNERS.map(|[di, dj, dk]| vertex(i + di, j + dj, k + dk));
                for local in CUBE_TETS {
                    let verts = local.map(|c| corners[c]);
                    let centroid = verts.iter().map(|&v| vertices[v]).sum::<DVec3>() / 4.0;
                    tets.push(RawTet {
                        verts,
                        material: dominant_material(fields, centroid),
                    });
                }
            }
        }
    }

    let faces = build_faces(&tets);
    TetSoup { vertices, tets, faces }
}

/// Returns the index of the field with the largest value at `p`.
fn dominant_material(fields: &[ScalarField], p: DVec3) -> u32 {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (index, field) in fields.iter().enumerate() {
        let value = field.sample(p);
        if value > best_value {
            best = index;
            best_value = value;
        }
    }
    best as u32
}

/// Pairs up the faces of `tets`; faces seen only once are boundary faces.
fn build_faces(tets: &[RawTet]) -> Vec<RawFace> {
    let mut faces: Vec<RawFace> = Vec::new();
    let mut lookup: HashMap<[usize; 3], usize> = HashMap::new();
    for (t, tet) in tets.iter().enumerate() {
        for local in TET_FACES {
            let verts = local.map(|c| tet.verts[c]);
            let mut key = verts;
            key.sort_unstable();
            match lookup.get(&key) {
                Some(&f) => faces[f].tets[1] = Some(t),
                None => {
                    lookup.insert(key, faces.len());
                    faces.push(RawFace {
                        tets: [Some(t), None],
                        verts,
                    });
                }
            }
        }
    }
    faces
}
