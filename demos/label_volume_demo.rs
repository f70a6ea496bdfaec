#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
//! Demo meshing a synthetic three-material label volume.
//!
//! Builds a 24^3 label image holding a sphere (label 2) inside a slab
//! (label 1) inside a background (label 0), meshes it with the lattice
//! engine, and prints per-material and per-interface statistics.
//!
//! Run with `RUST_LOG=info` to see the pipeline stages. An optional first
//! argument names a JSON file of meshing options.

use std::collections::BTreeMap;

use cleaver_rs::{
    decode_interface_key, init_logging, CleaverImageToMeshFilter, Image3, LatticeEngine, MeshingOptions, Result,
};
use glam::{DVec3, UVec3};

const SIZE: u32 = 24;

fn label_volume() -> Result<Image3<u8>> {
    let center = DVec3::splat(f64::from(SIZE) / 2.0);
    Image3::from_fn(UVec3::splat(SIZE), DVec3::splat(0.5), |i, j, k| {
        let p = DVec3::new(f64::from(i), f64::from(j), f64::from(k));
        if (p - center).length() < 5.0 {
            2
        } else if k >= SIZE / 3 && k < 2 * SIZE / 3 {
            1
        } else {
            0
        }
    })
}

fn main() -> Result<()> {
    init_logging();

    let options = match std::env::args().nth(1) {
        Some(path) => MeshingOptions::from_json_file(path)?,
        None => MeshingOptions {
            sigma: 0.5,
            ..MeshingOptions::default()
        },
    };
    println!("options:\n{}", options.to_json_string()?);

    let mut filter = CleaverImageToMeshFilter::with_options(LatticeEngine::new(), options);
    filter.push_input(label_volume()?);
    let output = filter.generate()?;

    println!("fields: {}", output.field_names.join(", "));
    for warning in &output.warnings {
        println!("warning: {warning}");
    }

    let tets = &output.tet_mesh;
    let mut per_material: BTreeMap<u32, (usize, f64)> = BTreeMap::new();
    for t in 0..tets.num_cells() {
        let entry = per_material.entry(tets.labels()[t]).or_default();
        entry.0 += 1;
        entry.1 += tets.signed_volume(t);
    }
    println!("{} points, {} tetrahedra", tets.num_points(), tets.num_cells());
    for (material, (count, volume)) in &per_material {
        println!("  material {material}: {count} tetrahedra, volume {volume:.3}");
    }

    let triangles = &output.triangle_mesh;
    let mut per_interface = vec![(0_usize, 0.0_f64); output.interface_keys.len()];
    for t in 0..triangles.num_cells() {
        let entry = &mut per_interface[triangles.labels()[t] as usize];
        entry.0 += 1;
        entry.1 += triangles.area(t);
    }
    println!("{} points, {} interface triangles", triangles.num_points(), triangles.num_cells());
    for (key, (count, area)) in output.interface_keys.iter().zip(&per_interface) {
        if let Some((a, b)) = decode_interface_key(*key) {
            println!("  interface {a}/{b} (key {key}): {count} triangles, area {area:.3}");
        }
    }

    Ok(())
}
