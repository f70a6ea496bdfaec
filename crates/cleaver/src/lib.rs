//! cleaver-rs: multi-material tetrahedral meshing from label and indicator images.
//!
//! The pipeline turns a label image (or one image per material) into smooth
//! indicator fields, hands them to a cleaving engine, and extracts two meshes
//! from the engine's raw tetrahedra: a labeled volume mesh and the triangle
//! surface between materials.
//!
//! # Quick Start
//!
//! ```no_run
//! use cleaver_rs::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     // Two materials split along x
//!     let labels = Image3::from_fn(UVec3::splat(16), DVec3::ONE, |i, _, _| u8::from(i >= 8))?;
//!
//!     let mut filter = CleaverImageToMeshFilter::new(LatticeEngine::new());
//!     filter.set_sigma(0.5).push_input(labels);
//!     let output = filter.generate()?;
//!
//!     println!(
//!         "{} tetrahedra, {} interface triangles",
//!         output.tet_mesh.num_cells(),
//!         output.triangle_mesh.num_cells()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! # Stages
//!
//! - [`FieldBuilder`] - one field per label, or one per indicator image
//! - [`validate_fields`] - rejects fields without a zero crossing
//! - [`CleavingEngine`] - the meshing engine contract ([`LatticeEngine`] is a simple implementation)
//! - [`extract_volume_mesh`] and [`extract_interface_mesh`] - output meshes

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

mod filter;

// Re-export core types
pub use cleaver_core::{
    engine::{CleavingEngine, RawFace, RawTet, TetSoup},
    error::{CleaverError, EngineError, Result},
    field::{FieldStatus, ScalarField, Volume},
    image::Image3,
    mesh::{IndexedMesh, TetMesh, TriangleMesh, MAX_MATERIALS},
    options::{EngineConfig, MeshingOptions, SizingMode},
    DVec3, UVec3,
};

// Re-export field construction
pub use cleaver_fields::{validate_fields, FieldBuilder, FieldSet, Finding, InputMode, Severity, ValidationReport};

// Re-export mesh extraction
pub use cleaver_mesh::{
    decode_interface_key, extract_interface, extract_interface_mesh, extract_volume_mesh, interface_key,
    InterfaceMesh, LatticeEngine,
};

pub use filter::{mesh_images, CleaverImageToMeshFilter, CleaverOutput, ImageToMeshFilter};

/// Initializes logging from the `RUST_LOG` environment variable.
///
/// Calling this more than once has no effect.
pub fn init_logging() {
    if env_logger::try_init().is_ok() {
        log::info!("cleaver-rs {} logging initialized", env!("CARGO_PKG_VERSION"));
    }
}
