//! Core abstractions for cleaver-rs.
//!
//! This crate provides the types shared by every stage of the meshing pipeline:
//! - [`Image3`] input grids and [`ScalarField`] indicator fields
//! - [`Volume`], the set of fields handed to a [`CleavingEngine`]
//! - [`TetSoup`], the raw engine output, and [`IndexedMesh`], the final output
//! - [`MeshingOptions`] configuration and the [`CleaverError`] type

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Options structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]

pub mod engine;
pub mod error;
pub mod field;
pub mod image;
pub mod mesh;
pub mod options;

pub use engine::{CleavingEngine, RawFace, RawTet, TetSoup};
pub use error::{CleaverError, EngineError, Result};
pub use field::{FieldStatus, ScalarField, Volume};
pub use image::Image3;
pub use mesh::{IndexedMesh, TetMesh, TriangleMesh, MAX_MATERIALS};
pub use options::{EngineConfig, MeshingOptions, SizingMode};

// Re-export glam types for convenience
pub use glam::{DVec3, UVec3};
