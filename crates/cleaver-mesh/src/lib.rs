//! Tetrahedral soup post-processing for cleaver-rs.
//!
//! A cleaving engine returns a [`TetSoup`](cleaver_core::TetSoup). This crate
//! turns it into the two output meshes:
//! - [`extract_volume_mesh`] deduplicates the soup into a labeled tetrahedral mesh
//! - [`extract_interface_mesh`] collects the triangles between different materials
//!
//! It also provides [`LatticeEngine`], a simple engine over a regular lattice.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Geometry code uses explicit index casts
#![allow(clippy::cast_precision_loss)]

pub mod interface;
pub mod lattice;
pub mod point_index;
pub mod volume;

pub use interface::{decode_interface_key, extract_interface, extract_interface_mesh, interface_key, InterfaceMesh};
pub use lattice::LatticeEngine;
pub use point_index::{PointIndex, POINT_TOLERANCE};
pub use volume::extract_volume_mesh;
