//! Indicator field construction and validation for cleaver-rs.
//!
//! This crate turns input images into the scalar fields a cleaving engine
//! consumes:
//! - [`FieldBuilder`] builds one field per label (segmentation mode) or per
//!   indicator image (indicator mode)
//! - [`validate_fields`] reports fields without a zero crossing and fields
//!   whose blur may have been truncated
//! - [`blur`] and [`distance_map`] hold the image filters used by the builder

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Grid sizes and kernel offsets move between integer and float types
#![allow(clippy::cast_precision_loss)]
// Loop indices used for multiple arrays
#![allow(clippy::needless_range_loop)]

pub mod blur;
pub mod builder;
pub mod distance_map;
pub mod validate;

pub use blur::{gaussian_blur, GaussianKernel};
pub use builder::{blur_may_truncate, FieldBuilder, FieldSet, InputMode, FIELD_NAME, INVERSE_SUFFIX};
pub use distance_map::{approximate_signed_distance_map, DistanceMapParams};
pub use validate::{validate_fields, Finding, Severity, ValidationReport};
