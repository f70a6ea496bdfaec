//! Error types for cleaver-rs.

use thiserror::Error;

use crate::field::FieldStatus;

/// Boxed error raised by a [`CleavingEngine`](crate::engine::CleavingEngine).
///
/// Engine failures are passed through to the caller without interpretation.
pub type EngineError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for cleaver-rs operations.
#[derive(Error, Debug)]
pub enum CleaverError {
    /// No input image was supplied.
    #[error("no input image supplied - a label image or at least one indicator image is required")]
    NoInput,

    /// An option is outside its valid range.
    #[error("invalid option '{name}': {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Indicator images do not share a grid.
    #[error("input image {index} has dimensions {actual:?}, expected {expected:?}")]
    DimensionMismatch {
        index: usize,
        expected: [u32; 3],
        actual: [u32; 3],
    },

    /// A validated field has no sign change (or contains NaN).
    #[error(
        "no zero crossing in indicator function '{field}' ({status}) - not a valid input or sigma is too large, try a lower sigma"
    )]
    NoZeroCrossing { field: String, status: FieldStatus },

    /// A material label is too large for the interface key encoding.
    #[error("material label {0} is out of range for interface keys (must be below 64)")]
    LabelOutOfRange(u32),

    /// The inputs describe more materials than interface keys can encode.
    #[error("{count} materials requested, at most {max} are supported")]
    TooManyMaterials { count: u64, max: usize },

    /// The engine output references vertices or tetrahedra that do not exist.
    #[error("invalid engine output: {0}")]
    InvalidSoup(String),

    /// The cleaving engine failed.
    #[error(transparent)]
    Engine(EngineError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for cleaver-rs operations.
pub type Result<T> = std::result::Result<T, CleaverError>;
