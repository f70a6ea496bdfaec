//! Configuration options for the meshing pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CleaverError, Result};

/// Options for field construction and the cleaving engine.
///
/// Missing keys in serialized options take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshingOptions {
    /// Gaussian blur sigma applied to every input, in physical units.
    pub sigma: f64,

    /// Treat a single input image as an indicator function rather than a label image.
    pub input_is_indicator_function: bool,

    /// Sizing field sampling rate. Smaller values create coarser meshes.
    pub sampling_rate: f64,

    /// Maximum rate of change of element size (Lipschitz constant of the sizing field).
    pub lipschitz: f64,

    /// Feature scaling. Higher values create coarser meshes.
    pub feature_scaling: f64,

    /// Number of background cells added around the data on every side.
    pub padding: u32,

    /// Initial alpha used for violation checks.
    pub alpha: f64,

    /// Alpha for long tetrahedron edges.
    pub alpha_long: f64,

    /// Alpha for short tetrahedron edges.
    pub alpha_short: f64,

    /// Iteration cap for the sizing field solver.
    pub max_iterations: u32,

    /// Element sizing strategy.
    pub sizing_mode: SizingMode,

    /// Ask the engine for verbose diagnostics.
    pub verbose: bool,
}

impl Default for MeshingOptions {
    fn default() -> Self {
        Self {
            sigma: 1.0,
            input_is_indicator_function: false,
            sampling_rate: 1.0,
            lipschitz: 0.2,
            feature_scaling: 1.0,
            padding: 0,
            alpha: 0.4,
            alpha_long: 0.357,
            alpha_short: 0.203,
            max_iterations: 1000,
            sizing_mode: SizingMode::Adaptive,
            verbose: false,
        }
    }
}

impl MeshingOptions {
    /// Parses options from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Reads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let options = Self::from_json_str(&json)?;
        log::debug!("loaded meshing options from {}", path.display());
        Ok(options)
    }

    /// Serializes the options to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that every option is in range.
    pub fn validate(&self) -> Result<()> {
        positive("sigma", self.sigma)?;
        positive("sampling_rate", self.sampling_rate)?;
        positive("lipschitz", self.lipschitz)?;
        positive("feature_scaling", self.feature_scaling)?;
        positive("alpha", self.alpha)?;
        positive("alpha_long", self.alpha_long)?;
        positive("alpha_short", self.alpha_short)?;
        if self.max_iterations == 0 {
            return Err(CleaverError::InvalidOption {
                name: "max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the engine-facing part of the options.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            alpha: self.alpha,
            alpha_long: self.alpha_long,
            alpha_short: self.alpha_short,
            inverse_lipschitz: 1.0 / self.lipschitz,
            sampling_rate: self.sampling_rate,
            feature_scaling: self.feature_scaling,
            padding: self.padding,
            sizing_mode: self.sizing_mode,
            max_iterations: self.max_iterations,
            verbose: self.verbose,
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CleaverError::InvalidOption {
            name,
            reason: format!("must be a positive finite number, got {value}"),
        })
    }
}

/// How the engine sizes elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SizingMode {
    /// Element size follows local feature size.
    #[default]
    Adaptive,
    /// Uniform element size.
    Constant,
}

/// Configuration handed to a [`CleavingEngine`](crate::engine::CleavingEngine).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub alpha: f64,
    pub alpha_long: f64,
    pub alpha_short: f64,
    /// Reciprocal of the Lipschitz rate.
    pub inverse_lipschitz: f64,
    pub sampling_rate: f64,
    pub feature_scaling: f64,
    pub padding: u32,
    pub sizing_mode: SizingMode,
    pub max_iterations: u32,
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        MeshingOptions::default().engine_config()
    }
}
