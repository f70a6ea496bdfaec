//! Indicator field construction from label or indicator images.
//!
//! # Modes
//!
//! - **Segmentation**: a single label image. Every integer label between the
//!   smallest and largest sample becomes one field named
//!   `SegmentationLabel<L>`, positive inside the label's region.
//! - **Indicator**: one or more real-valued images, each blurred and stored
//!   as-is under the shared name `SegmentationLabel`. A single indicator image
//!   is paired with its negation, named `SegmentationLabel-inverse`.

#![allow(clippy::cast_possible_truncation)]

use cleaver_core::{CleaverError, DVec3, Image3, Result, ScalarField, UVec3, MAX_MATERIALS};

use crate::blur::gaussian_blur;
use crate::distance_map::{approximate_signed_distance_map, DistanceMapParams};

/// Base name of every generated field.
pub const FIELD_NAME: &str = "SegmentationLabel";

/// Suffix of the synthesized complement of a single indicator field.
pub const INVERSE_SUFFIX: &str = "-inverse";

/// Voxels within this distance of a label value belong to that label.
pub const LABEL_TOLERANCE: f64 = 0.001;

/// Half-gap between the inside and outside values of the distance map.
pub const LEVEL_OFFSET: f32 = 0.1;

/// Ratio of sigma to the smallest volume extent above which the blur kernel
/// is reported as possibly truncated.
pub const TRUNCATION_RATIO: f64 = 0.1;

/// How the input images are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputMode {
    /// One label image.
    Segmentation,
    /// One or more indicator images.
    Indicator,
}

impl InputMode {
    /// Picks the mode for `num_inputs` images.
    ///
    /// A single image is a label image unless flagged as an indicator function.
    #[must_use]
    pub fn select(num_inputs: usize, input_is_indicator_function: bool) -> Self {
        if num_inputs < 2 && !input_is_indicator_function {
            Self::Segmentation
        } else {
            Self::Indicator
        }
    }
}

/// Fields produced from the inputs, in construction order.
#[derive(Debug, Clone)]
pub struct FieldSet {
    pub mode: InputMode,
    pub fields: Vec<ScalarField>,
}

/// Returns true if a blur of `sigma` may be truncated by the volume size.
#[must_use]
pub fn blur_may_truncate(dims: UVec3, spacing: DVec3, sigma: f64) -> bool {
    let smallest_extent = (dims.as_dvec3() * spacing).min_element();
    sigma / smallest_extent >= TRUNCATION_RATIO
}

/// Builds indicator fields from images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBuilder {
    sigma: f64,
}

impl FieldBuilder {
    /// Creates a builder blurring with standard deviation `sigma`.
    pub fn new(sigma: f64) -> Result<Self> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(CleaverError::InvalidOption {
                name: "sigma",
                reason: format!("must be a positive finite number, got {sigma}"),
            });
        }
        Ok(Self { sigma })
    }

    /// Returns the blur sigma.
    #[must_use]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Builds fields for `images`, choosing the mode from the image count and flag.
    pub fn build<T>(&self, images: &[Image3<T>], input_is_indicator_function: bool) -> Result<FieldSet>
    where
        T: Copy + Into<f64>,
    {
        let first = images.first().ok_or(CleaverError::NoInput)?;
        for (index, image) in images.iter().enumerate() {
            if image.is_empty() {
                return Err(CleaverError::InvalidOption {
                    name: "input",
                    reason: format!("image {index} has no voxels"),
                });
            }
            if image.dims() != first.dims() {
                return Err(CleaverError::DimensionMismatch {
                    index,
                    expected: first.dims().to_array(),
                    actual: image.dims().to_array(),
                });
            }
        }

        let mode = InputMode::select(images.len(), input_is_indicator_function);
        let fields = match mode {
            InputMode::Segmentation => self.segmentation_fields(first),
            InputMode::Indicator => self.indicator_fields(images),
        }?;
        Ok(FieldSet { mode, fields })
    }

    /// Builds one field per label of a label image.
    ///
    /// Fails with [`CleaverError::TooManyMaterials`] when the label range
    /// spans more than [`MAX_MATERIALS`] integers.
    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
    pub fn segmentation_fields<T>(&self, image: &Image3<T>) -> Result<Vec<ScalarField>>
    where
        T: Copy + Into<f64>,
    {
        let Some((min, max)) = image.value_range() else {
            return Ok(Vec::new());
        };
        let count = max.floor() - min.floor() + 1.0;
        if count > MAX_MATERIALS as f64 {
            return Err(CleaverError::TooManyMaterials {
                count: count as u64,
                max: MAX_MATERIALS,
            });
        }
        let min_label = min.floor() as i64;
        let max_label = max.floor() as i64;
        log::info!(
            "building segmentation fields for labels {min_label}..={max_label} (sigma {})",
            self.sigma
        );

        let dims = image.dims();
        let spacing = image.spacing();
        let mut fields = Vec::new();
        for label in min_label..=max_label {
            let target = label as f64;
            let isolated: Vec<f32> = image
                .samples()
                .iter()
                .map(|&v| if (Into::<f64>::into(v) - target).abs() <= LABEL_TOLERANCE { 1.0 } else { 0.0 })
                .collect();
            let warning = blur_may_truncate(dims, spacing, self.sigma);

            let blurred = gaussian_blur(&isolated, dims, spacing, self.sigma);
            let (lo, hi) = finite_range(&blurred);
            let mid = 0.5 * (lo + hi);
            let params = DistanceMapParams {
                inside_value: mid + LEVEL_OFFSET,
                outside_value: mid - LEVEL_OFFSET,
            };
            let distance = approximate_signed_distance_map(&blurred, dims, spacing, params);
            let data: Vec<f32> = distance.into_iter().map(|v| -v).collect();

            let mut field = ScalarField::new(format!("{FIELD_NAME}{label}"), dims, spacing, data)?;
            field.set_origin(image.origin()).set_warning(warning);
            log::debug!(
                "field '{}': blurred range [{lo}, {hi}], status {}, warning {warning}",
                field.name(),
                field.status()
            );
            fields.push(field);
        }
        Ok(fields)
    }

    /// Builds one field per indicator image.
    ///
    /// A single image is followed by its negation.
    pub fn indicator_fields<T>(&self, images: &[Image3<T>]) -> Result<Vec<ScalarField>>
    where
        T: Copy + Into<f64>,
    {
        let count = images.len().max(2);
        if count > MAX_MATERIALS {
            return Err(CleaverError::TooManyMaterials {
                count: count as u64,
                max: MAX_MATERIALS,
            });
        }
        log::info!(
            "building {} indicator field(s) (sigma {})",
            images.len(),
            self.sigma
        );
        let mut fields = Vec::with_capacity(images.len() + 1);
        for image in images {
            let cast = image.to_f32();
            let warning = blur_may_truncate(cast.dims(), cast.spacing(), self.sigma);
            let blurred = gaussian_blur(cast.samples(), cast.dims(), cast.spacing(), self.sigma);

            let mut field = ScalarField::new(FIELD_NAME, cast.dims(), cast.spacing(), blurred)?;
            field.set_origin(cast.origin()).set_warning(warning);
            log::debug!(
                "indicator field {}: status {}, warning {warning}",
                fields.len(),
                field.status()
            );
            fields.push(field);
        }

        if let [only] = fields.as_slice() {
            let inverse = only.inverse(format!("{}{INVERSE_SUFFIX}", only.name()));
            fields.push(inverse);
        }
        Ok(fields)
    }
}

/// Returns the minimum and maximum of the non-NaN samples.
fn finite_range(data: &[f32]) -> (f32, f32) {
    let (lo, hi) = data
        .iter()
        .filter(|v| !v.is_nan())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if lo > hi {
        (0.0, 0.0)
    } else {
        (lo, hi)
    }
}
