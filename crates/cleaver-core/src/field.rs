//! Scalar indicator fields and the volume handed to the cleaving engine.
//!
//! A [`ScalarField`] is a dense grid of `f32` samples whose zero level set
//! approximates one material boundary. Each field carries a validity
//! [`FieldStatus`] computed from a single scan over its samples and a
//! `warning` flag raised when the blur kernel may have been truncated.

use std::fmt;

use glam::{DVec3, UVec3};
use serde::{Deserialize, Serialize};

use crate::error::{CleaverError, Result};
use crate::image::{flatten_index, num_voxels, Image3};

/// Validity status of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    /// The field crosses zero and contains no NaN.
    #[default]
    None,
    /// At least one sample is NaN.
    Nan,
    /// The field never changes sign.
    MaxMin,
}

impl FieldStatus {
    /// Returns true if this status prevents the field from being cleaved.
    #[must_use]
    pub fn is_fatal(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Computes the status of a sample buffer.
    ///
    /// The first NaN marks the buffer as [`FieldStatus::Nan`]; otherwise a
    /// buffer whose minimum is non-negative or whose maximum is non-positive
    /// is [`FieldStatus::MaxMin`].
    #[must_use]
    pub fn scan(samples: &[f32]) -> Self {
        let mut status = Self::None;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in samples {
            if v.is_nan() {
                if status == Self::None {
                    status = Self::Nan;
                }
            } else {
                min = min.min(v);
                max = max.max(v);
            }
        }
        if status == Self::None && (min >= 0.0 || max <= 0.0) {
            status = Self::MaxMin;
        }
        status
    }
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Nan => "nan",
            Self::MaxMin => "maxmin",
        };
        f.write_str(s)
    }
}

/// A dense 3D grid of `f32` samples with a name and validity bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    name: String,
    dims: UVec3,
    spacing: DVec3,
    origin: DVec3,
    data: Vec<f32>,
    status: FieldStatus,
    warning: bool,
}

impl ScalarField {
    /// Creates a field from samples laid out x-fastest.
    ///
    /// The status is computed from `data` immediately.
    pub fn new(name: impl Into<String>, dims: UVec3, spacing: DVec3, data: Vec<f32>) -> Result<Self> {
        let expected = num_voxels(dims);
        if data.len() != expected {
            return Err(CleaverError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        let status = FieldStatus::scan(&data);
        Ok(Self {
            name: name.into(),
            dims,
            spacing,
            origin: DVec3::ZERO,
            data,
            status,
            warning: false,
        })
    }

    /// Creates a field with the geometry of `image` and the given samples.
    pub fn from_image(name: impl Into<String>, image: &Image3<f32>) -> Result<Self> {
        let mut field = Self::new(name, image.dims(), image.spacing(), image.samples().to_vec())?;
        field.origin = image.origin();
        Ok(field)
    }

    /// Returns a field holding the pointwise negation of this one.
    ///
    /// The new field keeps the geometry and warning flag; its status is
    /// recomputed from the negated samples.
    #[must_use]
    pub fn inverse(&self, name: impl Into<String>) -> Self {
        let data: Vec<f32> = self.data.iter().map(|v| -v).collect();
        let status = FieldStatus::scan(&data);
        Self {
            name: name.into(),
            dims: self.dims,
            spacing: self.spacing,
            origin: self.origin,
            data,
            status,
            warning: self.warning,
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the field name.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Returns the number of samples along each axis.
    #[must_use]
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Returns the physical spacing between samples.
    #[must_use]
    pub fn spacing(&self) -> DVec3 {
        self.spacing
    }

    /// Returns the physical position of sample (0, 0, 0).
    #[must_use]
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// Sets the physical position of sample (0, 0, 0).
    pub fn set_origin(&mut self, origin: DVec3) -> &mut Self {
        self.origin = origin;
        self
    }

    /// Returns the samples.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the validity status.
    #[must_use]
    pub fn status(&self) -> FieldStatus {
        self.status
    }

    /// Returns true if the blur kernel may have been truncated.
    #[must_use]
    pub fn warning(&self) -> bool {
        self.warning
    }

    /// Sets the truncation warning flag.
    pub fn set_warning(&mut self, warning: bool) -> &mut Self {
        self.warning = warning;
        self
    }

    /// Returns the sample at grid index (i, j, k).
    #[must_use]
    pub fn get(&self, i: u32, j: u32, k: u32) -> f32 {
        self.data[flatten_index(self.dims, i, j, k)]
    }

    /// Returns the physical extent of the sampled region (`dims * spacing`).
    #[must_use]
    pub fn bounds(&self) -> (DVec3, DVec3) {
        (self.origin, self.origin + self.dims.as_dvec3() * self.spacing)
    }

    /// Trilinearly interpolates the field at a physical position.
    ///
    /// Sample (i, j, k) sits at `origin + (i, j, k) * spacing`; positions
    /// outside the grid are clamped to the nearest sample.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn sample(&self, p: DVec3) -> f32 {
        let max_index = self.dims.saturating_sub(UVec3::ONE).as_dvec3();
        let g = ((p - self.origin) / self.spacing).clamp(DVec3::ZERO, max_index);
        let base = g.floor().min(max_index);
        let t = g - base;
        let i0 = base.x as u32;
        let j0 = base.y as u32;
        let k0 = base.z as u32;
        let i1 = (i0 + 1).min(self.dims.x - 1);
        let j1 = (j0 + 1).min(self.dims.y - 1);
        let k1 = (k0 + 1).min(self.dims.z - 1);

        let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t;
        let v = |i, j, k| f64::from(self.get(i, j, k));

        let c00 = lerp(v(i0, j0, k0), v(i1, j0, k0), t.x);
        let c10 = lerp(v(i0, j1, k0), v(i1, j1, k0), t.x);
        let c01 = lerp(v(i0, j0, k1), v(i1, j0, k1), t.x);
        let c11 = lerp(v(i0, j1, k1), v(i1, j1, k1), t.x);
        let c0 = lerp(c00, c10, t.y);
        let c1 = lerp(c01, c11, t.y);
        lerp(c0, c1, t.z) as f32
    }

    /// Converts the field back into an image with the same grid.
    pub fn to_image(&self) -> Result<Image3<f32>> {
        let mut image = Image3::with_spacing(self.dims, self.spacing, self.data.clone())?;
        image.set_origin(self.origin);
        Ok(image)
    }
}

/// The set of indicator fields meshed together, plus an optional sizing field.
///
/// A volume is built for a single meshing invocation; the engine may attach
/// the sizing field it derived so callers can inspect it afterwards.
#[derive(Debug, Clone, Default)]
pub struct Volume {
    fields: Vec<ScalarField>,
    sizing_field: Option<ScalarField>,
}

impl Volume {
    /// Creates a volume from material fields.
    #[must_use]
    pub fn new(fields: Vec<ScalarField>) -> Self {
        Self {
            fields,
            sizing_field: None,
        }
    }

    /// Returns the material fields.
    #[must_use]
    pub fn fields(&self) -> &[ScalarField] {
        &self.fields
    }

    /// Returns the number of materials.
    #[must_use]
    pub fn num_materials(&self) -> usize {
        self.fields.len()
    }

    /// Returns the sizing field, if one has been set.
    #[must_use]
    pub fn sizing_field(&self) -> Option<&ScalarField> {
        self.sizing_field.as_ref()
    }

    /// Sets the sizing field.
    pub fn set_sizing_field(&mut self, field: ScalarField) -> &mut Self {
        self.sizing_field = Some(field);
        self
    }

    /// Returns the physical bounds shared by all fields.
    #[must_use]
    pub fn bounds(&self) -> Option<(DVec3, DVec3)> {
        self.fields.iter().map(ScalarField::bounds).reduce(|(amin, amax), (bmin, bmax)| {
            (amin.min(bmin), amax.max(bmax))
        })
    }

    /// Consumes the volume, returning its fields.
    #[must_use]
    pub fn into_fields(self) -> Vec<ScalarField> {
        self.fields
    }
}
