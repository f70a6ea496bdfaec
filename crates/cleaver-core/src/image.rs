//! Regular 3D image grids handed in by the image-loading collaborator.

use glam::{DVec3, UVec3};

use crate::error::{CleaverError, Result};

/// A dense 3D image with physical spacing.
///
/// Samples are stored with x varying fastest: the sample for voxel
/// (i, j, k) is at `i + nx * (j + ny * k)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Image3<T> {
    dims: UVec3,
    spacing: DVec3,
    origin: DVec3,
    samples: Vec<T>,
}

impl<T: Copy> Image3<T> {
    /// Creates an image with unit spacing at the origin.
    pub fn new(dims: UVec3, samples: Vec<T>) -> Result<Self> {
        Self::with_spacing(dims, DVec3::ONE, samples)
    }

    /// Creates an image with the given voxel spacing.
    pub fn with_spacing(dims: UVec3, spacing: DVec3, samples: Vec<T>) -> Result<Self> {
        let expected = num_voxels(dims);
        if samples.len() != expected {
            return Err(CleaverError::SizeMismatch {
                expected,
                actual: samples.len(),
            });
        }
        if spacing.min_element() <= 0.0 {
            return Err(CleaverError::InvalidOption {
                name: "spacing",
                reason: format!("spacing must be positive, got {spacing}"),
            });
        }
        Ok(Self {
            dims,
            spacing,
            origin: DVec3::ZERO,
            samples,
        })
    }

    /// Creates an image filled with a single value.
    pub fn filled(dims: UVec3, spacing: DVec3, value: T) -> Result<Self> {
        Self::with_spacing(dims, spacing, vec![value; num_voxels(dims)])
    }

    /// Creates an image by evaluating `f` at every voxel index.
    pub fn from_fn(dims: UVec3, spacing: DVec3, mut f: impl FnMut(u32, u32, u32) -> T) -> Result<Self> {
        let mut samples = Vec::with_capacity(num_voxels(dims));
        for k in 0..dims.z {
            for j in 0..dims.y {
                for i in 0..dims.x {
                    samples.push(f(i, j, k));
                }
            }
        }
        Self::with_spacing(dims, spacing, samples)
    }

    /// Sets the physical position of voxel (0, 0, 0).
    pub fn set_origin(&mut self, origin: DVec3) -> &mut Self {
        self.origin = origin;
        self
    }

    /// Returns the number of voxels along each axis.
    #[must_use]
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Returns the voxel spacing.
    #[must_use]
    pub fn spacing(&self) -> DVec3 {
        self.spacing
    }

    /// Returns the physical position of voxel (0, 0, 0).
    #[must_use]
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// Returns the samples.
    #[must_use]
    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    /// Returns the total number of voxels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the image has no voxels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Flattens a voxel index to a linear index.
    #[must_use]
    pub fn flatten_index(&self, i: u32, j: u32, k: u32) -> usize {
        flatten_index(self.dims, i, j, k)
    }

    /// Returns the sample at voxel (i, j, k).
    #[must_use]
    pub fn get(&self, i: u32, j: u32, k: u32) -> T {
        self.samples[self.flatten_index(i, j, k)]
    }

    /// Returns the physical extent (`dims * spacing`) along each axis.
    #[must_use]
    pub fn physical_extent(&self) -> DVec3 {
        self.dims.as_dvec3() * self.spacing
    }

    /// Applies `f` to every sample, keeping the grid geometry.
    pub fn map<U: Copy>(&self, f: impl FnMut(T) -> U) -> Image3<U> {
        Image3 {
            dims: self.dims,
            spacing: self.spacing,
            origin: self.origin,
            samples: self.samples.iter().copied().map(f).collect(),
        }
    }
}

impl<T: Copy + Into<f64>> Image3<T> {
    /// Returns the minimum and maximum sample values as `f64`.
    ///
    /// Returns `None` for an empty image.
    #[must_use]
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.samples.iter().map(|&v| Into::<f64>::into(v));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Casts every sample to `f32`.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn to_f32(&self) -> Image3<f32> {
        self.map(|v| Into::<f64>::into(v) as f32)
    }
}

/// Returns the number of voxels of a grid.
#[must_use]
pub fn num_voxels(dims: UVec3) -> usize {
    dims.x as usize * dims.y as usize * dims.z as usize
}

/// Flattens a voxel index for a grid with the given dimensions.
#[must_use]
pub fn flatten_index(dims: UVec3, i: u32, j: u32, k: u32) -> usize {
    i as usize + dims.x as usize * (j as usize + dims.y as usize * k as usize)
}
