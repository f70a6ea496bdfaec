//! Separable discrete Gaussian blur.
//!
//! The variance is given in physical units and converted to voxel units per
//! axis using the grid spacing. Samples outside the grid are clamped to the
//! nearest edge sample. Each output line only reads the previous pass, so
//! lines are blurred in parallel without affecting the result.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]

use glam::{DVec3, UVec3};
use rayon::prelude::*;

/// Largest kernel radius; keeps the kernel at most 31 taps wide.
pub const MAX_KERNEL_RADIUS: usize = 15;

/// Standard deviations below this (in voxels) leave an axis untouched.
const MIN_VOXEL_SIGMA: f64 = 1e-3;

/// A normalized, symmetric sampled Gaussian kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    weights: Vec<f64>,
}

impl GaussianKernel {
    /// Builds a kernel for a standard deviation in voxel units.
    ///
    /// Returns `None` when the deviation is too small to have an effect.
    #[must_use]
    pub fn new(voxel_sigma: f64) -> Option<Self> {
        if !(voxel_sigma >= MIN_VOXEL_SIGMA) {
            return None;
        }
        let radius = ((3.0 * voxel_sigma).ceil() as usize).clamp(1, MAX_KERNEL_RADIUS);
        let denom = 2.0 * voxel_sigma * voxel_sigma;
        let mut weights: Vec<f64> = (0..=2 * radius)
            .map(|i| {
                let x = i as f64 - radius as f64;
                (-x * x / denom).exp()
            })
            .collect();
        let sum: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= sum;
        }
        Some(Self { weights })
    }

    /// Returns the kernel radius in samples.
    #[must_use]
    pub fn radius(&self) -> usize {
        self.weights.len() / 2
    }

    /// Returns the kernel weights.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Convolves one position of a line of length `len`.
    fn apply(&self, len: usize, center: usize, fetch: impl Fn(usize) -> f32) -> f32 {
        let radius = self.radius() as isize;
        let last = len as isize - 1;
        let mut acc = 0.0_f64;
        for (offset, w) in (-radius..=radius).zip(&self.weights) {
            let idx = (center as isize + offset).clamp(0, last) as usize;
            acc += w * f64::from(fetch(idx));
        }
        acc as f32
    }
}

/// Blurs a grid with a Gaussian of variance `sigma^2` (physical units).
///
/// `data` is laid out x-fastest with the given dimensions.
#[must_use]
pub fn gaussian_blur(data: &[f32], dims: UVec3, spacing: DVec3, sigma: f64) -> Vec<f32> {
    let mut current = data.to_vec();
    if current.is_empty() {
        return current;
    }
    let mut scratch = vec![0.0_f32; current.len()];
    for axis in 0..3 {
        let Some(kernel) = GaussianKernel::new(sigma / spacing[axis]) else {
            continue;
        };
        convolve_axis(&current, &mut scratch, dims, axis, &kernel);
        std::mem::swap(&mut current, &mut scratch);
    }
    current
}

fn convolve_axis(src: &[f32], dst: &mut [f32], dims: UVec3, axis: usize, kernel: &GaussianKernel) {
    let nx = dims.x as usize;
    let ny = dims.y as usize;
    let nz = dims.z as usize;
    let at = |i: usize, j: usize, k: usize| src[i + nx * (j + ny * k)];

    dst.par_chunks_mut(nx * ny).enumerate().for_each(|(k, slice)| {
        for j in 0..ny {
            for i in 0..nx {
                slice[i + nx * j] = match axis {
                    0 => kernel.apply(nx, i, |ii| at(ii, j, k)),
                    1 => kernel.apply(ny, j, |jj| at(i, jj, k)),
                    _ => kernel.apply(nz, k, |kk| at(i, j, kk)),
                };
            }
        }
    });
}
