//! Approximate signed distance map.
//!
//! Voxels adjacent to a crossing of the level set between the inside and
//! outside values are seeded with the interpolated distance to the crossing.
//! Distances are then propagated with a forward and a backward chamfer sweep
//! over the 26-neighborhood, weighted by the physical distance between voxel
//! centers. Inside distances are negative.

#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]

use glam::{DVec3, UVec3};

/// Parameters of the distance map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceMapParams {
    /// Value representing the inside of the object.
    pub inside_value: f32,
    /// Value representing the outside of the object.
    pub outside_value: f32,
}

impl DistanceMapParams {
    /// Returns the level set value, halfway between inside and outside.
    #[must_use]
    pub fn level(&self) -> f32 {
        0.5 * (self.inside_value + self.outside_value)
    }

    /// Returns the sample offset from the level set, positive towards the inside.
    fn oriented(&self, v: f32) -> f64 {
        let d = f64::from(v) - f64::from(self.level());
        if self.inside_value >= self.outside_value {
            d
        } else {
            -d
        }
    }
}

/// Computes an approximate signed distance map of `data`.
///
/// Voxels with no reachable contour get the length of the grid diagonal,
/// signed by their side of the level set.
#[must_use]
pub fn approximate_signed_distance_map(
    data: &[f32],
    dims: UVec3,
    spacing: DVec3,
    params: DistanceMapParams,
) -> Vec<f32> {
    if data.is_empty() {
        return Vec::new();
    }
    let nx = dims.x as usize;
    let ny = dims.y as usize;
    let nz = dims.z as usize;
    let index = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);

    let phi: Vec<f64> = data.iter().map(|&v| params.oriented(v)).collect();
    let inside: Vec<bool> = phi.iter().map(|&p| p >= 0.0).collect();
    let mut dist = seed_contour(&phi, &inside, [nx, ny, nz], spacing);

    let (forward, backward) = chamfer_masks(spacing);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                relax(&mut dist, [i, j, k], [nx, ny, nz], &forward);
            }
        }
    }
    for k in (0..nz).rev() {
        for j in (0..ny).rev() {
            for i in (0..nx).rev() {
                relax(&mut dist, [i, j, k], [nx, ny, nz], &backward);
            }
        }
    }

    let far = (dims.as_dvec3() * spacing).length();
    let mut out = vec![0.0_f32; data.len()];
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let idx = index(i, j, k);
                let d = if dist[idx].is_finite() { dist[idx] } else { far };
                out[idx] = if inside[idx] { -d as f32 } else { d as f32 };
            }
        }
    }
    out
}

/// Seeds voxels next to a sign change with their distance to the crossing.
fn seed_contour(phi: &[f64], inside: &[bool], n: [usize; 3], spacing: DVec3) -> Vec<f64> {
    let [nx, ny, nz] = n;
    let index = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);
    let mut dist = vec![f64::INFINITY; phi.len()];

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let p = index(i, j, k);
                // Forward neighbors only; each edge updates both endpoints.
                let neighbors = [
                    (i + 1 < nx).then(|| (index(i + 1, j, k), spacing.x)),
                    (j + 1 < ny).then(|| (index(i, j + 1, k), spacing.y)),
                    (k + 1 < nz).then(|| (index(i, j, k + 1), spacing.z)),
                ];
                for (q, h) in neighbors.into_iter().flatten() {
                    if inside[p] == inside[q] {
                        continue;
                    }
                    let t = phi[p] / (phi[p] - phi[q]);
                    dist[p] = dist[p].min(t.abs() * h);
                    dist[q] = dist[q].min((1.0 - t).abs() * h);
                }
            }
        }
    }
    dist
}

type ChamferMask = Vec<([isize; 3], f64)>;

/// Splits the 26-neighborhood into the half visited before a voxel in
/// raster order and the half visited after it.
fn chamfer_masks(spacing: DVec3) -> (ChamferMask, ChamferMask) {
    let mut forward = Vec::with_capacity(13);
    let mut backward = Vec::with_capacity(13);
    for dk in -1..=1_isize {
        for dj in -1..=1_isize {
            for di in -1..=1_isize {
                if (di, dj, dk) == (0, 0, 0) {
                    continue;
                }
                let w = (DVec3::new(di as f64, dj as f64, dk as f64) * spacing).length();
                if (dk, dj, di) < (0, 0, 0) {
                    forward.push(([di, dj, dk], w));
                } else {
                    backward.push(([di, dj, dk], w));
                }
            }
        }
    }
    (forward, backward)
}

fn relax(dist: &mut [f64], at: [usize; 3], n: [usize; 3], mask: &ChamferMask) {
    let [nx, ny, nz] = n;
    let idx = at[0] + nx * (at[1] + ny * at[2]);
    let mut best = dist[idx];
    for (offset, w) in mask {
        let i = at[0] as isize + offset[0];
        let j = at[1] as isize + offset[1];
        let k = at[2] as isize + offset[2];
        if i < 0 || j < 0 || k < 0 || i >= nx as isize || j >= ny as isize || k >= nz as isize {
            continue;
        }
        let q = i as usize + nx * (j as usize + ny * k as usize);
        best = best.min(dist[q] + w);
    }
    dist[idx] = best;
}
