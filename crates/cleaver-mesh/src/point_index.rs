//! Tolerant deduplication of points.

#![allow(clippy::cast_possible_truncation)]

use std::cmp::Ordering;
use std::collections::BTreeMap;

use glam::DVec3;

/// Coordinates closer than this are considered equal.
pub const POINT_TOLERANCE: f64 = 1e-9;

/// A point ordered lexicographically by x, y, z with [`POINT_TOLERANCE`].
#[derive(Debug, Clone, Copy)]
struct TolerantPoint(DVec3);

fn cmp_coord(a: f64, b: f64) -> Ordering {
    if (a - b).abs() <= POINT_TOLERANCE {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

impl Ord for TolerantPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_coord(self.0.x, other.0.x)
            .then_with(|| cmp_coord(self.0.y, other.0.y))
            .then_with(|| cmp_coord(self.0.z, other.0.z))
    }
}

impl PartialOrd for TolerantPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TolerantPoint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TolerantPoint {}

/// Assigns consecutive indices to distinct points in first-encounter order.
#[derive(Debug, Clone, Default)]
pub struct PointIndex {
    lookup: BTreeMap<TolerantPoint, u32>,
    points: Vec<DVec3>,
}

impl PointIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `p`, inserting it if no equal point is known.
    pub fn insert(&mut self, p: DVec3) -> u32 {
        let next = self.points.len() as u32;
        let index = *self.lookup.entry(TolerantPoint(p)).or_insert(next);
        if index == next {
            self.points.push(p);
        }
        index
    }

    /// Returns the index of `p` if an equal point is known.
    #[must_use]
    pub fn get(&self, p: DVec3) -> Option<u32> {
        self.lookup.get(&TolerantPoint(p)).copied()
    }

    /// Returns the number of distinct points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if no point has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the distinct points in index order.
    #[must_use]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Consumes the index, returning the distinct points.
    #[must_use]
    pub fn into_points(self) -> Vec<DVec3> {
        self.points
    }
}
