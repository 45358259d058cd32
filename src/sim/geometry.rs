//! Axis-aligned box tests for the play surface
//!
//! Everything here is pure and O(1). Coordinates are surface pixels with the
//! origin at the top-left corner and y growing downward.

use glam::Vec2;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Square box with the given edge length
    pub fn square(pos: Vec2, edge: f32) -> Self {
        Self::new(pos, Vec2::splat(edge))
    }

    /// Bottom-right corner
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }
}

/// Standard AABB intersection: projections overlap on both axes.
///
/// Touching edges do not count as overlap.
pub fn overlaps(a: &Aabb, b: &Aabb) -> bool {
    let (a_max, b_max) = (a.max(), b.max());
    a.pos.x < b_max.x && a_max.x > b.pos.x && a.pos.y < b_max.y && a_max.y > b.pos.y
}

/// Proximity match: the top-left corners are within `tolerance` of each
/// other on both axes. Looser than [`overlaps`] in the sense that it does
/// not care about box extents, stricter in that a partial overlap is not
/// enough.
pub fn is_match(a: &Aabb, b: &Aabb, tolerance: f32) -> bool {
    (a.pos.x - b.pos.x).abs() <= tolerance && (a.pos.y - b.pos.y).abs() <= tolerance
}

/// Largest top-left coordinate that keeps a box of `size` on the surface.
/// Collapses to zero when the surface is smaller than the box.
#[inline]
pub fn max_origin(size: Vec2, surface: Vec2) -> Vec2 {
    (surface - size).max(Vec2::ZERO)
}

/// Clamp a box origin into `[0, surface - size]` on both axes
#[inline]
pub fn clamp_to_surface(pos: Vec2, size: Vec2, surface: Vec2) -> Vec2 {
    pos.clamp(Vec2::ZERO, max_origin(size, surface))
}
