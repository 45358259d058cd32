//! Shape generation for the play surface
//!
//! Coordinates stay in surface pixels here; the pipeline maps them to NDC.

use glam::Vec2;

use super::vertex::{Vertex, colors};
use crate::sim::Session;
use crate::snap_to_pixel;

/// Two triangles covering an axis-aligned rectangle
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    let max = min + size;
    [
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Full frame: background, target (only while active), player on top.
/// Player position is snapped to whole pixels.
pub fn scene(session: &Session) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(18);

    vertices.extend(rect(Vec2::ZERO, session.surface, colors::BACKGROUND));

    let target = &session.target;
    if target.active {
        vertices.extend(rect(target.pos, Vec2::splat(target.size), colors::TARGET));
    }

    let player = &session.player;
    let pos = Vec2::new(snap_to_pixel(player.pos.x), snap_to_pixel(player.pos.y));
    vertices.extend(rect(pos, Vec2::splat(player.size), colors::PLAYER));

    vertices
}
