//! Random target placement
//!
//! Rejection sampling with an explicit ceiling: candidates landing within the
//! match tolerance of the player are resampled at most
//! [`MAX_SPAWN_ATTEMPTS`] times, then the last candidate is taken as is.
//! On a surface barely larger than the target that may produce an immediate
//! re-match; it never loops forever.

use glam::Vec2;
use rand::Rng;

use super::geometry::max_origin;
use crate::consts::MAX_SPAWN_ATTEMPTS;

/// Outcome of one spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Top-left corner, whole pixels
    pub pos: Vec2,
    /// Candidates drawn, including the accepted one
    pub attempts: u32,
    /// Retry ceiling reached; `pos` may sit on top of the player
    pub fell_back: bool,
}

fn too_close(candidate: Vec2, player_pos: Vec2, tolerance: f32) -> bool {
    (candidate.x - player_pos.x).abs() <= tolerance
        && (candidate.y - player_pos.y).abs() <= tolerance
}

/// Sample a target origin uniformly on integer pixels in
/// `[0, surface - target_size]`, away from `player_pos`.
pub fn spawn_position<R: Rng + ?Sized>(
    rng: &mut R,
    surface: Vec2,
    target_size: f32,
    player_pos: Vec2,
    tolerance: f32,
) -> Placement {
    let max = max_origin(Vec2::splat(target_size), surface);
    let max_x = max.x.floor() as u32;
    let max_y = max.y.floor() as u32;

    let mut attempts = 0;
    loop {
        let candidate = Vec2::new(
            rng.random_range(0..=max_x) as f32,
            rng.random_range(0..=max_y) as f32,
        );
        attempts += 1;

        if !too_close(candidate, player_pos, tolerance) {
            return Placement {
                pos: candidate,
                attempts,
                fell_back: false,
            };
        }
        if attempts >= MAX_SPAWN_ATTEMPTS {
            log::debug!(
                "Spawn ceiling hit after {} attempts, accepting ({}, {})",
                attempts,
                candidate.x,
                candidate.y
            );
            return Placement {
                pos: candidate,
                attempts,
                fell_back: true,
            };
        }
    }
}
