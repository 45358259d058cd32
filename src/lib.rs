//! Square Catch - a top-down "catch the square" arcade minigame
//!
//! Core modules:
//! - `sim`: Deterministic game session (movement, scoring, timers, match state machine)
//! - `renderer`: WebGPU rendering of the play surface
//! - `auth`: Login/session collaborator (query + login/logout signals)
//! - `hud`: Score/time/state text and control enablement
//! - `config`: Data-driven gameplay constants

pub mod auth;
pub mod config;
pub mod hud;
pub mod renderer;
pub mod sim;

pub use auth::{AuthChange, AuthHub, SessionUser};
pub use config::{ConfigError, GameConfig};
pub use sim::{Command, MatchPhase, Notice, Rejection, Session};

/// Game configuration constants
pub mod consts {
    /// Length of one match (60 seconds)
    pub const MATCH_DURATION_MS: u32 = 60_000;
    /// Countdown resolution
    pub const COUNTDOWN_STEP_MS: u32 = 1_000;

    /// Player square edge length (pixels)
    pub const PLAYER_SIZE: f32 = 40.0;
    /// Target square edge length (pixels)
    pub const TARGET_SIZE: f32 = 40.0;
    /// Player speed (pixels/second)
    pub const PLAYER_SPEED: f32 = 260.0;
    /// Per-axis distance at which player and target count as matched
    pub const MATCH_TOLERANCE: f32 = 8.0;

    /// Points for catching the target
    pub const MATCH_POINTS: u64 = 100;
    /// Minimum gap between two matches
    pub const MATCH_COOLDOWN_MS: u32 = 200;
    /// Delay before a caught target reappears
    pub const RESPAWN_DELAY_MS: u32 = 200;

    /// Double-click bonus
    pub const DOUBLE_CLICK_POINTS: u64 = 20;
    /// Single-click reward range (inclusive)
    pub const CLICK_POINTS_MIN: u64 = 1;
    pub const CLICK_POINTS_MAX: u64 = 10;
    /// Window used to tell a single click from the first half of a double click
    pub const CLICK_WINDOW_MS: u32 = 250;

    /// Event log capacity
    pub const LOG_CAPACITY: usize = 120;
    /// Minimum gap between two logged pointer moves
    pub const POINTER_LOG_INTERVAL_MS: u32 = 250;

    /// Largest frame delta fed to movement (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Play surface used until the host reports its real size
    pub const DEFAULT_SURFACE_WIDTH: f32 = 800.0;
    pub const DEFAULT_SURFACE_HEIGHT: f32 = 420.0;

    /// Rejection-sampling ceiling for target placement. Past this the last
    /// candidate is accepted so spawning always terminates.
    pub const MAX_SPAWN_ATTEMPTS: u32 = 50;
}

/// Round a sub-pixel coordinate to the pixel grid used for drawing
#[inline]
pub fn snap_to_pixel(v: f32) -> f32 {
    v.round()
}
