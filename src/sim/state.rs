//! Game session state
//!
//! One `Session` is the whole record of a play surface: player, target,
//! score, clock, input and log. The host owns it and hands it to
//! [`dispatch`](super::dispatch) and [`tick`](super::tick) in the order its
//! callbacks arrive.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::event_log::{EventLog, WallClock};
use super::geometry::{Aabb, clamp_to_surface};
use super::input::{ClickTracker, HeldKeys};
use super::placement::spawn_position;
use super::timers::TimerQueue;
use crate::config::{ConfigError, GameConfig};

/// Current phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPhase {
    /// No match yet, or after a reset/logout
    #[default]
    Idle,
    /// Clock running, movement and scoring live
    Running,
    /// Clock and movement frozen, still drawn
    Paused,
    /// Time ran out or the match was ended; final score shown
    Ended,
}

impl MatchPhase {
    /// Running or Paused
    pub fn is_live(self) -> bool {
        matches!(self, MatchPhase::Running | MatchPhase::Paused)
    }
}

/// Blocking notices for the host to show (alert/modal)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Start attempted without a session
    LoginRequired,
    /// Match finished
    MatchOver { points: u64 },
    /// Controls overview requested
    Help,
}

/// The player's square
#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner, sub-pixel
    pub pos: Vec2,
    pub size: f32,
    /// Pixels per second
    pub speed: f32,
}

impl Player {
    pub fn bounds(&self) -> Aabb {
        Aabb::square(self.pos, self.size)
    }
}

/// The square to catch
#[derive(Debug, Clone)]
pub struct Target {
    /// Top-left corner, whole pixels
    pub pos: Vec2,
    pub size: f32,
    /// False between a catch and the respawn, and outside a match
    pub active: bool,
}

impl Target {
    pub fn bounds(&self) -> Aabb {
        Aabb::square(self.pos, self.size)
    }
}

/// Complete game session
#[derive(Debug, Clone)]
pub struct Session {
    pub config: GameConfig,
    pub phase: MatchPhase,
    /// Mirror of the session collaborator; only changed by Login/Logout
    pub authenticated: bool,
    /// Non-decreasing within a match
    pub points: u64,
    /// Clamped to `[0, match_duration_ms]`
    pub remaining_ms: u32,
    /// Play surface size in pixels
    pub surface: Vec2,
    pub player: Player,
    pub target: Target,
    pub held: HeldKeys,
    pub clicks: ClickTracker,
    pub timers: TimerQueue,
    pub log: EventLog,
    pub clock: WallClock,
    /// Last pointer position over the surface
    pub pointer: Option<(i32, i32)>,
    pub(super) notices: Vec<Notice>,
    pub(super) rng: Pcg32,
    pub(super) last_frame_ms: Option<f64>,
    pub(super) last_match_ms: Option<f64>,
    pub(super) last_pointer_log_ms: Option<f64>,
}

impl Session {
    /// Create a fresh idle session. The config is validated first: a zero
    /// countdown step or a negative frame clamp would stall or panic the tick.
    pub fn new(config: GameConfig, seed: u64, authenticated: bool) -> Result<Self, ConfigError> {
        config.validate()?;
        let surface = Vec2::new(config.surface_width, config.surface_height);
        let mut session = Self {
            phase: MatchPhase::Idle,
            authenticated,
            points: 0,
            remaining_ms: config.match_duration_ms,
            surface,
            player: Player {
                pos: Vec2::ZERO,
                size: config.player_size,
                speed: config.player_speed,
            },
            target: Target {
                pos: Vec2::ZERO,
                size: config.target_size,
                active: false,
            },
            held: HeldKeys::default(),
            clicks: ClickTracker::default(),
            timers: TimerQueue::default(),
            log: EventLog::new(config.log_capacity),
            clock: WallClock::default(),
            pointer: None,
            notices: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            last_frame_ms: None,
            last_match_ms: None,
            last_pointer_log_ms: None,
            config,
        };
        session.center_player();
        Ok(session)
    }

    /// Write a gameplay log entry stamped with `now_ms`
    pub fn log_event(&mut self, now_ms: f64, message: impl Into<String>) {
        let stamp = self.clock.format(now_ms);
        self.log.push(stamp, message);
    }

    /// Take the notices raised since the last call
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn has_notices(&self) -> bool {
        !self.notices.is_empty()
    }

    /// Put the player in the middle of the surface, on whole pixels
    pub fn center_player(&mut self) {
        let size = Vec2::splat(self.player.size);
        let center = ((self.surface - size) / 2.0).round();
        self.player.pos = clamp_to_surface(center, size, self.surface);
    }

    /// Place the target at a random spot away from the player and activate it
    pub fn spawn_target(&mut self) {
        let placement = spawn_position(
            &mut self.rng,
            self.surface,
            self.target.size,
            self.player.pos,
            self.config.match_tolerance,
        );
        self.target.pos = placement.pos;
        self.target.active = true;
    }

    /// Keep player and target on the surface
    pub(super) fn clamp_entities(&mut self) {
        self.player.pos =
            clamp_to_surface(self.player.pos, Vec2::splat(self.player.size), self.surface);
        self.target.pos =
            clamp_to_surface(self.target.pos, Vec2::splat(self.target.size), self.surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle_and_centered() {
        let session = Session::new(GameConfig::default(), 1, false).expect("valid config");
        assert_eq!(session.phase, MatchPhase::Idle);
        assert_eq!(session.points, 0);
        assert_eq!(session.remaining_ms, 60_000);
        assert_eq!(session.player.pos, Vec2::new(380.0, 190.0));
        assert!(!session.target.active);
        assert!(session.log.is_empty());
    }

    #[test]
    fn test_spawn_target_activates_inside_surface() {
        let mut session = Session::new(GameConfig::default(), 42, true).expect("valid config");
        session.spawn_target();
        assert!(session.target.active);
        assert!(session.target.pos.x <= 760.0);
        assert!(session.target.pos.y <= 380.0);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = GameConfig::default();
        config.max_frame_dt = -1.0;
        assert_eq!(
            Session::new(config, 1, true).err(),
            Some(ConfigError::NotPositive("max_frame_dt"))
        );

        let mut config = GameConfig::default();
        config.countdown_step_ms = 0;
        assert_eq!(
            Session::new(config, 1, true).err(),
            Some(ConfigError::NotPositive("countdown_step_ms"))
        );

        let mut config = GameConfig::default();
        config.max_frame_dt = f32::NAN;
        assert!(Session::new(config, 1, true).is_err());
    }

    #[test]
    fn test_drain_notices() {
        let mut session = Session::new(GameConfig::default(), 1, true).expect("valid config");
        session.notices.push(Notice::Help);
        assert!(session.has_notices());
        assert_eq!(session.drain_notices(), vec![Notice::Help]);
        assert!(!session.has_notices());
    }
}
