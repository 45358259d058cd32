//! Per-frame update
//!
//! Called once per display refresh, before the frame is drawn: due timers
//! fire in deadline order, then held keys move the player and a match is
//! checked.

use glam::Vec2;

use super::commands::EndReason;
use super::geometry::{clamp_to_surface, is_match};
use super::state::{MatchPhase, Session};
use super::timers::TimerKind;

/// Advance the session to host time `now_ms`
pub fn tick(session: &mut Session, now_ms: f64) {
    session.fire_due_timers(now_ms);

    let dt = match session.last_frame_ms {
        Some(last) => ((now_ms - last) / 1000.0) as f32,
        None => 0.0,
    };
    let dt = dt.clamp(0.0, session.config.max_frame_dt);
    session.last_frame_ms = Some(now_ms);

    if session.phase == MatchPhase::Running {
        session.step_movement(dt, now_ms);
    }
}

impl Session {
    /// Fire every timer due at or before `now_ms`, earliest first
    pub(super) fn fire_due_timers(&mut self, now_ms: f64) {
        while let Some((due, kind)) = self.timers.pop_due(now_ms) {
            log::trace!("Timer {:?} fired (due {})", kind, due);
            match kind {
                TimerKind::Countdown => self.countdown_step(due),
                TimerKind::SingleClick => self.resolve_single_click(due),
                TimerKind::Respawn => {
                    if self.phase.is_live() {
                        self.spawn_target();
                        log::debug!("Target respawned at {:?}", self.target.pos);
                    }
                }
            }
        }
    }

    /// One countdown interval. Keeps its cadence while paused but only
    /// decrements while running.
    fn countdown_step(&mut self, due_ms: f64) {
        if !self.phase.is_live() {
            return;
        }
        let step = self.config.countdown_step_ms;
        self.timers
            .schedule(TimerKind::Countdown, due_ms + step as f64);

        if self.phase != MatchPhase::Running {
            return;
        }
        self.remaining_ms = self
            .remaining_ms
            .saturating_sub(step)
            .min(self.config.match_duration_ms);
        if self.remaining_ms == 0 {
            self.end_match(due_ms, EndReason::TimeUp);
        }
    }

    /// Integrate held keys over `dt` seconds and check for a match
    pub(super) fn step_movement(&mut self, dt: f32, now_ms: f64) {
        let size = Vec2::splat(self.player.size);
        self.player.pos = clamp_to_surface(self.player.pos, size, self.surface);

        let dir = self.held.direction();
        if dir == Vec2::ZERO {
            return;
        }
        let moved = self.player.pos + dir * self.player.speed * dt;
        self.player.pos = clamp_to_surface(moved, size, self.surface);

        if self.target.active
            && is_match(
                &self.player.bounds(),
                &self.target.bounds(),
                self.config.match_tolerance,
            )
        {
            self.handle_match(now_ms);
        }
    }

    fn handle_match(&mut self, now_ms: f64) {
        let cooldown = self.config.match_cooldown_ms as f64;
        if let Some(last) = self.last_match_ms {
            if now_ms - last < cooldown {
                return;
            }
        }
        self.last_match_ms = Some(now_ms);
        self.points += self.config.match_points;
        self.target.active = false;
        let msg = format!(
            "Match (+{}). Total: {}",
            self.config.match_points, self.points
        );
        self.log_event(now_ms, msg);
        self.timers.schedule(
            TimerKind::Respawn,
            now_ms + self.config.respawn_delay_ms as f64,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::commands::{Command, dispatch};
    use crate::sim::input::{KeyAction, MovementKey};
    use crate::sim::state::Notice;
    use proptest::prelude::*;

    /// 60 Hz frame period
    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn started(seed: u64) -> Session {
        let mut s = Session::new(GameConfig::default(), seed, true).expect("valid config");
        dispatch(&mut s, Command::Start, 0.0).expect("start");
        tick(&mut s, 0.0);
        s
    }

    fn hold(s: &mut Session, key: MovementKey, now_ms: f64) {
        dispatch(
            s,
            Command::KeyDown {
                key: KeyAction::Move(key),
                editable_target: false,
            },
            now_ms,
        )
        .expect("key down");
    }

    #[test]
    fn test_no_movement_while_idle_or_paused() {
        let mut s = Session::new(GameConfig::default(), 1, true).expect("valid config");
        let start = s.player.pos;
        hold(&mut s, MovementKey::ArrowRight, 0.0);
        tick(&mut s, 0.0);
        tick(&mut s, 100.0);
        assert_eq!(s.player.pos, start);

        let mut s = started(1);
        dispatch(&mut s, Command::TogglePause, 0.0).expect("pause");
        hold(&mut s, MovementKey::ArrowRight, 0.0);
        tick(&mut s, 100.0);
        assert_eq!(s.player.pos, Vec2::new(380.0, 190.0));
    }

    #[test]
    fn test_movement_is_time_scaled() {
        let mut s = started(1);
        s.target.active = false;
        hold(&mut s, MovementKey::KeyD, 0.0);
        tick(&mut s, 100.0);
        // 260 px/s for 0.1 s
        assert!((s.player.pos.x - 406.0).abs() < 1e-3);
        assert_eq!(s.player.pos.y, 190.0);
    }

    #[test]
    fn test_large_frame_gap_is_clamped() {
        let mut s = started(1);
        s.target.active = false;
        hold(&mut s, MovementKey::KeyD, 0.0);
        tick(&mut s, 500.0);
        // dt capped at 0.1 s
        assert!((s.player.pos.x - 406.0).abs() < 1e-3);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut s = started(1);
        hold(&mut s, MovementKey::ArrowLeft, 0.0);
        hold(&mut s, MovementKey::ArrowRight, 0.0);
        tick(&mut s, 50.0);
        tick(&mut s, 100.0);
        assert_eq!(s.player.pos, Vec2::new(380.0, 190.0));
    }

    #[test]
    fn test_match_scores_and_respawns() {
        let mut s = started(3);
        // Target straight to the right of the player
        s.target.pos = Vec2::new(480.0, 190.0);
        s.target.active = true;
        hold(&mut s, MovementKey::ArrowRight, 0.0);

        let mut now = 0.0;
        while s.target.active {
            now += FRAME_MS;
            tick(&mut s, now);
            assert!(now < 1000.0, "player never reached the target");
        }
        assert_eq!(s.points, 100);
        assert!((s.player.pos.x - 480.0).abs() <= 8.0);
        let matched_at = now;

        // Still overlapping for the next frames: no second award
        dispatch(
            &mut s,
            Command::KeyUp {
                key: KeyAction::Move(MovementKey::ArrowRight),
            },
            now,
        )
        .expect("key up");
        tick(&mut s, matched_at + 100.0);
        assert!(!s.target.active);
        assert_eq!(s.points, 100);

        tick(&mut s, matched_at + 200.0);
        assert!(s.target.active);
        assert_eq!(s.points, 100);
        assert!(s
            .log
            .entries()
            .any(|e| e.message == "Match (+100). Total: 100"));
    }

    #[test]
    fn test_match_cooldown() {
        let mut s = started(3);
        s.target.pos = s.player.pos;
        s.target.active = true;
        s.handle_match(1000.0);
        assert_eq!(s.points, 100);
        s.target.active = true;
        s.handle_match(1100.0);
        assert_eq!(s.points, 100);
        s.handle_match(1200.0);
        assert_eq!(s.points, 200);
    }

    #[test]
    fn test_countdown_to_zero_ends_match() {
        let mut config = GameConfig::default();
        config.match_duration_ms = 3_000;
        let mut s = Session::new(config, 9, true).expect("valid config");
        dispatch(&mut s, Command::Start, 0.0).expect("start");

        tick(&mut s, 1_000.0);
        assert_eq!(s.remaining_ms, 2_000);
        tick(&mut s, 2_500.0);
        assert_eq!(s.remaining_ms, 1_000);
        assert_eq!(s.phase, MatchPhase::Running);

        tick(&mut s, 3_000.0);
        assert_eq!(s.remaining_ms, 0);
        assert_eq!(s.phase, MatchPhase::Ended);
        assert!(!s.target.active);
        assert_eq!(s.drain_notices(), vec![Notice::MatchOver { points: 0 }]);

        // No further decrements or timers
        tick(&mut s, 10_000.0);
        assert_eq!(s.remaining_ms, 0);
        assert_eq!(s.timers.pop_due(f64::MAX), None);
    }

    #[test]
    fn test_countdown_holds_while_paused() {
        let mut s = started(2);
        tick(&mut s, 1_000.0);
        assert_eq!(s.remaining_ms, 59_000);
        dispatch(&mut s, Command::TogglePause, 1_200.0).expect("pause");
        tick(&mut s, 5_000.0);
        assert_eq!(s.remaining_ms, 59_000);
        dispatch(&mut s, Command::TogglePause, 5_100.0).expect("resume");
        tick(&mut s, 6_000.0);
        assert_eq!(s.remaining_ms, 58_000);
    }

    #[test]
    fn test_points_reset_only_on_start_and_reset() {
        let mut s = started(4);
        s.target.pos = s.player.pos + Vec2::new(4.0, 0.0);
        hold(&mut s, MovementKey::KeyD, 0.0);
        tick(&mut s, FRAME_MS);
        assert_eq!(s.points, 100);
        dispatch(&mut s, Command::TogglePause, 20.0).expect("pause");
        dispatch(&mut s, Command::TogglePause, 30.0).expect("resume");
        assert_eq!(s.points, 100);
        dispatch(&mut s, Command::Reset, 40.0).expect("reset");
        assert_eq!(s.points, 0);
    }

    fn any_key() -> impl Strategy<Value = MovementKey> {
        prop_oneof![
            Just(MovementKey::ArrowUp),
            Just(MovementKey::ArrowDown),
            Just(MovementKey::ArrowLeft),
            Just(MovementKey::ArrowRight),
            Just(MovementKey::KeyW),
            Just(MovementKey::KeyA),
            Just(MovementKey::KeyS),
            Just(MovementKey::KeyD),
        ]
    }

    proptest! {
        #[test]
        fn player_stays_on_surface(
            keys in proptest::collection::vec(any_key(), 0..5),
            frames in proptest::collection::vec(0.0f64..5_000.0, 1..40),
            start_x in -100.0f32..1000.0,
            start_y in -100.0f32..600.0,
        ) {
            let mut s = started(11);
            s.player.pos = Vec2::new(start_x, start_y);
            for k in keys {
                s.held.press(k);
            }
            let mut now = 0.0;
            for gap in frames {
                now += gap;
                tick(&mut s, now);
                let p = s.player.pos;
                prop_assert!(p.x >= 0.0 && p.x <= 760.0);
                prop_assert!(p.y >= 0.0 && p.y <= 380.0);
            }
        }

        #[test]
        fn points_never_decrease(
            events in proptest::collection::vec((0u8..4, 0.0f64..400.0), 1..60),
        ) {
            let mut s = started(21);
            let mut now = 0.0;
            let mut last_points = s.points;
            for (kind, gap) in events {
                now += gap;
                let command = match kind {
                    0 => Command::Click { x: 1, y: 1 },
                    1 => Command::KeyDown {
                        key: KeyAction::Move(MovementKey::ArrowRight),
                        editable_target: false,
                    },
                    2 => Command::TogglePause,
                    _ => Command::PointerMove { x: 2, y: 2 },
                };
                let _ = dispatch(&mut s, command, now);
                tick(&mut s, now);
                prop_assert!(s.points >= last_points);
                last_points = s.points;
            }
        }
    }
}
