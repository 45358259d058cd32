//! Match state machine
//!
//! Every host callback (button, key, pointer, auth signal, resize) becomes a
//! [`Command`] handed to [`dispatch`]. A command either applies completely or
//! is rejected without touching game state; rejections are logged and
//! returned so the host can surface them.

use glam::Vec2;
use rand::Rng;
use thiserror::Error;

use super::input::{ClickKind, KeyAction};
use super::state::{MatchPhase, Notice, Session};
use super::timers::TimerKind;

/// Input to the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Start,
    TogglePause,
    Reset,
    /// End the live match now
    End,
    ShowHelp,
    KeyDown {
        key: KeyAction,
        /// Focus is on an input/textarea/select/contenteditable element
        editable_target: bool,
    },
    KeyUp {
        key: KeyAction,
    },
    PointerMove {
        x: i32,
        y: i32,
    },
    Click {
        x: i32,
        y: i32,
    },
    /// Right click; always suppressed
    ContextMenu,
    /// Window blurred or tab hidden
    FocusLost,
    Login,
    Logout,
    Resize {
        width: f32,
        height: f32,
    },
}

/// Why a command was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{action} attempted without a session")]
    LoginRequired { action: &'static str },
    #[error("A match is already in progress")]
    AlreadyRunning,
    #[error("No match in progress")]
    NotRunning,
}

/// How a match finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    TimeUp,
    Manual,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::TimeUp => "time up",
            EndReason::Manual => "ended by player",
        }
    }
}

/// Apply one command at host time `now_ms`.
///
/// Timers that fell due before `now_ms` fire first, so a command never
/// observes a stale pending click or respawn.
pub fn dispatch(session: &mut Session, command: Command, now_ms: f64) -> Result<(), Rejection> {
    session.fire_due_timers(now_ms);

    match command {
        Command::Start => session.start(now_ms),
        Command::TogglePause => session.toggle_pause(now_ms),
        Command::Reset => {
            if !session.authenticated {
                return session.reject(now_ms, Rejection::LoginRequired { action: "Reset" });
            }
            session.reset_to_idle(now_ms);
            Ok(())
        }
        Command::End => {
            if !session.phase.is_live() {
                return session.reject(now_ms, Rejection::NotRunning);
            }
            session.end_match(now_ms, EndReason::Manual);
            Ok(())
        }
        Command::ShowHelp => {
            session.log_event(now_ms, "Help shown");
            session.notices.push(Notice::Help);
            Ok(())
        }
        Command::KeyDown {
            key,
            editable_target,
        } => {
            // Typing in a form field never drives the game, Space and Enter
            // included; the host leaves the browser default alone too.
            if editable_target {
                return Ok(());
            }
            match key {
                KeyAction::Move(k) => {
                    if session.held.press(k) {
                        let msg = format!("Key {} | Total={}", k.as_str(), session.points);
                        session.log_event(now_ms, msg);
                    }
                    Ok(())
                }
                KeyAction::TogglePause => session.toggle_pause(now_ms),
                KeyAction::ShowHelp => dispatch(session, Command::ShowHelp, now_ms),
                KeyAction::Other => Ok(()),
            }
        }
        Command::KeyUp { key } => {
            if let KeyAction::Move(k) = key {
                session.held.release(k);
            }
            Ok(())
        }
        Command::PointerMove { x, y } => {
            session.pointer = Some((x, y));
            let interval = session.config.pointer_log_interval_ms as f64;
            let due = session
                .last_pointer_log_ms
                .is_none_or(|last| now_ms - last >= interval);
            if due {
                session.last_pointer_log_ms = Some(now_ms);
                session.log_event(now_ms, format!("Pointer at X={} Y={}", x, y));
            }
            Ok(())
        }
        Command::Click { x, y } => {
            session.click(now_ms, x, y);
            Ok(())
        }
        Command::ContextMenu => {
            session.log_event(now_ms, "Right click disabled");
            Ok(())
        }
        Command::FocusLost => {
            session.held.clear();
            if session.phase == MatchPhase::Running && session.authenticated {
                session.pause(now_ms, "Auto-paused (focus lost)");
            }
            Ok(())
        }
        Command::Login => {
            session.authenticated = true;
            session.log_event(now_ms, "Session started");
            log::info!("Login observed");
            Ok(())
        }
        Command::Logout => {
            session.reset_to_idle(now_ms);
            session.authenticated = false;
            session.log_event(now_ms, "Session closed");
            log::info!("Logout observed, match reset");
            Ok(())
        }
        Command::Resize { width, height } => {
            session.surface = Vec2::new(width.max(0.0), height.max(0.0));
            session.clamp_entities();
            log::debug!("Surface resized to {}x{}", width, height);
            Ok(())
        }
    }
}

impl Session {
    fn reject(&mut self, now_ms: f64, rejection: Rejection) -> Result<(), Rejection> {
        self.log_event(now_ms, rejection.to_string());
        log::debug!("Rejected: {}", rejection);
        Err(rejection)
    }

    fn start(&mut self, now_ms: f64) -> Result<(), Rejection> {
        if !self.authenticated {
            self.notices.push(Notice::LoginRequired);
            return self.reject(now_ms, Rejection::LoginRequired { action: "Start" });
        }
        if self.phase.is_live() {
            return self.reject(now_ms, Rejection::AlreadyRunning);
        }

        self.timers.cancel_all();
        self.clicks.cancel();
        self.points = 0;
        self.remaining_ms = self.config.match_duration_ms;
        self.last_match_ms = None;
        self.phase = MatchPhase::Running;
        self.center_player();
        self.spawn_target();
        self.timers.schedule(
            TimerKind::Countdown,
            now_ms + self.config.countdown_step_ms as f64,
        );

        self.log_event(now_ms, "Match started");
        log::info!("Match started ({} ms)", self.remaining_ms);
        Ok(())
    }

    fn toggle_pause(&mut self, now_ms: f64) -> Result<(), Rejection> {
        if !self.authenticated {
            return self.reject(now_ms, Rejection::LoginRequired { action: "Pause" });
        }
        match self.phase {
            MatchPhase::Running => {
                self.pause(now_ms, "Match paused");
                Ok(())
            }
            MatchPhase::Paused => {
                self.phase = MatchPhase::Running;
                self.log_event(now_ms, "Match resumed");
                Ok(())
            }
            MatchPhase::Idle | MatchPhase::Ended => self.reject(now_ms, Rejection::NotRunning),
        }
    }

    fn pause(&mut self, now_ms: f64, message: &str) {
        self.phase = MatchPhase::Paused;
        // A click waiting on its debounce window would otherwise score while paused
        self.timers.cancel(TimerKind::SingleClick);
        self.clicks.cancel();
        self.log_event(now_ms, message);
    }

    /// Back to Idle from any phase. Cancels every timer.
    pub(super) fn reset_to_idle(&mut self, now_ms: f64) {
        self.timers.cancel_all();
        self.clicks.cancel();
        self.held.clear();
        self.points = 0;
        self.remaining_ms = self.config.match_duration_ms;
        self.last_match_ms = None;
        self.phase = MatchPhase::Idle;
        self.target.active = false;
        self.center_player();
        self.log_event(now_ms, "Match reset");
    }

    pub(super) fn end_match(&mut self, now_ms: f64, reason: EndReason) {
        self.phase = MatchPhase::Ended;
        self.timers.cancel_all();
        self.clicks.cancel();
        self.target.active = false;
        let msg = format!("Match over ({}). Points: {}", reason.as_str(), self.points);
        self.log_event(now_ms, msg);
        self.notices.push(Notice::MatchOver {
            points: self.points,
        });
        log::info!("Match over ({}), {} points", reason.as_str(), self.points);
    }

    fn click(&mut self, now_ms: f64, x: i32, y: i32) {
        if self.phase != MatchPhase::Running {
            return;
        }
        match self.clicks.click(now_ms, x, y) {
            ClickKind::Pending => {
                self.timers.schedule(
                    TimerKind::SingleClick,
                    now_ms + self.config.click_window_ms as f64,
                );
            }
            ClickKind::Double(_) => {
                self.timers.cancel(TimerKind::SingleClick);
                self.points += self.config.double_click_points;
                let msg = format!(
                    "Double click (+{}) at X={} Y={}. Total={}",
                    self.config.double_click_points, x, y, self.points
                );
                self.log_event(now_ms, msg);
            }
        }
    }

    /// Debounce window closed on a single click
    pub(super) fn resolve_single_click(&mut self, now_ms: f64) {
        let Some(click) = self.clicks.resolve() else {
            return;
        };
        if self.phase != MatchPhase::Running {
            return;
        }
        let reward = self
            .rng
            .random_range(self.config.click_points_min..=self.config.click_points_max);
        self.points += reward;
        let msg = format!(
            "Click (+{}) at X={} Y={}. Total={}",
            reward, click.x, click.y, self.points
        );
        self.log_event(now_ms, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::input::MovementKey;
    use crate::sim::tick;

    fn session(authenticated: bool) -> Session {
        Session::new(GameConfig::default(), 7, authenticated).expect("valid config")
    }

    fn started() -> Session {
        let mut s = session(true);
        dispatch(&mut s, Command::Start, 0.0).expect("start");
        s
    }

    #[test]
    fn test_start_requires_login() {
        let mut s = session(false);
        let result = dispatch(&mut s, Command::Start, 0.0);
        assert_eq!(
            result,
            Err(Rejection::LoginRequired { action: "Start" })
        );
        assert_eq!(s.phase, MatchPhase::Idle);
        assert_eq!(s.points, 0);
        assert_eq!(s.remaining_ms, 60_000);
        assert_eq!(s.log.len(), 1);
        assert_eq!(s.drain_notices(), vec![Notice::LoginRequired]);
    }

    #[test]
    fn test_start_initializes_match() {
        let s = started();
        assert_eq!(s.phase, MatchPhase::Running);
        assert_eq!(s.remaining_ms, 60_000);
        assert!(s.target.active);
        assert!(s.timers.is_scheduled(TimerKind::Countdown));
        assert_eq!(s.log.latest().map(|e| e.message.as_str()), Some("Match started"));
    }

    #[test]
    fn test_start_while_running_is_rejected() {
        let mut s = started();
        assert_eq!(dispatch(&mut s, Command::Start, 10.0), Err(Rejection::AlreadyRunning));
        assert_eq!(s.phase, MatchPhase::Running);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut s = started();
        dispatch(&mut s, Command::TogglePause, 100.0).expect("pause");
        assert_eq!(s.phase, MatchPhase::Paused);
        dispatch(&mut s, Command::TogglePause, 200.0).expect("resume");
        assert_eq!(s.phase, MatchPhase::Running);
    }

    #[test]
    fn test_pause_in_idle_is_rejected() {
        let mut s = session(true);
        assert_eq!(dispatch(&mut s, Command::TogglePause, 0.0), Err(Rejection::NotRunning));
        assert_eq!(s.phase, MatchPhase::Idle);
    }

    #[test]
    fn test_space_toggles_pause() {
        let mut s = started();
        let space = Command::KeyDown {
            key: KeyAction::TogglePause,
            editable_target: false,
        };
        dispatch(&mut s, space, 50.0).expect("pause");
        assert_eq!(s.phase, MatchPhase::Paused);
    }

    #[test]
    fn test_editable_target_keys_ignored() {
        let mut s = started();
        let before = s.log.len();
        dispatch(
            &mut s,
            Command::KeyDown {
                key: KeyAction::Move(MovementKey::KeyD),
                editable_target: true,
            },
            10.0,
        )
        .expect("ignored");
        dispatch(
            &mut s,
            Command::KeyDown {
                key: KeyAction::TogglePause,
                editable_target: true,
            },
            10.0,
        )
        .expect("ignored");
        assert!(s.held.is_empty());
        assert_eq!(s.phase, MatchPhase::Running);
        assert_eq!(s.log.len(), before);
    }

    #[test]
    fn test_key_repeat_logged_once() {
        let mut s = started();
        let before = s.log.len();
        let key = Command::KeyDown {
            key: KeyAction::Move(MovementKey::ArrowUp),
            editable_target: false,
        };
        dispatch(&mut s, key, 10.0).expect("press");
        dispatch(&mut s, key, 40.0).expect("repeat");
        assert_eq!(s.log.len(), before + 1);
        dispatch(&mut s, Command::KeyUp { key: KeyAction::Move(MovementKey::ArrowUp) }, 50.0)
            .expect("release");
        assert!(s.held.is_empty());
    }

    #[test]
    fn test_double_click_scores_once() {
        let mut s = started();
        dispatch(&mut s, Command::Click { x: 10, y: 10 }, 1000.0).expect("click");
        dispatch(&mut s, Command::Click { x: 10, y: 10 }, 1100.0).expect("click");
        // Long after the window: nothing else fires
        tick(&mut s, 1600.0);
        assert_eq!(s.points, 20);
        assert!(!s.timers.is_scheduled(TimerKind::SingleClick));
    }

    #[test]
    fn test_single_click_resolves_after_window() {
        let mut s = started();
        dispatch(&mut s, Command::Click { x: 3, y: 4 }, 0.0).expect("click");
        tick(&mut s, 249.0);
        assert_eq!(s.points, 0);
        tick(&mut s, 250.0);
        assert!((1..=10).contains(&s.points));
        assert!(s.log.latest().is_some_and(|e| e.message.starts_with("Click (+")));
    }

    #[test]
    fn test_second_click_after_window_is_two_singles() {
        let mut s = started();
        dispatch(&mut s, Command::Click { x: 0, y: 0 }, 0.0).expect("click");
        dispatch(&mut s, Command::Click { x: 0, y: 0 }, 300.0).expect("click");
        let after_first = s.points;
        assert!((1..=10).contains(&after_first));
        tick(&mut s, 600.0);
        assert!(s.points >= after_first + 1 && s.points <= after_first + 10);
    }

    #[test]
    fn test_clicks_ignored_when_not_running() {
        let mut s = session(true);
        dispatch(&mut s, Command::Click { x: 0, y: 0 }, 0.0).expect("ignored");
        tick(&mut s, 500.0);
        assert_eq!(s.points, 0);

        let mut s = started();
        dispatch(&mut s, Command::Click { x: 0, y: 0 }, 0.0).expect("click");
        dispatch(&mut s, Command::TogglePause, 100.0).expect("pause");
        tick(&mut s, 500.0);
        assert_eq!(s.points, 0);
    }

    #[test]
    fn test_context_menu_never_scores() {
        let mut s = started();
        dispatch(&mut s, Command::ContextMenu, 0.0).expect("suppressed");
        tick(&mut s, 1000.0);
        assert_eq!(s.points, 0);
        assert!(s
            .log
            .entries()
            .any(|e| e.message == "Right click disabled"));
    }

    #[test]
    fn test_end_reports_final_score() {
        let mut s = started();
        s.points = 140;
        dispatch(&mut s, Command::End, 5000.0).expect("end");
        assert_eq!(s.phase, MatchPhase::Ended);
        assert!(!s.target.active);
        assert_eq!(s.timers.pop_due(f64::MAX), None);
        assert_eq!(s.drain_notices(), vec![Notice::MatchOver { points: 140 }]);
        // Play again straight from Ended
        dispatch(&mut s, Command::Start, 6000.0).expect("restart");
        assert_eq!(s.points, 0);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut s = started();
        s.points = 300;
        s.held.press(MovementKey::KeyW);
        dispatch(&mut s, Command::Reset, 2000.0).expect("reset");
        assert_eq!(s.phase, MatchPhase::Idle);
        assert_eq!(s.points, 0);
        assert_eq!(s.remaining_ms, 60_000);
        assert!(s.held.is_empty());
        assert!(!s.target.active);
        assert!(!s.timers.is_scheduled(TimerKind::Countdown));
    }

    #[test]
    fn test_logout_forces_idle_and_disables_controls() {
        let mut s = started();
        s.points = 250;
        tick(&mut s, 3000.0);
        assert_eq!(s.remaining_ms, 57_000);

        dispatch(&mut s, Command::Logout, 3100.0).expect("logout");
        assert_eq!(s.phase, MatchPhase::Idle);
        assert!(!s.authenticated);
        assert_eq!(s.points, 0);
        assert_eq!(s.remaining_ms, 60_000);
        assert!(!s.timers.is_scheduled(TimerKind::Countdown));

        // Countdown no longer runs
        tick(&mut s, 10_000.0);
        assert_eq!(s.remaining_ms, 60_000);

        assert!(dispatch(&mut s, Command::Start, 10_100.0).is_err());
        assert!(dispatch(&mut s, Command::TogglePause, 10_200.0).is_err());

        dispatch(&mut s, Command::Login, 11_000.0).expect("login");
        dispatch(&mut s, Command::Start, 11_100.0).expect("start after login");
    }

    #[test]
    fn test_focus_lost_pauses_and_releases_keys() {
        let mut s = started();
        s.held.press(MovementKey::ArrowRight);
        dispatch(&mut s, Command::FocusLost, 500.0).expect("blur");
        assert_eq!(s.phase, MatchPhase::Paused);
        assert!(s.held.is_empty());
    }

    #[test]
    fn test_pointer_moves_are_throttled() {
        let mut s = session(true);
        dispatch(&mut s, Command::PointerMove { x: 1, y: 1 }, 0.0).expect("move");
        dispatch(&mut s, Command::PointerMove { x: 2, y: 2 }, 100.0).expect("move");
        dispatch(&mut s, Command::PointerMove { x: 3, y: 3 }, 300.0).expect("move");
        assert_eq!(s.log.len(), 2);
        assert_eq!(s.pointer, Some((3, 3)));
    }

    #[test]
    fn test_resize_keeps_player_on_surface() {
        let mut s = started();
        s.player.pos = Vec2::new(700.0, 350.0);
        dispatch(
            &mut s,
            Command::Resize {
                width: 400.0,
                height: 300.0,
            },
            0.0,
        )
        .expect("resize");
        assert_eq!(s.player.pos, Vec2::new(360.0, 260.0));
        assert!(s.target.pos.x <= 360.0 && s.target.pos.y <= 260.0);
    }
}
