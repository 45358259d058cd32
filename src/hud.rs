//! HUD text and control state
//!
//! Pure functions of the session; the browser host copies the results into
//! the DOM every frame.

use crate::config::GameConfig;
use crate::sim::{MatchPhase, Notice, Session};

/// `MM:SS`, whole seconds rounded down, never negative
pub fn format_time(ms: u32) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn state_label(session: &Session) -> &'static str {
    if !session.authenticated {
        return "Login required";
    }
    match session.phase {
        MatchPhase::Ended => "Finished",
        MatchPhase::Paused => "Paused",
        MatchPhase::Running => "Running",
        MatchPhase::Idle => "Ready",
    }
}

pub fn pointer_label(x: i32, y: i32) -> String {
    format!("Mouse: ({}, {})", x, y)
}

/// Banner classes toggled on the play surface container
pub fn surface_classes(session: &Session) -> [(&'static str, bool); 3] {
    [
        ("paused", session.phase == MatchPhase::Paused),
        ("ended", session.phase == MatchPhase::Ended),
        ("logged-out", !session.authenticated),
    ]
}

/// Enabled state of the three match buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start_enabled: bool,
    pub pause_enabled: bool,
    pub reset_enabled: bool,
    pub pause_label: &'static str,
}

impl Controls {
    pub fn from_session(session: &Session) -> Self {
        let logged_in = session.authenticated;
        let live = session.phase.is_live();
        Self {
            start_enabled: logged_in && !live,
            pause_enabled: logged_in && live,
            reset_enabled: logged_in && session.phase != MatchPhase::Idle,
            pause_label: if session.phase == MatchPhase::Paused {
                "Resume"
            } else {
                "Pause"
            },
        }
    }
}

/// Controls overview shown on the help key
pub fn help_text(config: &GameConfig) -> String {
    [
        "Game controls:".to_string(),
        "- Start: \"Start\" button (login required).".to_string(),
        "- Pause/Resume: \"Pause\" button or Space.".to_string(),
        "- Move: arrow keys or WASD.".to_string(),
        format!(
            "- Catch the red square: +{} points.",
            config.match_points
        ),
        format!(
            "- Click: +{}..{} points.",
            config.click_points_min, config.click_points_max
        ),
        format!("- Double click: +{} points.", config.double_click_points),
        "- Right click: disabled.".to_string(),
        format!("- Time: {} seconds.", config.match_duration_ms / 1000),
    ]
    .join("\n")
}

/// Text of a blocking notice
pub fn notice_text(notice: &Notice, config: &GameConfig) -> String {
    match notice {
        Notice::LoginRequired => "You must log in to play.".to_string(),
        Notice::MatchOver { points } => format!("Match over! Points scored: {}", points),
        Notice::Help => help_text(config),
    }
}
