//! Gameplay configuration
//!
//! Every tunable of a match lives here. The browser host may override the
//! defaults with an inline JSON block; nothing is written back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(String),
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("click reward range {min}..={max} is empty")]
    EmptyClickRange { min: u64, max: u64 },
}

/// Tunable gameplay values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Match ===
    pub match_duration_ms: u32,
    pub countdown_step_ms: u32,

    // === Player / target ===
    pub player_size: f32,
    pub target_size: f32,
    /// Pixels per second
    pub player_speed: f32,
    pub match_tolerance: f32,

    // === Scoring ===
    pub match_points: u64,
    pub match_cooldown_ms: u32,
    pub respawn_delay_ms: u32,
    pub double_click_points: u64,
    pub click_points_min: u64,
    pub click_points_max: u64,
    pub click_window_ms: u32,

    // === Event log ===
    pub log_capacity: usize,
    pub pointer_log_interval_ms: u32,

    // === Frame pacing ===
    /// Frame deltas above this are clamped (tab switches, debugger pauses)
    pub max_frame_dt: f32,

    // === Surface ===
    pub surface_width: f32,
    pub surface_height: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            match_duration_ms: MATCH_DURATION_MS,
            countdown_step_ms: COUNTDOWN_STEP_MS,

            player_size: PLAYER_SIZE,
            target_size: TARGET_SIZE,
            player_speed: PLAYER_SPEED,
            match_tolerance: MATCH_TOLERANCE,

            match_points: MATCH_POINTS,
            match_cooldown_ms: MATCH_COOLDOWN_MS,
            respawn_delay_ms: RESPAWN_DELAY_MS,
            double_click_points: DOUBLE_CLICK_POINTS,
            click_points_min: CLICK_POINTS_MIN,
            click_points_max: CLICK_POINTS_MAX,
            click_window_ms: CLICK_WINDOW_MS,

            log_capacity: LOG_CAPACITY,
            pointer_log_interval_ms: POINTER_LOG_INTERVAL_MS,

            max_frame_dt: MAX_FRAME_DT,

            surface_width: DEFAULT_SURFACE_WIDTH,
            surface_height: DEFAULT_SURFACE_HEIGHT,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON override; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive_f32 = [
            ("player_size", self.player_size),
            ("target_size", self.target_size),
            ("player_speed", self.player_speed),
            ("max_frame_dt", self.max_frame_dt),
            ("surface_width", self.surface_width),
            ("surface_height", self.surface_height),
        ];
        for (name, value) in positive_f32 {
            // Written this way so NaN is rejected too
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive(name));
            }
        }
        if self.match_tolerance < 0.0 || self.match_tolerance.is_nan() {
            return Err(ConfigError::NotPositive("match_tolerance"));
        }
        if self.match_duration_ms == 0 {
            return Err(ConfigError::NotPositive("match_duration_ms"));
        }
        if self.countdown_step_ms == 0 {
            return Err(ConfigError::NotPositive("countdown_step_ms"));
        }
        if self.click_window_ms == 0 {
            return Err(ConfigError::NotPositive("click_window_ms"));
        }
        if self.log_capacity == 0 {
            return Err(ConfigError::NotPositive("log_capacity"));
        }
        if self.click_points_min > self.click_points_max {
            return Err(ConfigError::EmptyClickRange {
                min: self.click_points_min,
                max: self.click_points_max,
            });
        }
        Ok(())
    }

    /// Element id of the optional inline JSON override
    const CONFIG_ELEMENT_ID: &'static str = "game-config";

    /// Load overrides from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        match text.as_deref().map(Self::from_json) {
            Some(Ok(config)) => {
                log::info!("Loaded game config from #{}", Self::CONFIG_ELEMENT_ID);
                config
            }
            Some(Err(e)) => {
                log::warn!("Ignoring game config: {}", e);
                Self::default()
            }
            None => {
                log::info!("Using default game config");
                Self::default()
            }
        }
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No #{} element outside the browser", Self::CONFIG_ELEMENT_ID);
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.match_duration_ms, 60_000);
        assert_eq!(config.click_window_ms, 250);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "match_duration_ms": 30000, "player_speed": 300.0 }"#)
            .expect("valid override");
        assert_eq!(config.match_duration_ms, 30_000);
        assert_eq!(config.player_speed, 300.0);
        assert_eq!(config.player_size, PLAYER_SIZE);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(
            GameConfig::from_json(r#"{ "player_size": 0 }"#),
            Err(ConfigError::NotPositive("player_size"))
        );
        assert_eq!(
            GameConfig::from_json(r#"{ "click_points_min": 5, "click_points_max": 2 }"#),
            Err(ConfigError::EmptyClickRange { min: 5, max: 2 })
        );
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
