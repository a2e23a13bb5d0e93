//! Game rules and timing
//!
//! Every tunable number the simulation reads lives here. Defaults come from
//! [`crate::consts`]; overrides are plain JSON, persisted in LocalStorage on
//! the web and read from a file on native.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// When the countdown driver ends the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimerEnd {
    /// End in the same step the countdown reaches zero
    #[default]
    OnZero,
    /// End one step later, when the value observed before decrementing is
    /// already zero (the displayed countdown briefly shows 0, then -1)
    AfterZero,
}

impl TimerEnd {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerEnd::OnZero => "on-zero",
            TimerEnd::AfterZero => "after-zero",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "on-zero" | "onzero" => Some(TimerEnd::OnZero),
            "after-zero" | "afterzero" | "legacy" => Some(TimerEnd::AfterZero),
            _ => None,
        }
    }
}

/// Game rules and driver timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Geometry ===
    /// Ball bounding box edge (pixels)
    pub ball_size: f32,
    /// Paddle width (pixels)
    pub paddle_width: f32,
    /// Paddle line distance from the viewport bottom
    pub paddle_line_offset: f32,
    /// Tolerance on each side of the paddle for bottom bounces
    pub catch_margin: f32,
    /// Lowest Y a ball is clamped to when bouncing off the top
    pub top_clamp: f32,

    // === Balls ===
    pub spawn_x: f32,
    pub spawn_y: f32,
    /// Initial ball speed (both axes)
    pub base_ball_speed: f32,
    /// Added per level to ramp-spawned balls
    pub speed_per_level: f32,

    // === Round ===
    pub round_seconds: i32,
    pub timer_end: TimerEnd,

    // === Drivers (milliseconds) ===
    pub physics_period_ms: u64,
    pub timer_period_ms: u64,
    pub ramp_period_ms: u64,
    pub score_flash_ms: u64,

    // === Demo autopilot ===
    pub autopilot_seed: u64,
    /// Maximum aim error (pixels) applied per approach
    pub autopilot_aim_error: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ball_size: BALL_SIZE,
            paddle_width: PADDLE_WIDTH,
            paddle_line_offset: PADDLE_LINE_OFFSET,
            catch_margin: CATCH_MARGIN,
            top_clamp: TOP_CLAMP,

            spawn_x: SPAWN_X,
            spawn_y: SPAWN_Y,
            base_ball_speed: BASE_BALL_SPEED,
            speed_per_level: SPEED_PER_LEVEL,

            round_seconds: ROUND_SECONDS,
            timer_end: TimerEnd::OnZero,

            physics_period_ms: PHYSICS_PERIOD_MS,
            timer_period_ms: TIMER_PERIOD_MS,
            ramp_period_ms: RAMP_PERIOD_MS,
            score_flash_ms: SCORE_FLASH_MS,

            autopilot_seed: 0x5ba11,
            autopilot_aim_error: 30.0,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Replace values the simulation cannot run with by their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.ball_size.is_nan() || self.ball_size <= 0.0 {
            log::warn!("ball_size {} invalid, using {}", self.ball_size, defaults.ball_size);
            self.ball_size = defaults.ball_size;
        }
        if self.paddle_width.is_nan() || self.paddle_width <= 0.0 {
            log::warn!(
                "paddle_width {} invalid, using {}",
                self.paddle_width,
                defaults.paddle_width
            );
            self.paddle_width = defaults.paddle_width;
        }
        if self.catch_margin < 0.0 {
            log::warn!("catch_margin {} negative, using 0", self.catch_margin);
            self.catch_margin = 0.0;
        }
        if self.top_clamp > 0.0 {
            log::warn!("top_clamp {} above the top edge, using 0", self.top_clamp);
            self.top_clamp = 0.0;
        }
        if self.round_seconds <= 0 {
            log::warn!(
                "round_seconds {} invalid, using {}",
                self.round_seconds,
                defaults.round_seconds
            );
            self.round_seconds = defaults.round_seconds;
        }
        if self.autopilot_aim_error < 0.0 {
            self.autopilot_aim_error = -self.autopilot_aim_error;
        }

        // A zero period would make a driver fire forever within one advance
        for (name, period, default) in [
            ("physics_period_ms", &mut self.physics_period_ms, defaults.physics_period_ms),
            ("timer_period_ms", &mut self.timer_period_ms, defaults.timer_period_ms),
            ("ramp_period_ms", &mut self.ramp_period_ms, defaults.ramp_period_ms),
            ("score_flash_ms", &mut self.score_flash_ms, defaults.score_flash_ms),
        ] {
            if *period == 0 {
                log::warn!("{} is zero, using {}", name, default);
                *period = default;
            }
        }

        self
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "space_ball_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings.sanitized();
                    }
                    Err(e) => log::warn!("Stored settings unreadable: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from a JSON file, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings.sanitized()
                }
                Err(e) => {
                    log::warn!("Settings in {} unreadable ({}), using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write settings to a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_path(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_consts() {
        let s = Settings::default();
        assert_eq!(s.ball_size, 20.0);
        assert_eq!(s.paddle_width, 100.0);
        assert_eq!(s.round_seconds, 60);
        assert_eq!(s.physics_period_ms, 20);
        assert_eq!(s.timer_period_ms, 1000);
        assert_eq!(s.ramp_period_ms, 10_000);
        assert_eq!(s.timer_end, TimerEnd::OnZero);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{ "round_seconds": 30, "timer_end": "AfterZero" }"#)
            .expect("valid json");
        assert_eq!(s.round_seconds, 30);
        assert_eq!(s.timer_end, TimerEnd::AfterZero);
        assert_eq!(s.paddle_width, PADDLE_WIDTH);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Settings::from_json("{ round_seconds: ").is_err());
    }

    #[test]
    fn test_sanitized_repairs_zero_periods() {
        let s = Settings {
            physics_period_ms: 0,
            ramp_period_ms: 0,
            round_seconds: -3,
            ball_size: 0.0,
            top_clamp: 12.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(s.physics_period_ms, PHYSICS_PERIOD_MS);
        assert_eq!(s.ramp_period_ms, RAMP_PERIOD_MS);
        assert_eq!(s.round_seconds, ROUND_SECONDS);
        assert_eq!(s.ball_size, BALL_SIZE);
        assert_eq!(s.top_clamp, 0.0);
    }

    #[test]
    fn test_timer_end_names() {
        assert_eq!(TimerEnd::from_str("LEGACY"), Some(TimerEnd::AfterZero));
        assert_eq!(TimerEnd::from_str(TimerEnd::OnZero.as_str()), Some(TimerEnd::OnZero));
        assert_eq!(TimerEnd::from_str("sometimes"), None);
    }

    #[test]
    fn test_json_round_trip_file() {
        let path = std::env::temp_dir().join("space_ball_settings_test.json");
        let s = Settings {
            round_seconds: 45,
            ..Default::default()
        };
        s.save_to_path(&path).expect("write settings");
        let loaded = Settings::load_from_path(&path);
        assert_eq!(loaded, s);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let loaded = Settings::load_from_path("/definitely/not/here/space_ball.json");
        assert_eq!(loaded, Settings::default());
    }
}
