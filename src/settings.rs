//! Game settings
//!
//! Every tunable of a session, persisted as JSON. Missing fields fall back to
//! the defaults in `consts`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::audio::{AudioManager, SoundSink};
use crate::consts::*;
use crate::sim::{PaddleGeometry, Rules};

/// Settings load/save failures
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Simulation ===
    /// Nominal time between ticks (milliseconds)
    pub tick_interval_ms: u64,
    /// Score per paddle hit
    pub reward: u32,
    /// Per-tick acceleration while gravity is on
    pub gravity: Vec2,
    /// Whether gravity is on when a session starts
    pub gravity_enabled: bool,
    pub ball_start_pos: Vec2,
    pub ball_start_vel: Vec2,
    pub ball_radius: f32,
    pub paddle: PaddleGeometry,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Storage ===
    /// Where the best score is kept
    pub best_score_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_INTERVAL_MS,
            reward: REWARD,
            gravity: GRAVITY,
            gravity_enabled: true,
            ball_start_pos: BALL_START_POS,
            ball_start_vel: BALL_START_VEL,
            ball_radius: BALL_RADIUS,
            paddle: PaddleGeometry::default(),

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            best_score_path: PathBuf::from("best_score.json"),
        }
    }
}

impl Settings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Simulation rules derived from these settings
    pub fn rules(&self) -> Rules {
        Rules {
            reward: self.reward,
            gravity: self.gravity,
            ball_start_pos: self.ball_start_pos,
            ball_start_vel: self.ball_start_vel,
            ball_radius: self.ball_radius,
            paddle: self.paddle,
        }
    }

    /// Audio manager configured with these volumes
    pub fn audio(&self, sink: Arc<dyn SoundSink>) -> AudioManager {
        let mut audio = AudioManager::new(sink);
        audio.set_master_volume(self.master_volume);
        audio.set_sfx_volume(self.sfx_volume);
        audio.set_muted(self.muted);
        audio
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.tick_interval_ms == 0 {
            return Err(SettingsError::Invalid {
                field: "tick_interval_ms",
                reason: "must be positive".into(),
            });
        }
        if !(self.ball_radius > 0.0) {
            return Err(SettingsError::Invalid {
                field: "ball_radius",
                reason: format!("must be positive, got {}", self.ball_radius),
            });
        }
        let fractions = [
            ("paddle.width_fraction", self.paddle.width_fraction),
            ("paddle.height_fraction", self.paddle.height_fraction),
        ];
        for (field, value) in fractions {
            if !(value > 0.0 && value <= 1.0) {
                return Err(SettingsError::Invalid {
                    field,
                    reason: format!("must be in (0, 1], got {}", value),
                });
            }
        }
        if !(0.0..0.5).contains(&self.paddle.inset_fraction) {
            return Err(SettingsError::Invalid {
                field: "paddle.inset_fraction",
                reason: format!("must be in [0, 0.5), got {}", self.paddle.inset_fraction),
            });
        }
        Ok(())
    }

    /// Load and validate settings from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring settings at {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
