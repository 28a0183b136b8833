//! Paddle Bounce - a two-paddle ball-bounce game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, paddles, ball, collisions, game state)
//! - `session`: Tick driver, input handling and state-change notifications
//! - `best_score`: Reconciles finished games against the persisted best score
//! - `persistence`: Best-score stores (in-memory, JSON file)
//! - `audio`: Sound cue routing
//! - `settings`: Tunables loaded from JSON

pub mod audio;
pub mod best_score;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;

pub use audio::{AudioManager, SoundCue, SoundSink};
pub use best_score::{BestScoreReconciler, ReconcileDecision};
pub use persistence::{BestScoreRecord, BestScoreStore, JsonFileStore, MemoryStore, StoreError};
pub use session::{Session, SessionSnapshot};
pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Nominal tick interval of the simulation driver (milliseconds)
    pub const TICK_INTERVAL_MS: u64 = 100;

    /// Score granted per paddle hit
    pub const REWARD: u32 = 10;

    /// Constant acceleration added to the ball velocity each tick when gravity is on
    pub const GRAVITY: Vec2 = Vec2::new(0.0, 1.5);

    /// Ball defaults
    pub const BALL_START_POS: Vec2 = Vec2::new(150.0, 50.0);
    pub const BALL_START_VEL: Vec2 = Vec2::new(45.0, 10.0);
    pub const BALL_RADIUS: f32 = 45.0;

    /// Paddle size as a fraction of the canvas (width, height)
    pub const PADDLE_WIDTH_FRACTION: f32 = 0.03;
    pub const PADDLE_HEIGHT_FRACTION: f32 = 0.45;
    /// Horizontal inset of each paddle from its canvas edge, as a fraction of canvas width
    pub const PADDLE_INSET_FRACTION: f32 = 0.01;

    /// Identity of the single best-score record
    pub const BEST_SCORE_ID: u32 = 1;
}
