//! Game state and lifecycle
//!
//! `GameState` is the single authoritative aggregate for one session. It is
//! plain data: the session driver owns it and decides which thread touches
//! which fields.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::geometry::{Rect, Size};
use super::paddle::{DragInput, PaddleGeometry, Paddles, Side};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for start
    Idle,
    /// Ticking
    Running,
    /// Ball reached a side edge; terminal until reset or restart
    Ended,
}

/// Fixed parameters of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Score granted per paddle hit
    pub reward: u32,
    /// Acceleration added to the ball velocity per tick while gravity is on
    pub gravity: Vec2,
    /// Ball placement after a reset
    pub ball_start_pos: Vec2,
    pub ball_start_vel: Vec2,
    pub ball_radius: f32,
    pub paddle: PaddleGeometry,
}

impl Default for Rules {
    fn default() -> Self {
        use crate::consts::*;
        Self {
            reward: REWARD,
            gravity: GRAVITY,
            ball_start_pos: BALL_START_POS,
            ball_start_vel: BALL_START_VEL,
            ball_radius: BALL_RADIUS,
            paddle: PaddleGeometry::default(),
        }
    }
}

impl Rules {
    pub fn initial_ball(&self) -> Ball {
        Ball::new(self.ball_start_pos, self.ball_start_vel, self.ball_radius)
    }
}

/// Complete state of one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub rules: Rules,
    /// Never decreases except through `reset`
    pub score: u32,
    pub ball: Ball,
    pub paddles: Paddles,
    /// Latest touch input
    pub input: DragInput,
    /// Latest canvas size reported by the host
    pub canvas: Size,
    pub running: bool,
    pub gravity_enabled: bool,
    pub game_over: bool,
    /// Ticks since the last reset
    pub time_ticks: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}

impl GameState {
    pub fn new(rules: Rules) -> Self {
        Self {
            rules,
            score: 0,
            ball: rules.initial_ball(),
            paddles: Paddles::default(),
            input: DragInput::default(),
            canvas: Size::ZERO,
            running: false,
            gravity_enabled: true,
            game_over: false,
            time_ticks: 0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.game_over {
            GamePhase::Ended
        } else if self.running {
            GamePhase::Running
        } else {
            GamePhase::Idle
        }
    }

    /// Start ticking. Starting from `Ended` resets first; starting while
    /// already running is refused.
    pub fn start(&mut self) -> bool {
        match self.phase() {
            GamePhase::Running => false,
            GamePhase::Ended => {
                self.reset();
                self.running = true;
                true
            }
            GamePhase::Idle => {
                self.running = true;
                true
            }
        }
    }

    /// Ball reached a side edge. Returns the final score.
    pub fn end(&mut self) -> u32 {
        self.running = false;
        self.game_over = true;
        self.score
    }

    /// User quit. Returns the score to reconcile, or None if nothing was running.
    ///
    /// The caller must reconcile the returned score before calling `reset`.
    pub fn stop(&mut self) -> Option<u32> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(self.score)
    }

    /// Back to a fresh `Idle` session. Gravity keeps its last toggled value.
    pub fn reset(&mut self) {
        self.score = 0;
        self.paddles = Paddles::default();
        self.ball = self.rules.initial_ball();
        self.running = false;
        self.game_over = false;
        self.time_ticks = 0;
    }

    /// Only affects future ticks; the current velocity is left alone
    pub fn toggle_gravity(&mut self) -> bool {
        self.gravity_enabled = !self.gravity_enabled;
        self.gravity_enabled
    }

    /// Gravity to apply this tick, if enabled
    pub fn gravity(&self) -> Option<Vec2> {
        self.gravity_enabled.then_some(self.rules.gravity)
    }

    pub fn paddle_size(&self) -> Size {
        self.rules.paddle.paddle_size(self.canvas)
    }

    pub fn paddle_bounds(&self, side: Side) -> Rect {
        self.paddles.get(side).bounds(self.paddle_size())
    }

    /// Record a new canvas size and re-lay out the paddles
    pub fn set_canvas(&mut self, canvas: Size) {
        self.canvas = canvas;
        self.update_paddles();
    }

    /// Record the latest touch and apply it to whichever paddle is under it
    pub fn drag(&mut self, touch: Vec2, delta: f32) -> Option<Side> {
        self.input = DragInput { touch, delta };
        self.update_paddles()
    }

    /// Re-derive paddle x from the canvas and apply any pending drag
    pub fn update_paddles(&mut self) -> Option<Side> {
        let geometry = self.rules.paddle;
        self.paddles.update(&mut self.input, &geometry, self.canvas)
    }
}
