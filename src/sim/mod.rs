//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per tick, no wall-clock time
//! - Exactly one contact resolved per tick, in a fixed order
//! - No rendering, audio or storage dependencies (cues and scores are returned as events)

pub mod ball;
pub mod collision;
pub mod geometry;
pub mod paddle;
pub mod state;
pub mod tick;

pub use ball::Ball;
pub use collision::{Contact, Direction, Edge, flip_heading, resolve_collision};
pub use geometry::{Rect, Size};
pub use paddle::{DragInput, Paddle, PaddleGeometry, Paddles, Side};
pub use state::{GamePhase, GameState, Rules};
pub use tick::{GameEvent, TickOutcome, tick};
