//! Collision detection and response
//!
//! Each tick the ball's bounding box is tested against the paddles, then against
//! the canvas edges. Exactly one contact is applied per tick: paddles before edges
//! (left paddle first), and edges in the order top, right, bottom, left.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::geometry::{Rect, Size};
use super::paddle::Side;
use crate::audio::SoundCue;

/// Heading the ball is forced into after a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Canvas edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    /// Reaching the left or right edge ends the game
    pub fn is_terminal(&self) -> bool {
        matches!(self, Edge::Left | Edge::Right)
    }
}

/// What the ball touched this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    Paddle(Side),
    Edge(Edge),
}

impl Contact {
    pub fn is_terminal(&self) -> bool {
        match self {
            Contact::Paddle(_) => false,
            Contact::Edge(edge) => edge.is_terminal(),
        }
    }

    pub fn cue(&self) -> SoundCue {
        match self {
            Contact::Paddle(_) => SoundCue::PaddleHit,
            Contact::Edge(edge) if edge.is_terminal() => SoundCue::GameOver,
            Contact::Edge(_) => SoundCue::SoftBounce,
        }
    }
}

/// Force the velocity into a heading.
///
/// Components already pointing the right way are kept. `Right` also negates the
/// vertical component while `Left` leaves it alone; paddle bounces are therefore
/// not mirror images of each other.
pub fn flip_heading(vel: Vec2, direction: Direction) -> Vec2 {
    match direction {
        Direction::Up => Vec2::new(vel.x, if vel.y < 0.0 { vel.y } else { -vel.y }),
        Direction::Down => Vec2::new(vel.x, if vel.y > 0.0 { vel.y } else { -vel.y }),
        Direction::Left => Vec2::new(if vel.x < 0.0 { vel.x } else { -vel.x }, vel.y),
        Direction::Right => Vec2::new(if vel.x > 0.0 { vel.x } else { -vel.x }, -vel.y),
    }
}

/// Which paddle (if any) the ball overlaps. Left wins if both do.
pub fn check_paddles(ball: &Rect, left: &Rect, right: &Rect) -> Option<Side> {
    if ball.overlaps(left) {
        Some(Side::Left)
    } else if ball.overlaps(right) {
        Some(Side::Right)
    } else {
        None
    }
}

/// First canvas edge the ball reaches, in the order top, right, bottom, left
pub fn check_edges(ball: &Rect, canvas: Size) -> Option<Edge> {
    if ball.top() <= 0.0 {
        Some(Edge::Top)
    } else if ball.right() >= canvas.width {
        Some(Edge::Right)
    } else if ball.bottom() >= canvas.height {
        Some(Edge::Bottom)
    } else if ball.left() <= 0.0 {
        Some(Edge::Left)
    } else {
        None
    }
}

/// Detect this tick's contact and update the ball's velocity for it.
///
/// Terminal edges leave the velocity untouched; the caller ends the game.
pub fn resolve_collision(ball: &mut Ball, left: &Rect, right: &Rect, canvas: Size) -> Option<Contact> {
    let bounds = ball.bounds();

    if let Some(side) = check_paddles(&bounds, left, right) {
        let direction = match side {
            Side::Left => Direction::Right,
            Side::Right => Direction::Left,
        };
        ball.vel = flip_heading(ball.vel, direction);
        return Some(Contact::Paddle(side));
    }

    let edge = check_edges(&bounds, canvas)?;
    match edge {
        Edge::Top => ball.vel = flip_heading(ball.vel, Direction::Down),
        Edge::Bottom => ball.vel = flip_heading(ball.vel, Direction::Up),
        Edge::Left | Edge::Right => {}
    }
    Some(Contact::Edge(edge))
}
