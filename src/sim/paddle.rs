//! Paddle placement and drag handling
//!
//! Paddles only move vertically. Their x position and size are re-derived from
//! the canvas every time they are laid out, since the canvas may be resized
//! between ticks.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, Size};

/// Which paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Proportions used to size and place paddles on a canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleGeometry {
    /// Paddle width as a fraction of canvas width
    pub width_fraction: f32,
    /// Paddle height as a fraction of canvas height
    pub height_fraction: f32,
    /// Gap between a paddle and its canvas edge, as a fraction of canvas width
    pub inset_fraction: f32,
}

impl Default for PaddleGeometry {
    fn default() -> Self {
        use crate::consts::*;
        Self {
            width_fraction: PADDLE_WIDTH_FRACTION,
            height_fraction: PADDLE_HEIGHT_FRACTION,
            inset_fraction: PADDLE_INSET_FRACTION,
        }
    }
}

impl PaddleGeometry {
    /// Paddle size for the given canvas
    pub fn paddle_size(&self, canvas: Size) -> Size {
        Size::new(
            self.width_fraction * canvas.width,
            self.height_fraction * canvas.height,
        )
    }

    /// Pinned x coordinate of a paddle's left edge
    pub fn paddle_x(&self, side: Side, canvas: Size) -> f32 {
        let inset = self.inset_fraction * canvas.width;
        match side {
            Side::Left => inset,
            Side::Right => canvas.width - inset - self.paddle_size(canvas).width,
        }
    }
}

/// Latest touch input. Last write wins; nothing is queued.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DragInput {
    /// Touch location in canvas coordinates
    pub touch: Vec2,
    /// Vertical drag amount not yet applied to a paddle
    pub delta: f32,
}

/// A player paddle. Only `origin.y` is player-controlled.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub origin: Vec2,
}

impl Paddle {
    pub fn bounds(&self, size: Size) -> Rect {
        Rect::new(self.origin, size)
    }

    /// Pin x to the paddle's edge of the current canvas
    pub fn layout(&mut self, side: Side, geometry: &PaddleGeometry, canvas: Size) {
        self.origin.x = geometry.paddle_x(side, canvas);
    }

    /// Move the paddle by the pending drag delta if the touch point is over it.
    ///
    /// Movement is level-triggered: any touch resting on the paddle while a delta
    /// is pending moves it. The new y is clamped to `[0, canvas height - paddle height]`
    /// and the delta is consumed so a held, unmoving touch stops nudging the paddle.
    /// Returns true if the paddle consumed the delta.
    pub fn drag(&mut self, input: &mut DragInput, paddle_size: Size, canvas: Size) -> bool {
        if !self.bounds(paddle_size).contains(input.touch) {
            return false;
        }

        let max_y = canvas.height - paddle_size.height;
        if max_y < 0.0 {
            // Paddle taller than the canvas, nowhere valid to go
            return false;
        }

        self.origin.y = (self.origin.y + input.delta).clamp(0.0, max_y);
        input.delta = 0.0;
        true
    }
}

/// Both paddles
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Paddles {
    pub left: Paddle,
    pub right: Paddle,
}

impl Paddles {
    pub fn get(&self, side: Side) -> &Paddle {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut Paddle {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Re-derive both paddles' x and apply any pending drag, left first.
    ///
    /// Both paddles share one pending delta, so at most one of them moves per call.
    /// Returns the side that moved, if any.
    pub fn update(
        &mut self,
        input: &mut DragInput,
        geometry: &PaddleGeometry,
        canvas: Size,
    ) -> Option<Side> {
        if canvas.is_empty() {
            return None;
        }

        let size = geometry.paddle_size(canvas);
        let mut moved = None;
        for side in [Side::Left, Side::Right] {
            let paddle = self.get_mut(side);
            paddle.layout(side, geometry, canvas);
            if moved.is_none() && paddle.drag(input, size, canvas) {
                log::debug!("{:?} paddle touched, y = {}", side, paddle.origin.y);
                moved = Some(side);
            }
        }
        moved
    }
}
