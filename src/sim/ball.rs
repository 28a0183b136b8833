//! Ball state and integration

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::*;

/// The ball. `radius` is fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    radius: f32,
}

impl Default for Ball {
    fn default() -> Self {
        Self::new(BALL_START_POS, BALL_START_VEL, BALL_RADIUS)
    }
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self { pos, vel, radius }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Axis-aligned bounding box
    pub fn bounds(&self) -> Rect {
        Rect::from_center_radius(self.pos, self.radius)
    }

    /// Advance one tick.
    ///
    /// With gravity, the acceleration is added to velocity before moving.
    /// Velocity is not capped, so a long session keeps speeding up.
    pub fn advance(&mut self, gravity: Option<Vec2>) {
        if let Some(accel) = gravity {
            self.vel += accel;
        }
        self.pos += self.vel;
    }
}
