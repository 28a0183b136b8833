//! Fixed-interval simulation tick
//!
//! One tick: lay out paddles (and apply pending drag), advance the ball, then
//! resolve at most one contact.

use serde::{Deserialize, Serialize};

use super::collision::{Contact, resolve_collision};
use super::paddle::Side;
use super::state::{GamePhase, GameState};
use crate::audio::SoundCue;

/// Something observable that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A paddle moved under the player's touch
    PaddleMoved(Side),
    /// The ball touched something
    Contact(Contact),
    /// Play a sound cue
    Sound(SoundCue),
    /// Score increased to the given value
    ScoreChanged(u32),
    /// Ball left the field; carries the final score
    GameOver { final_score: u32 },
}

/// Result of one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub events: Vec<GameEvent>,
}

impl TickOutcome {
    /// Final score if this tick ended the game
    pub fn final_score(&self) -> Option<u32> {
        self.events.iter().find_map(|e| match e {
            GameEvent::GameOver { final_score } => Some(*final_score),
            _ => None,
        })
    }

    pub fn sounds(&self) -> impl Iterator<Item = SoundCue> + '_ {
        self.events.iter().filter_map(|e| match e {
            GameEvent::Sound(cue) => Some(*cue),
            _ => None,
        })
    }
}

/// Advance the game state by one tick. Does nothing unless running, or while
/// the canvas has not been laid out yet.
pub fn tick(state: &mut GameState) -> TickOutcome {
    let mut outcome = TickOutcome::default();
    if state.phase() != GamePhase::Running || state.canvas.is_empty() {
        return outcome;
    }

    state.time_ticks += 1;

    if let Some(side) = state.update_paddles() {
        outcome.events.push(GameEvent::PaddleMoved(side));
    }

    let gravity = state.gravity();
    state.ball.advance(gravity);

    let left = state.paddle_bounds(Side::Left);
    let right = state.paddle_bounds(Side::Right);
    let Some(contact) = resolve_collision(&mut state.ball, &left, &right, state.canvas) else {
        return outcome;
    };

    outcome.events.push(GameEvent::Contact(contact));
    outcome.events.push(GameEvent::Sound(contact.cue()));

    match contact {
        Contact::Paddle(side) => {
            state.score = state.score.saturating_add(state.rules.reward);
            log::debug!(
                "Ball hit {:?} paddle, score {}, velocity {:?}",
                side,
                state.score,
                state.ball.vel
            );
            outcome.events.push(GameEvent::ScoreChanged(state.score));
        }
        Contact::Edge(edge) if edge.is_terminal() => {
            let final_score = state.end();
            log::info!("Game over at {:?} edge, final score {}", edge, final_score);
            outcome.events.push(GameEvent::GameOver { final_score });
        }
        Contact::Edge(edge) => {
            log::debug!("Ball bounced off {:?} edge", edge);
        }
    }

    outcome
}
