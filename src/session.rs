//! Session driver
//!
//! Owns a `GameState` shared between three actors:
//! - the tick loop (a tokio task advancing the ball at a fixed interval)
//! - the host's input calls (drag, canvas resize, lifecycle buttons)
//! - the best-score mirror task (store notifications)
//!
//! State sits behind a mutex that is never held across an `.await`. Observers
//! get a fresh `SessionSnapshot` after every change.

use std::sync::{Arc, Weak};
use std::time::Duration;

use glam::Vec2;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::audio::AudioManager;
use crate::best_score::{BestScoreReconciler, ReconcileDecision};
use crate::persistence::BestScoreStore;
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, Rect, Side, Size, TickOutcome, tick};

/// Everything a renderer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: GamePhase,
    pub score: u32,
    /// Mirrored best score; `None` until the store reports one
    pub best_score: Option<u32>,
    pub ball_pos: Vec2,
    pub ball_radius: f32,
    pub left_paddle: Rect,
    pub right_paddle: Rect,
    pub gravity_enabled: bool,
    pub time_ticks: u64,
}

impl SessionSnapshot {
    fn capture(state: &GameState, best_score: Option<u32>) -> Self {
        Self {
            phase: state.phase(),
            score: state.score,
            best_score,
            ball_pos: state.ball.pos,
            ball_radius: state.ball.radius(),
            left_paddle: state.paddle_bounds(Side::Left),
            right_paddle: state.paddle_bounds(Side::Right),
            gravity_enabled: state.gravity_enabled,
            time_ticks: state.time_ticks,
        }
    }
}

struct Inner {
    game: GameState,
    /// Bumped on every start; a tick loop only advances the run it was spawned for
    run: u64,
}

struct Shared {
    inner: Mutex<Inner>,
    reconciler: BestScoreReconciler,
    audio: AudioManager,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl Shared {
    fn publish(&self) {
        let snapshot = {
            let inner = self.inner.lock();
            SessionSnapshot::capture(&inner.game, self.reconciler.mirrored_best())
        };
        self.snapshots.send_replace(snapshot);
    }

    /// Advance one tick if `run` (when given) is still the current run.
    /// Returns None if nothing was ticked.
    fn step(&self, run: Option<u64>) -> Option<TickOutcome> {
        let outcome = {
            let mut inner = self.inner.lock();
            if run.is_some_and(|r| r != inner.run) || inner.game.phase() != GamePhase::Running {
                return None;
            }
            let outcome = tick(&mut inner.game);
            if let Some(final_score) = outcome.final_score() {
                // Reconcile before the lock is released so no reset can slip in
                self.reconciler.reconcile(final_score);
            }
            outcome
        };

        for cue in outcome.sounds() {
            self.audio.play(cue);
        }
        self.publish();
        Some(outcome)
    }
}

async fn run_ticks(shared: Arc<Shared>, run: u64, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match shared.step(Some(run)) {
            Some(outcome) if outcome.final_score().is_none() => {}
            _ => break,
        }
    }
    log::debug!("Tick loop for run {} finished", run);
}

async fn mirror_best_score(shared: Weak<Shared>, mut best: watch::Receiver<Option<u32>>) {
    while best.changed().await.is_ok() {
        let value = *best.borrow_and_update();
        let Some(shared) = shared.upgrade() else {
            break;
        };
        log::debug!("Best score is now {:?}", value);
        shared.publish();
    }
}

/// A running game session
pub struct Session {
    shared: Arc<Shared>,
    tick_interval: Duration,
    runtime: Handle,
    ticker: Mutex<Option<JoinHandle<()>>>,
    mirror_task: JoinHandle<()>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("tick_interval", &self.tick_interval)
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session and subscribe to the best-score store.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new(settings: &Settings, store: Arc<dyn BestScoreStore>, audio: AudioManager) -> Self {
        let runtime = Handle::current();
        // Subscribe first so the mirror exists before any game can end
        let reconciler = BestScoreReconciler::new(store, runtime.clone());
        let best = reconciler.watch();

        let mut game = GameState::new(settings.rules());
        game.gravity_enabled = settings.gravity_enabled;

        let (snapshots, _rx) =
            watch::channel(SessionSnapshot::capture(&game, reconciler.mirrored_best()));
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner { game, run: 0 }),
            reconciler,
            audio,
            snapshots,
        });

        let mirror_task = runtime.spawn(mirror_best_score(Arc::downgrade(&shared), best));

        Self {
            shared,
            tick_interval: settings.tick_interval(),
            runtime,
            ticker: Mutex::new(None),
            mirror_task,
        }
    }

    /// Follow state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.snapshots.borrow().clone()
    }

    pub fn phase(&self) -> GamePhase {
        self.shared.inner.lock().game.phase()
    }

    pub fn score(&self) -> u32 {
        self.shared.inner.lock().game.score
    }

    pub fn mirrored_best(&self) -> Option<u32> {
        self.shared.reconciler.mirrored_best()
    }

    /// Start (or restart after game over) and begin ticking.
    /// Returns false if the game is already running.
    pub fn start(&self) -> bool {
        let mut ticker = self.ticker.lock();
        let run = {
            let mut inner = self.shared.inner.lock();
            if !inner.game.start() {
                return false;
            }
            inner.run += 1;
            inner.run
        };

        if let Some(previous) = ticker.take() {
            previous.abort();
        }
        log::info!("Game started (run {})", run);
        self.shared.publish();
        *ticker = Some(self.runtime.spawn(run_ticks(
            Arc::clone(&self.shared),
            run,
            self.tick_interval,
        )));
        true
    }

    /// User quit: stop ticking, reconcile the score, then reset.
    /// Returns None if no game was running.
    pub fn stop(&self) -> Option<ReconcileDecision> {
        let decision = {
            let mut inner = self.shared.inner.lock();
            let score = inner.game.stop()?;
            let decision = self.shared.reconciler.reconcile(score);
            inner.game.reset();
            decision
        };
        log::info!("Game stopped: {:?}", decision);
        self.shared.publish();
        Some(decision)
    }

    /// Back to a fresh idle game. Halts ticking if running.
    pub fn reset(&self) {
        self.shared.inner.lock().game.reset();
        self.shared.publish();
    }

    /// Flip gravity for future ticks. Returns the new setting.
    pub fn toggle_gravity(&self) -> bool {
        let enabled = self.shared.inner.lock().game.toggle_gravity();
        log::info!("Gravity {}", if enabled { "on" } else { "off" });
        self.shared.publish();
        enabled
    }

    /// Latest drag gesture. Moves whichever paddle is under the touch.
    pub fn drag(&self, touch: Vec2, delta: f32) -> Option<Side> {
        let moved = self.shared.inner.lock().game.drag(touch, delta);
        if moved.is_some() {
            self.shared.publish();
        }
        moved
    }

    /// Canvas size changed
    pub fn set_canvas(&self, canvas: Size) {
        self.shared.inner.lock().game.set_canvas(canvas);
        self.shared.publish();
    }

    /// Advance one tick by hand, for hosts that drive their own frame loop.
    /// Returns None if the game is not running.
    pub fn step(&self) -> Option<TickOutcome> {
        self.shared.step(None)
    }

    /// Stop all background work. The session stays readable.
    pub fn shutdown(&self) {
        if let Some(ticker) = self.ticker.lock().take() {
            ticker.abort();
        }
        self.mirror_task.abort();
        self.shared.inner.lock().game.running = false;
        log::debug!("Session shut down");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.get_mut().take() {
            ticker.abort();
        }
        self.mirror_task.abort();
    }
}
