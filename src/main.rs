//! Paddle Bounce headless runner
//!
//! Plays one scripted game against the JSON best-score store and logs the
//! result. Usage: `paddle-bounce [settings.json]`

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use glam::Vec2;

use paddle_bounce::audio::LogSoundSink;
use paddle_bounce::sim::{GamePhase, Size};
use paddle_bounce::{JsonFileStore, Session, Settings};

const CANVAS: Size = Size::new(1280.0, 720.0);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Paddle Bounce (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_from(&path).with_context(|| format!("loading {path}"))?,
        None => Settings::default(),
    };

    let store = JsonFileStore::open(&settings.best_score_path)
        .await
        .with_context(|| format!("opening {}", settings.best_score_path.display()))?;
    let session = Session::new(&settings, Arc::new(store), settings.audio(Arc::new(LogSoundSink)));
    session.set_canvas(CANVAS);
    log::info!("Best score so far: {:?}", session.mirrored_best());

    let mut snapshots = session.subscribe();
    session.start();

    // Keep the left paddle centred on the ball, as a player would
    let tracker = async {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            if snapshot.phase != GamePhase::Running {
                break;
            }
            let paddle = snapshot.left_paddle;
            let centre = paddle.top() + paddle.size.height / 2.0;
            let touch = Vec2::new(paddle.left() + paddle.size.width / 2.0, centre);
            session.drag(touch, snapshot.ball_pos.y - centre);
        }
    };
    if tokio::time::timeout(Duration::from_secs(120), tracker).await.is_err() {
        log::info!("Time limit reached, quitting");
        session.stop();
    }

    let snapshot = session.snapshot();
    log::info!(
        "Final score {} after {} ticks ({:?})",
        snapshot.score,
        snapshot.time_ticks,
        snapshot.phase
    );

    // Give the background write a moment to land before exiting
    tokio::time::sleep(Duration::from_millis(200)).await;
    log::info!("Best score: {:?}", session.mirrored_best());
    session.shutdown();
    Ok(())
}
