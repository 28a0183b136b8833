//! End-to-end session flow against the JSON file store

use std::sync::Arc;

use glam::Vec2;
use paddle_bounce::audio::LogSoundSink;
use paddle_bounce::persistence::BestScoreStore;
use paddle_bounce::sim::{GamePhase, Size};
use paddle_bounce::{AudioManager, JsonFileStore, ReconcileDecision, Session, Settings};

const CANVAS: Size = Size::new(1000.0, 600.0);

fn rally_settings(dir: &std::path::Path) -> Settings {
    Settings {
        gravity_enabled: false,
        ball_start_pos: Vec2::new(500.0, 150.0),
        ball_start_vel: Vec2::new(-45.0, 0.0),
        best_score_path: dir.join("best.json"),
        ..Default::default()
    }
}

async fn open_session(settings: &Settings) -> Session {
    let store = JsonFileStore::open(&settings.best_score_path).await.unwrap();
    let session = Session::new(
        settings,
        Arc::new(store),
        AudioManager::new(Arc::new(LogSoundSink)),
    );
    session.set_canvas(CANVAS);
    session
}

#[tokio::test(start_paused = true)]
async fn test_best_score_survives_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let settings = rally_settings(dir.path());

    let session = open_session(&settings).await;
    let mut rx = session.subscribe();
    assert_eq!(session.mirrored_best(), Some(0));

    session.start();
    rx.wait_for(|s| s.score >= 30).await.unwrap();
    let decision = session.stop();
    assert_eq!(
        decision,
        Some(ReconcileDecision::Write {
            score: 30,
            previous_best: 0
        })
    );
    rx.wait_for(|s| s.best_score == Some(30)).await.unwrap();
    session.shutdown();
    drop(session);

    // A new session sees the saved best and does not overwrite it with less
    let session = open_session(&settings).await;
    assert_eq!(session.mirrored_best(), Some(30));
    let mut rx = session.subscribe();
    session.start();
    rx.wait_for(|s| s.score >= 10).await.unwrap();
    assert_eq!(
        session.stop(),
        Some(ReconcileDecision::NotHigher { best: 30 })
    );

    let reopened = JsonFileStore::open(&settings.best_score_path).await.unwrap();
    assert_eq!(*reopened.subscribe().borrow(), Some(30));
}

#[tokio::test(start_paused = true)]
async fn test_resize_repins_paddles_between_ticks() {
    let dir = tempfile::tempdir().unwrap();
    let settings = rally_settings(dir.path());
    let session = open_session(&settings).await;

    let right = session.snapshot().right_paddle;
    assert!((right.left() - 960.0).abs() < 1e-3);

    session.set_canvas(Size::new(2000.0, 600.0));
    let snapshot = session.snapshot();
    assert!((snapshot.right_paddle.left() - 1920.0).abs() < 1e-3);
    assert!((snapshot.left_paddle.left() - 20.0).abs() < 1e-3);
    assert_eq!(snapshot.phase, GamePhase::Idle);
}
