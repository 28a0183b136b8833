//! Sound cue routing
//!
//! The simulation only says which cue to play. Playback belongs to whatever
//! `SoundSink` the host installs; `play` must not block.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Ball hits paddle
    PaddleHit,
    /// Ball bounces off the top or bottom edge
    SoftBounce,
    /// Ball leaves through a side edge
    GameOver,
}

impl SoundCue {
    /// Name of the sound asset for this cue
    pub fn asset_name(&self) -> &'static str {
        match self {
            SoundCue::PaddleHit => "noink",
            SoundCue::SoftBounce => "note",
            SoundCue::GameOver => "buzzer",
        }
    }
}

/// Playback backend
pub trait SoundSink: Send + Sync {
    /// Start playing a cue at the given volume (0.0 - 1.0). Must return immediately.
    fn play(&self, cue: SoundCue, volume: f32);
}

/// Sink that only logs cues (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSoundSink;

impl SoundSink for LogSoundSink {
    fn play(&self, cue: SoundCue, volume: f32) {
        log::debug!("Sound: {} (volume {:.2})", cue.asset_name(), volume);
    }
}

/// Audio manager for the game
#[derive(Clone)]
pub struct AudioManager {
    sink: Arc<dyn SoundSink>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Arc::new(LogSoundSink))
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("master_volume", &self.master_volume)
            .field("sfx_volume", &self.sfx_volume)
            .field("muted", &self.muted)
            .finish_non_exhaustive()
    }
}

impl AudioManager {
    pub fn new(sink: Arc<dyn SoundSink>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Overall loudness, clamped to [0, 1]
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    /// Loudness of cue playback relative to master, clamped to [0, 1]
    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = volume.clamp(0.0, 1.0);
    }

    /// While muted no cue reaches the sink
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Volume handed to the sink; zero means the cue is dropped
    fn cue_volume(&self) -> f32 {
        match self.muted {
            true => 0.0,
            false => self.master_volume * self.sfx_volume,
        }
    }

    /// Forward a cue to the sink unless it would be silent
    pub fn play(&self, cue: SoundCue) {
        let volume = self.cue_volume();
        if volume > 0.0 {
            self.sink.play(cue, volume);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Sink that records every cue it is asked to play
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub played: Mutex<Vec<(SoundCue, f32)>>,
    }

    impl SoundSink for RecordingSink {
        fn play(&self, cue: SoundCue, volume: f32) {
            self.played.lock().push((cue, volume));
        }
    }

    #[test]
    fn test_play_forwards_combined_volume() {
        let sink = Arc::new(RecordingSink::default());
        let mut audio = AudioManager::new(sink.clone());
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(0.5);
        audio.play(SoundCue::PaddleHit);

        assert_eq!(*sink.played.lock(), vec![(SoundCue::PaddleHit, 0.25)]);
    }

    #[test]
    fn test_muted_drops_cues() {
        let sink = Arc::new(RecordingSink::default());
        let mut audio = AudioManager::new(sink.clone());
        audio.set_muted(true);
        audio.play(SoundCue::GameOver);
        audio.set_muted(false);
        audio.set_master_volume(0.0);
        audio.play(SoundCue::GameOver);

        assert!(sink.played.lock().is_empty());
    }

    #[test]
    fn test_volume_is_clamped() {
        let sink = Arc::new(RecordingSink::default());
        let mut audio = AudioManager::new(sink.clone());
        audio.set_master_volume(3.0);
        audio.set_sfx_volume(-1.0);
        audio.play(SoundCue::SoftBounce);
        assert!(sink.played.lock().is_empty());

        audio.set_sfx_volume(2.0);
        audio.play(SoundCue::SoftBounce);
        assert_eq!(*sink.played.lock(), vec![(SoundCue::SoftBounce, 1.0)]);
    }

    #[test]
    fn test_asset_names() {
        assert_eq!(SoundCue::PaddleHit.asset_name(), "noink");
        assert_eq!(SoundCue::SoftBounce.asset_name(), "note");
        assert_eq!(SoundCue::GameOver.asset_name(), "buzzer");
    }
}
