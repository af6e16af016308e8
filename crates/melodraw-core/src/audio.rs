//! Audio collaborator seam.
//!
//! The board only reports which cue a new stroke should play. Players are owned
//! by the shell and injected next to the board; failures never reach drawing state.

use crate::palette::SoundCue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Audio errors. Any of these means the cue is unavailable.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Sound asset not found: {0}")]
    AssetNotFound(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Playback failed: {0}")]
    Playback(String),
}

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Plays the cue for a newly started stroke.
pub trait CuePlayer: Send {
    fn play(&mut self, cue: SoundCue) -> AudioResult<()>;
}

/// Host audio output that plays encoded clip bytes.
pub trait CueSink: Send {
    fn play_clip(&mut self, cue: SoundCue, clip: &[u8]) -> AudioResult<()>;
}

/// Player that only logs. Used when no sound assets are configured.
#[derive(Debug, Default)]
pub struct NullCuePlayer;

impl CuePlayer for NullCuePlayer {
    fn play(&mut self, cue: SoundCue) -> AudioResult<()> {
        log::debug!("Cue {} (audio disabled)", cue.asset_name());
        Ok(())
    }
}

/// Sink that logs each clip instead of playing it.
#[derive(Debug, Default)]
pub struct LogCueSink;

impl CueSink for LogCueSink {
    fn play_clip(&mut self, cue: SoundCue, clip: &[u8]) -> AudioResult<()> {
        log::info!("Playing {} ({} bytes)", cue.file_name(), clip.len());
        Ok(())
    }
}

/// Loads clips from a directory of `<asset>.mp3` files and hands them to a sink.
///
/// Clip bytes are cached after the first load. Only one clip is current at a
/// time; starting a new cue replaces it.
pub struct AssetCuePlayer<S> {
    sound_dir: PathBuf,
    sink: S,
    clips: HashMap<SoundCue, Vec<u8>>,
    current: Option<SoundCue>,
}

impl<S: CueSink> AssetCuePlayer<S> {
    pub fn new(sound_dir: impl Into<PathBuf>, sink: S) -> Self {
        Self {
            sound_dir: sound_dir.into(),
            sink,
            clips: HashMap::new(),
            current: None,
        }
    }

    /// Directory the clips are loaded from.
    pub fn sound_dir(&self) -> &Path {
        &self.sound_dir
    }

    /// The cue most recently handed to the sink.
    pub fn current(&self) -> Option<SoundCue> {
        self.current
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn clip_path(&self, cue: SoundCue) -> PathBuf {
        self.sound_dir.join(cue.file_name())
    }

    fn ensure_loaded(&mut self, cue: SoundCue) -> AudioResult<()> {
        if self.clips.contains_key(&cue) {
            return Ok(());
        }
        let path = self.clip_path(cue);
        if !path.is_file() {
            return Err(AudioError::AssetNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(&path).map_err(|e| AudioError::Io(e.to_string()))?;
        log::debug!("Loaded {} ({} bytes)", path.display(), bytes.len());
        self.clips.insert(cue, bytes);
        Ok(())
    }
}

impl<S: CueSink> CuePlayer for AssetCuePlayer<S> {
    fn play(&mut self, cue: SoundCue) -> AudioResult<()> {
        self.current = None;
        self.ensure_loaded(cue)?;
        let clip = self
            .clips
            .get(&cue)
            .ok_or_else(|| AudioError::AssetNotFound(cue.file_name()))?;
        self.sink.play_clip(cue, clip)?;
        self.current = Some(cue);
        Ok(())
    }
}

/// Play a cue, logging instead of propagating any failure.
pub fn play_cue_or_log(player: &mut dyn CuePlayer, cue: SoundCue) {
    if let Err(e) = player.play(cue) {
        log::warn!("Could not play {}: {}", cue.asset_name(), e);
    }
}
