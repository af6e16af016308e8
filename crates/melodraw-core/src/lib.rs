//! Melodraw Core Library
//!
//! Platform-agnostic model for the Melodraw stroke board: palette and sound
//! cues, strokes, gesture input, undo/redo history and the audio seam.

pub mod audio;
pub mod board;
pub mod input;
pub mod palette;
pub mod shared;
pub mod stroke;

pub use audio::{
    AssetCuePlayer, AudioError, CuePlayer, CueSink, LogCueSink, NullCuePlayer, play_cue_or_log,
};
pub use board::{Board, BoardError, BoardResult, RedoPolicy, StrokeStarted};
pub use input::{GestureEvent, GesturePhase};
pub use palette::{ColorSource, PALETTE, PaletteColor, RandomColors, SoundCue};
pub use shared::SharedBoard;
pub use stroke::{Stroke, StrokeId};
