//! Melodraw Application
//!
//! The session shell around the stroke board: host controls, audio cues,
//! snapshot sharing, keyboard shortcuts and headless script replay.

mod config;
mod script;
mod session;
mod share;
mod shortcuts;
mod ui;

pub use config::{AppConfig, ConfigError};
pub use script::{ScriptError, ScriptStep, load_script, parse_script};
pub use session::Session;
pub use share::{FileShareSink, ShareBuffer, ShareError, ShareSink, SharedImage};
pub use shortcuts::{KeyPress, Shortcut, ShortcutRegistry};
pub use ui::{Controls, UiAction};
