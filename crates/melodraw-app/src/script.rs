//! Recorded input scripts for headless replay.

use crate::session::Session;
use crate::shortcuts::{KeyPress, ShortcutRegistry};
use crate::ui::UiAction;
use melodraw_core::GestureEvent;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Script errors.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// One recorded input.
///
/// ```json
/// [
///   {"gesture": {"phase": "begin", "position": {"x": 10.0, "y": 10.0}}},
///   {"gesture": {"phase": "end"}},
///   {"action": "undo"},
///   {"key": {"key": "z", "ctrl": true, "shift": true}}
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    Gesture(GestureEvent),
    Action(UiAction),
    Key(KeyPress),
}

/// Load a script from a JSON file.
pub fn load_script(path: impl AsRef<Path>) -> Result<Vec<ScriptStep>, ScriptError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| ScriptError::Io(format!("{}: {}", path.display(), e)))?;
    parse_script(&content)
}

pub fn parse_script(json: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    serde_json::from_str(json).map_err(|e| ScriptError::Parse(e.to_string()))
}

impl Session {
    /// Apply one recorded step.
    pub fn run_step(&mut self, step: &ScriptStep) {
        match step {
            ScriptStep::Gesture(event) => {
                self.handle_gesture(*event);
            }
            ScriptStep::Action(action) => {
                self.run_action(*action);
            }
            ScriptStep::Key(press) => match ShortcutRegistry::lookup(press) {
                Some(action) => self.run_action(action),
                None => log::debug!("Unbound key: {:?}", press),
            },
        }
    }

    /// Apply every step in order.
    pub fn replay(&mut self, steps: &[ScriptStep]) {
        for step in steps {
            self.run_step(step);
        }
        log::info!(
            "Replayed {} steps: {} visible, {} undone",
            steps.len(),
            self.board().active().len(),
            self.board().undone().len()
        );
    }

    fn run_action(&mut self, action: UiAction) {
        // Disabled controls cannot be pressed
        if !self.controls().allows(action) {
            log::debug!("Ignoring disabled control: {:?}", action);
            return;
        }
        self.apply(action);
    }
}
