//! Controls exposed to the host UI.

use serde::{Deserialize, Serialize};

/// Actions that can be triggered by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiAction {
    /// Remove the topmost stroke.
    Undo,
    /// Restore the most recently undone stroke.
    Redo,
    /// Drop every stroke and the undo history.
    Clear,
    /// Render a snapshot and hand it to the share collaborator.
    Share,
}

/// Enabled/visible state of each control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    /// Disabled while no stroke is visible.
    pub undo_enabled: bool,
    /// Disabled while nothing has been undone.
    pub redo_enabled: bool,
    /// Hidden until a stroke has been drawn since the last clear.
    pub clear_visible: bool,
    /// Hidden when no rasterizer is available.
    pub share_enabled: bool,
}

impl Controls {
    /// Whether the control for `action` can currently be used.
    pub fn allows(&self, action: UiAction) -> bool {
        match action {
            UiAction::Undo => self.undo_enabled,
            UiAction::Redo => self.redo_enabled,
            UiAction::Clear => self.clear_visible,
            UiAction::Share => self.share_enabled,
        }
    }
}
