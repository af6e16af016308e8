//! Keyboard shortcut registry and documentation.

use crate::ui::UiAction;
use serde::{Deserialize, Serialize};

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: UiAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: UiAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// Whether a key press triggers this shortcut.
    pub fn matches(&self, press: &KeyPress) -> bool {
        self.ctrl == press.ctrl
            && self.shift == press.shift
            && self.key.eq_ignore_ascii_case(&press.key)
    }
}

/// A key press reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, ctrl: bool, shift: bool) -> Self {
        Self {
            key: key.into(),
            ctrl,
            shift,
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, UiAction::Undo, "Undo last stroke"),
            Shortcut::new("Z", true, true, UiAction::Redo, "Redo stroke"),
            Shortcut::new("Y", true, false, UiAction::Redo, "Redo stroke"),
            Shortcut::new("Delete", true, false, UiAction::Clear, "Clear canvas"),
            Shortcut::new("E", true, false, UiAction::Share, "Share snapshot"),
        ]
    }

    /// Action bound to a key press, if any.
    pub fn lookup(press: &KeyPress) -> Option<UiAction> {
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(press))
            .map(|shortcut| shortcut.action)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}
