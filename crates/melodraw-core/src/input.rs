//! Gesture input delivered by the host's touch or pointer system.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// One event of a drag gesture, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum GestureEvent {
    Begin { position: Point },
    Move { position: Point },
    End,
}

impl GestureEvent {
    pub fn begin(x: f64, y: f64) -> Self {
        GestureEvent::Begin {
            position: Point::new(x, y),
        }
    }

    pub fn move_to(x: f64, y: f64) -> Self {
        GestureEvent::Move {
            position: Point::new(x, y),
        }
    }

    /// Position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            GestureEvent::Begin { position } | GestureEvent::Move { position } => Some(*position),
            GestureEvent::End => None,
        }
    }
}

/// Drawing state of the topmost stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    /// No stroke on the board.
    Absent,
    /// The topmost stroke is still receiving points.
    Drawing,
    /// The topmost stroke is finished.
    Complete,
}
