//! The stroke board: visible strokes, undo history and gesture handling.

use crate::input::{GestureEvent, GesturePhase};
use crate::palette::{ColorSource, PaletteColor, RandomColors, SoundCue};
use crate::stroke::{Stroke, StrokeId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Board errors.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Board lock poisoned: {0}")]
    Poisoned(String),
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// What happens to redo history when a new stroke starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedoPolicy {
    /// Undone strokes stay restorable until an explicit clear.
    #[default]
    Keep,
    /// Starting a stroke drops all undone strokes.
    DiscardOnNewStroke,
}

/// Emitted when a new stroke is created. Consumed by the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStarted {
    pub id: StrokeId,
    pub color: PaletteColor,
    pub cue: SoundCue,
}

/// Ordered strokes plus undo history.
///
/// `active` is in z-order (back to front). A created stroke lives in exactly one
/// of `active` or `undone` until `clear` drops it.
#[derive(Debug, Clone)]
pub struct Board<C = RandomColors> {
    active: Vec<Stroke>,
    undone: Vec<Stroke>,
    colors: C,
    redo_policy: RedoPolicy,
    has_drawn: bool,
}

impl Default for Board<RandomColors> {
    fn default() -> Self {
        Self::new()
    }
}

impl Board<RandomColors> {
    /// Create an empty board with an entropy-seeded color source.
    pub fn new() -> Self {
        Self::with_colors(RandomColors::from_entropy())
    }

    /// Create an empty board whose colors are reproducible from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::with_colors(RandomColors::seeded(seed))
    }
}

impl<C: ColorSource> Board<C> {
    /// Create an empty board drawing colors from `colors`.
    pub fn with_colors(colors: C) -> Self {
        Self {
            active: Vec::new(),
            undone: Vec::new(),
            colors,
            redo_policy: RedoPolicy::default(),
            has_drawn: false,
        }
    }

    /// Set the redo policy.
    pub fn with_redo_policy(mut self, policy: RedoPolicy) -> Self {
        self.redo_policy = policy;
        self
    }

    pub fn redo_policy(&self) -> RedoPolicy {
        self.redo_policy
    }

    /// Append a point, inferring whether it starts a new stroke.
    ///
    /// A new stroke starts when the board is empty or the topmost stroke is
    /// complete. Otherwise the point extends the topmost stroke.
    pub fn append_point(&mut self, point: Point) -> Option<StrokeStarted> {
        match self.current_stroke_mut() {
            Some(stroke) => {
                stroke.push_point(point);
                None
            }
            None => Some(self.start_stroke(point)),
        }
    }

    /// Apply an explicit gesture event.
    pub fn handle_gesture(&mut self, event: GestureEvent) -> Option<StrokeStarted> {
        match event {
            GestureEvent::Begin { position } => {
                if self.is_drawing() {
                    log::debug!("Gesture began while a stroke was open; finishing it");
                    self.end_stroke();
                }
                Some(self.start_stroke(position))
            }
            GestureEvent::Move { position } => self.append_point(position),
            GestureEvent::End => {
                self.end_stroke();
                None
            }
        }
    }

    /// Mark the topmost stroke complete. No-op on an empty board.
    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.active.last_mut() {
            stroke.finish();
        }
    }

    /// Move the topmost stroke to the undo history.
    /// Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(mut stroke) = self.active.pop() else {
            return false;
        };
        // A stroke in history must never reopen for appends
        stroke.finish();
        log::debug!("Undo stroke {}", stroke.id());
        self.undone.push(stroke);
        true
    }

    /// Restore the most recently undone stroke.
    /// Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(stroke) = self.undone.pop() else {
            return false;
        };
        // The open stroke would end up buried under the restored one
        if self.is_drawing() {
            self.end_stroke();
        }
        log::debug!("Redo stroke {}", stroke.id());
        self.active.push(stroke);
        true
    }

    /// Drop every stroke, visible and undone.
    pub fn clear(&mut self) {
        if !self.active.is_empty() || !self.undone.is_empty() {
            log::debug!(
                "Clearing board ({} active, {} undone)",
                self.active.len(),
                self.undone.len()
            );
        }
        self.active.clear();
        self.undone.clear();
        self.has_drawn = false;
    }

    pub fn can_undo(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Whether a stroke has been started since the session began or the last clear.
    pub fn has_drawn(&self) -> bool {
        self.has_drawn
    }

    /// Whether the topmost stroke is still receiving points.
    pub fn is_drawing(&self) -> bool {
        self.current_stroke().is_some()
    }

    /// Drawing state of the topmost stroke.
    pub fn phase(&self) -> GesturePhase {
        match self.active.last() {
            None => GesturePhase::Absent,
            Some(stroke) if stroke.is_complete() => GesturePhase::Complete,
            Some(_) => GesturePhase::Drawing,
        }
    }

    /// Visible strokes, back to front.
    pub fn active(&self) -> &[Stroke] {
        &self.active
    }

    /// Undone strokes; the last one is restored first.
    pub fn undone(&self) -> &[Stroke] {
        &self.undone
    }

    /// The stroke currently being drawn, if any.
    pub fn current_stroke(&self) -> Option<&Stroke> {
        self.active.last().filter(|s| !s.is_complete())
    }

    /// Bounding box of all visible strokes.
    pub fn bounds(&self) -> Option<Rect> {
        self.active
            .iter()
            .map(Stroke::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    fn current_stroke_mut(&mut self) -> Option<&mut Stroke> {
        self.active.last_mut().filter(|s| !s.is_complete())
    }

    fn start_stroke(&mut self, first: Point) -> StrokeStarted {
        let color = self.colors.next_color();
        let stroke = Stroke::new(color, first);
        let started = StrokeStarted {
            id: stroke.id(),
            color,
            cue: color.cue(),
        };

        if self.redo_policy == RedoPolicy::DiscardOnNewStroke && !self.undone.is_empty() {
            log::debug!("Discarding {} undone strokes", self.undone.len());
            self.undone.clear();
        }

        log::debug!("Stroke {} started in {}", started.id, color.name());
        self.active.push(stroke);
        self.has_drawn = true;
        started
    }
}
