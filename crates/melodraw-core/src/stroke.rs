//! Freehand strokes drawn on the board.

use crate::palette::PaletteColor;
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for strokes.
pub type StrokeId = Uuid;

/// One continuous path from gesture begin to gesture end, in a single color.
///
/// A stroke always holds at least one point. Once complete its points are frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StrokeData")]
pub struct Stroke {
    id: StrokeId,
    color: PaletteColor,
    points: Vec<Point>,
    complete: bool,
}

/// Unvalidated serialized form of [`Stroke`].
#[derive(Deserialize)]
struct StrokeData {
    id: StrokeId,
    color: PaletteColor,
    points: Vec<Point>,
    complete: bool,
}

impl TryFrom<StrokeData> for Stroke {
    type Error = String;

    fn try_from(data: StrokeData) -> Result<Self, Self::Error> {
        if data.points.is_empty() {
            return Err(format!("stroke {} has no points", data.id));
        }
        Ok(Self {
            id: data.id,
            color: data.color,
            points: data.points,
            complete: data.complete,
        })
    }
}

impl Stroke {
    /// Start a stroke at its first point.
    pub fn new(color: PaletteColor, first: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            color,
            points: vec![first],
            complete: false,
        }
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    pub fn color(&self) -> PaletteColor {
        self.color
    }

    /// Points in drawing order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Append a point. Returns false (and leaves the stroke untouched) once complete.
    pub fn push_point(&mut self, point: Point) -> bool {
        if self.complete {
            return false;
        }
        self.points.push(point);
        true
    }

    /// Mark the stroke complete.
    pub fn finish(&mut self) {
        self.complete = true;
    }

    /// Axis-aligned bounds of the points (zero-area for a single point).
    pub fn bounds(&self) -> Rect {
        let mut points = self.points.iter();
        let Some(&first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(*p))
    }

    /// Path through the points: move to the first, then a line to each of the rest.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.points.iter();
        if let Some(first) = points.next() {
            path.move_to(*first);
        }
        for point in points {
            path.line_to(*point);
        }
        path
    }
}
