//! Stroke aggregate: ordered points plus the brush snapshot taken at start

use serde::Serialize;

use crate::brush::BrushSettings;
use crate::types::{Point, StrokeId};

/// One continuous drag gesture
///
/// Points are append-only while the stroke is live and frozen once it is
/// completed. Live strokes only exist inside the engine; everything handed
/// out to callers is completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    id: StrokeId,
    points: Vec<Point>,
    brush: BrushSettings,
    completed: bool,
}

impl Stroke {
    /// Start a live stroke seeded with its first point
    pub(crate) fn begin(id: StrokeId, first: Point, brush: BrushSettings) -> Self {
        Self {
            id,
            points: vec![first],
            brush,
            completed: false,
        }
    }

    /// Rebuild a completed stroke from recorded data
    ///
    /// Returns None for an empty point list.
    pub fn from_points(id: StrokeId, points: Vec<Point>, brush: BrushSettings) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(Self {
            id,
            points,
            brush,
            completed: true,
        })
    }

    pub(crate) fn push(&mut self, point: Point) {
        debug_assert!(!self.completed, "completed strokes are immutable");
        self.points.push(point);
    }

    pub(crate) fn complete(mut self) -> Self {
        self.completed = true;
        self
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_point(&self) -> Option<&Point> {
        self.points.last()
    }
}
