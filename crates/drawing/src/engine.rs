//! Stroke engine: turns raw samples into stored stroke points
//!
//! The engine smooths incoming samples with a linearly weighted moving
//! average and resamples them by distance so that slow movement does not
//! oversample the stroke. Rendering is delegated to [`crate::render`].

use std::collections::VecDeque;

use glam::Vec2;
use tracing::debug;

use crate::brush::BrushSettings;
use crate::constants::MIN_ELAPSED_MS;
use crate::geometry::{smoothing_window, weighted_mean};
use crate::render;
use crate::stroke::Stroke;
use crate::surface::CpuSurface;
use crate::types::{BlendMode, Point, StrokeId};

/// Stroke engine holding the live stroke and its smoothing buffer
#[derive(Debug)]
pub struct StrokeEngine {
    /// Settings snapshotted by the next `start_stroke`
    settings: BrushSettings,
    /// Stroke in progress (None if not drawing)
    active: Option<Stroke>,
    /// Recent raw samples, newest at the back
    raw: VecDeque<Point>,
    /// Velocity of the most recent sample in px/ms
    last_velocity: f32,
    next_id: u64,
}

impl Default for StrokeEngine {
    fn default() -> Self {
        Self::new(BrushSettings::default())
    }
}

impl StrokeEngine {
    /// Create a new engine with the given brush settings
    pub fn new(settings: BrushSettings) -> Self {
        Self {
            settings: settings.normalized(),
            active: None,
            raw: VecDeque::new(),
            last_velocity: 0.0,
            next_id: 1,
        }
    }

    /// Current brush settings
    pub fn settings(&self) -> &BrushSettings {
        &self.settings
    }

    /// Replace the brush settings used by future strokes
    ///
    /// A stroke already in progress keeps its own snapshot.
    pub fn set_settings(&mut self, settings: BrushSettings) {
        self.settings = settings.normalized();
    }

    /// The stroke in progress, if any
    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Velocity of the last accepted sample in px/ms
    pub fn last_velocity(&self) -> f32 {
        self.last_velocity
    }

    fn allocate_id(&mut self) -> StrokeId {
        let id = StrokeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Start a new stroke seeded with `point`
    ///
    /// Any stroke still in progress is dropped; callers that need a different
    /// policy guard before calling.
    pub fn start_stroke(&mut self, point: Point, pressure: f32) -> &Stroke {
        let point = Point {
            pressure: pressure.clamp(0.0, 1.0),
            ..point
        };
        if let Some(previous) = self.active.take() {
            debug!("start_stroke: dropping unfinished {}", previous.id());
        }

        let id = self.allocate_id();
        self.raw.clear();
        self.raw.push_back(point);
        self.last_velocity = 0.0;

        debug!(
            "StrokeEngine::start_stroke: {} at ({:.1}, {:.1}), pressure={:.2}",
            id, point.x, point.y, point.pressure
        );
        self.active.insert(Stroke::begin(id, point, self.settings))
    }

    /// Feed a sample into the live stroke
    ///
    /// Returns None when no stroke is active. The smoothed sample is only
    /// stored when it lies at least `size * spacing` from the last stored
    /// point.
    pub fn add_point(&mut self, point: Point, pressure: f32) -> Option<&Stroke> {
        let stroke = self.active.as_mut()?;
        let point = Point {
            pressure: pressure.clamp(0.0, 1.0),
            ..point
        };

        if let Some(last_raw) = self.raw.back() {
            let elapsed = point
                .timestamp_ms
                .saturating_sub(last_raw.timestamp_ms)
                .max(MIN_ELAPSED_MS);
            self.last_velocity = last_raw.position().distance(point.position()) / elapsed as f32;
        }

        let window = smoothing_window(stroke.brush().smoothing);
        self.raw.push_back(point);
        while self.raw.len() > window {
            self.raw.pop_front();
        }

        let positions: Vec<Vec2> = self.raw.iter().map(Point::position).collect();
        let pressures: Vec<f32> = self.raw.iter().map(|p| p.pressure).collect();
        let (Some(position), Some(smoothed_pressure)) =
            (weighted_mean(&positions), weighted_mean(&pressures))
        else {
            return Some(&*stroke);
        };

        let candidate = Point {
            x: position.x,
            y: position.y,
            pressure: smoothed_pressure.clamp(0.0, 1.0),
            ..point
        };

        let threshold = stroke.brush().spacing_distance();
        let moved = stroke
            .last_point()
            .map_or(f32::INFINITY, |last| last.position().distance(candidate.position()));

        if moved > 0.0 && moved >= threshold {
            debug!(
                "StrokeEngine::add_point: stored ({:.2}, {:.2}) moved={:.2} velocity={:.3}",
                candidate.x, candidate.y, moved, self.last_velocity
            );
            stroke.push(candidate);
        }

        Some(&*stroke)
    }

    /// Finish the live stroke and hand it out completed
    pub fn end_stroke(&mut self) -> Option<Stroke> {
        let stroke = self.active.take()?;
        self.raw.clear();
        self.last_velocity = 0.0;
        debug!(
            "StrokeEngine::end_stroke: {} with {} points",
            stroke.id(),
            stroke.len()
        );
        Some(stroke.complete())
    }

    /// Discard the live stroke without completing it
    ///
    /// The returned stroke is incomplete and only useful for inspection.
    pub fn abort_stroke(&mut self) -> Option<Stroke> {
        let stroke = self.active.take()?;
        self.raw.clear();
        self.last_velocity = 0.0;
        Some(stroke)
    }

    /// Render a stroke onto `surface`; see [`render::render_stroke`]
    pub fn render_stroke(
        stroke: &Stroke,
        surface: &mut CpuSurface,
        blend_override: Option<BlendMode>,
    ) {
        render::render_stroke(stroke, surface, blend_override);
    }
}
