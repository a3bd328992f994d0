//! Stroke lifecycle for the stroke pipeline

use tracing::{debug, warn};

use crate::brush::BrushSettings;
use crate::engine::StrokeEngine;
use crate::stroke::Stroke;
use crate::surface::CpuSurface;
use crate::types::Point;

use super::StrokePipeline;

impl StrokePipeline {
    /// Begin a stroke with a snapshot of `brush`
    ///
    /// Returns false, without touching the live stroke, if one is already
    /// in progress.
    pub fn start_stroke(&mut self, point: Point, pressure: f32, brush: &BrushSettings) -> bool {
        if let Some(live) = self.engine.active_stroke() {
            warn!(
                "start_stroke: {} still in progress, rejecting new stroke",
                live.id()
            );
            return false;
        }

        self.engine.set_settings(*brush);
        self.engine.start_stroke(point, pressure);
        self.redraw_preview();
        true
    }

    /// Continue the live stroke
    ///
    /// Returns true only when a point was stored, in which case the preview
    /// has been redrawn.
    pub fn add_point(&mut self, point: Point, pressure: f32) -> bool {
        let before = match self.engine.active_stroke() {
            Some(stroke) => stroke.len(),
            None => {
                debug!("add_point: no active stroke, ignoring");
                return false;
            }
        };

        let appended = self
            .engine
            .add_point(point, pressure)
            .is_some_and(|stroke| stroke.len() > before);

        if appended {
            self.redraw_preview();
        }
        appended
    }

    /// Finish the live stroke and clear the preview
    ///
    /// The returned stroke is not yet on any persistent surface; pass it to
    /// [`StrokePipeline::rasterize_stroke`] or wrap it in a command.
    pub fn end_stroke(&mut self) -> Option<Stroke> {
        let stroke = self.engine.end_stroke()?;
        self.clear_preview();
        Some(stroke)
    }

    /// Drop the live stroke without producing anything
    ///
    /// Returns false if no stroke was in progress.
    pub fn abort_stroke(&mut self) -> bool {
        let Some(stroke) = self.engine.abort_stroke() else {
            return false;
        };
        debug!(
            "abort_stroke: discarded {} with {} points",
            stroke.id(),
            stroke.len()
        );
        self.clear_preview();
        true
    }

    /// Render a finished stroke onto the caller-owned persistent surface
    pub fn rasterize_stroke(&self, stroke: &Stroke, persistent: &mut CpuSurface) {
        StrokeEngine::render_stroke(stroke, persistent, None);
    }

    /// Check if a stroke is currently in progress
    pub fn is_stroking(&self) -> bool {
        self.engine.is_active()
    }

    /// The stroke in progress, if any
    pub fn live_stroke(&self) -> Option<&Stroke> {
        self.engine.active_stroke()
    }
}
