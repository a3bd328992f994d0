//! Stroke pipeline
//!
//! This module owns the session state the stroke engine needs while a
//! gesture is in progress:
//! - The live stroke (through [`StrokeEngine`])
//! - A preview surface, cleared and redrawn whenever the stroke grows
//! - Rasterization of finished strokes onto a caller-owned persistent surface
//!
//! Only one stroke may be live at a time. A second `start_stroke` is
//! rejected and leaves the live stroke untouched.

mod stroke;
mod surface_ops;

use crate::brush::BrushSettings;
use crate::engine::StrokeEngine;
use crate::surface::CpuSurface;

/// Live-stroke session with its preview surface
#[derive(Debug)]
pub struct StrokePipeline {
    /// Stroke engine with smoothing state
    pub(crate) engine: StrokeEngine,
    /// Transient surface showing the in-progress stroke
    pub(crate) preview: CpuSurface,
}

impl StrokePipeline {
    /// Create a pipeline whose preview matches the given canvas size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            engine: StrokeEngine::default(),
            preview: CpuSurface::new(width, height),
        }
    }

    /// Get the preview width
    pub fn width(&self) -> u32 {
        self.preview.width
    }

    /// Get the preview height
    pub fn height(&self) -> u32 {
        self.preview.height
    }

    /// Brush settings used by the next stroke
    pub fn brush(&self) -> &BrushSettings {
        self.engine.settings()
    }

    /// Set the brush settings used by the next stroke
    pub fn set_brush(&mut self, brush: BrushSettings) {
        self.engine.set_settings(brush);
    }
}
