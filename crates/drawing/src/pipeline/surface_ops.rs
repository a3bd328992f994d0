//! Preview surface operations for the stroke pipeline

use crate::engine::StrokeEngine;
use crate::surface::CpuSurface;

use super::StrokePipeline;

impl StrokePipeline {
    /// The live preview surface
    pub fn preview(&self) -> &CpuSurface {
        &self.preview
    }

    /// Clear the preview and redraw the whole live stroke
    pub(crate) fn redraw_preview(&mut self) {
        self.clear_preview();
        if let Some(stroke) = self.engine.active_stroke() {
            StrokeEngine::render_stroke(stroke, &mut self.preview, None);
        }
    }

    /// Reset the preview to transparent
    pub(crate) fn clear_preview(&mut self) {
        let (width, height) = (self.preview.width, self.preview.height);
        self.preview.clear_rect(0, 0, width, height);
    }

    /// Replace the preview with one of a new size, dropping its contents
    pub fn resize_preview(&mut self, width: u32, height: u32) {
        self.preview = CpuSurface::new(width, height);
        self.redraw_preview();
    }
}
