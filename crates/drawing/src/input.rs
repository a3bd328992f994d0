//! Canvas input adapter
//!
//! Translates host pointer events from screen space into canvas space and
//! drives a [`DesignSession`] with them.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::session::{DesignSession, StrokeStart};
use crate::types::{InputPoint, PointerKind, StrokeId};

const MIN_ZOOM: f32 = 0.01;

/// Zoom and pan of the canvas inside its host view
///
/// `screen = canvas * zoom + pan`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    zoom: f32,
    pan: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    pub fn new(zoom: f32, pan: Vec2) -> Self {
        Self {
            zoom: zoom.max(MIN_ZOOM),
            pan,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.max(MIN_ZOOM);
    }

    pub fn set_pan(&mut self, pan: Vec2) {
        self.pan = pan;
    }

    /// Zoom by `factor` keeping the canvas point under `anchor` fixed
    pub fn zoom_at(&mut self, factor: f32, anchor: Vec2) {
        let pinned = self.to_canvas(anchor);
        self.set_zoom(self.zoom * factor);
        self.pan = anchor - pinned * self.zoom;
    }

    /// Screen position to canvas position: `(screen - pan) / zoom`
    pub fn to_canvas(&self, screen: Vec2) -> Vec2 {
        (screen - self.pan) / self.zoom
    }

    /// Canvas position to screen position: `canvas * zoom + pan`
    pub fn to_screen(&self, canvas: Vec2) -> Vec2 {
        canvas * self.zoom + self.pan
    }
}

/// One pointer sample in screen space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub pressure: Option<f32>,
    #[serde(default)]
    pub pointer: PointerKind,
    pub timestamp_ms: u64,
    #[serde(default)]
    pub tilt_x: Option<f32>,
    #[serde(default)]
    pub tilt_y: Option<f32>,
    #[serde(default)]
    pub twist: Option<f32>,
}

impl PointerSample {
    pub fn new(x: f32, y: f32, pointer: PointerKind, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            pressure: None,
            pointer,
            timestamp_ms,
            tilt_x: None,
            tilt_y: None,
            twist: None,
        }
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure);
        self
    }

    /// Canvas-space sample for the session
    pub fn to_input(&self, view: &ViewTransform) -> InputPoint {
        let canvas = view.to_canvas(Vec2::new(self.x, self.y));
        InputPoint {
            x: canvas.x,
            y: canvas.y,
            pressure: self.pressure,
            pointer: self.pointer,
            timestamp_ms: self.timestamp_ms,
            tilt_x: self.tilt_x,
            tilt_y: self.tilt_y,
            twist: self.twist,
        }
    }
}

/// Pointer event forwarded by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    Down(PointerSample),
    Move(PointerSample),
    Up(PointerSample),
    /// The host lost the pointer (capture lost, gesture interrupted)
    Cancel(PointerSample),
}

impl PointerEvent {
    pub fn sample(&self) -> &PointerSample {
        match self {
            PointerEvent::Down(s)
            | PointerEvent::Move(s)
            | PointerEvent::Up(s)
            | PointerEvent::Cancel(s) => s,
        }
    }
}

/// What an event did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Started(StrokeId),
    /// Press outside every active print area
    OutsidePrintArea,
    /// Press while another stroke is live
    Busy,
    PointAdded,
    /// Sample absorbed by smoothing or spacing
    PointSkipped,
    Committed(StrokeId),
    Cancelled,
    /// No stroke to act on
    Ignored,
}

/// Turns pointer events into session stroke calls
#[derive(Debug, Default, Clone)]
pub struct CanvasInputAdapter {
    view: ViewTransform,
}

impl CanvasInputAdapter {
    pub fn new(view: ViewTransform) -> Self {
        Self { view }
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewTransform {
        &mut self.view
    }

    pub fn handle(&mut self, event: &PointerEvent, session: &mut DesignSession) -> InputOutcome {
        let input = event.sample().to_input(&self.view);
        match event {
            PointerEvent::Down(_) => match session.begin_stroke(input) {
                StrokeStart::Started(id) => InputOutcome::Started(id),
                StrokeStart::OutsidePrintArea => InputOutcome::OutsidePrintArea,
                StrokeStart::AlreadyStroking => InputOutcome::Busy,
            },
            PointerEvent::Move(_) => {
                if !session.is_stroking() {
                    return InputOutcome::Ignored;
                }
                if session.extend_stroke(input) {
                    InputOutcome::PointAdded
                } else {
                    InputOutcome::PointSkipped
                }
            }
            PointerEvent::Up(_) => {
                if !session.is_stroking() {
                    return InputOutcome::Ignored;
                }
                // The release position is part of the stroke
                session.extend_stroke(input);
                match session.finish_stroke() {
                    Some(id) => InputOutcome::Committed(id),
                    None => InputOutcome::Ignored,
                }
            }
            PointerEvent::Cancel(_) => {
                if session.abort_stroke() {
                    debug!("Pointer cancelled, stroke discarded");
                    InputOutcome::Cancelled
                } else {
                    InputOutcome::Ignored
                }
            }
        }
    }
}
