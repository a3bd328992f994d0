//! Design session: the drawing core wired together
//!
//! A [`DesignSession`] owns everything one design document needs:
//! - The stroke pipeline with its preview surface
//! - The persistent surface behind a replay-based command stack
//! - The print-area mask manager used to gate strokes and clip exports
//!
//! Hosts feed it canvas-space samples (directly or through
//! [`crate::input::CanvasInputAdapter`]) and observe it through
//! [`SessionEvent`] listeners.

use loomcraft_config::StudioConfig;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::brush::{BrushPreset, BrushSettings};
use crate::error::ExportError;
use crate::history::{Command, CommandHooks, CommandStack, ReplayCanvas};
use crate::mask::{GarmentMask, GarmentView, MaskManager};
use crate::pipeline::StrokePipeline;
use crate::surface::CpuSurface;
use crate::types::{InputPoint, StrokeId};

/// Lifecycle notifications from a design session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    StrokeStarted {
        stroke_id: StrokeId,
        x: f32,
        y: f32,
        timestamp_ms: u64,
    },
    StrokeCommitted {
        stroke_id: StrokeId,
        point_count: usize,
    },
    StrokeAborted {
        stroke_id: StrokeId,
        reason: String,
    },
    Erased {
        x: f32,
        y: f32,
        radius: f32,
    },
    Undone {
        command: &'static str,
    },
    Redone {
        command: &'static str,
    },
    HistoryReset,
    MaskChanged {
        garment_type: Option<String>,
        view: Option<GarmentView>,
    },
}

/// Result of attempting to begin a stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeStart {
    Started(StrokeId),
    /// The start point lies outside every active print area
    OutsidePrintArea,
    /// Another stroke is still in progress
    AlreadyStroking,
}

type SessionListener = Box<dyn Fn(SessionEvent) + Send + Sync>;

/// One design document being drawn
pub struct DesignSession {
    config: StudioConfig,
    brush: BrushSettings,
    pipeline: StrokePipeline,
    history: CommandStack,
    canvas: ReplayCanvas,
    masks: MaskManager,
    listeners: Vec<SessionListener>,
}

impl std::fmt::Debug for DesignSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignSession")
            .field("brush", &self.brush.brush_type)
            .field("stroking", &self.pipeline.is_stroking())
            .field("history_len", &self.history.len())
            .field(
                "garment",
                &self.masks.active_mask().map(|m| m.garment_type.as_str()),
            )
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

impl Default for DesignSession {
    fn default() -> Self {
        Self::new(StudioConfig::default())
    }
}

impl DesignSession {
    /// Create a session and load the configured default garment
    pub fn new(config: StudioConfig) -> Self {
        let (width, height) = (config.canvas.width, config.canvas.height);
        let mut masks = MaskManager::new();
        if let Some(garment) = config.default_garment.as_deref() {
            masks.load_garment_mask(garment);
        }
        info!(
            "Design session created: {}x{} canvas, history of {}",
            width, height, config.history.max_commands
        );

        Self {
            brush: BrushSettings::default(),
            pipeline: StrokePipeline::new(width, height),
            history: CommandStack::with_capacity(config.history.max_commands),
            canvas: ReplayCanvas::new(width, height),
            masks,
            listeners: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Register a listener receiving a clone of every session event
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(SessionEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn emit_event(&self, event: SessionEvent) {
        for listener in &self.listeners {
            listener(event.clone());
        }
    }

    // --- Strokes ---

    /// Begin a stroke at a canvas-space sample
    ///
    /// Strokes may only start inside an active print area. Points added
    /// later are not gated; print output is clipped on export instead.
    pub fn begin_stroke(&mut self, input: InputPoint) -> StrokeStart {
        if let Some(live) = self.pipeline.live_stroke() {
            warn!("begin_stroke: {} still in progress", live.id());
            return StrokeStart::AlreadyStroking;
        }
        if !self.masks.is_point_in_print_area(input.x, input.y) {
            debug!(
                "begin_stroke: ({:.1}, {:.1}) outside print areas",
                input.x, input.y
            );
            return StrokeStart::OutsidePrintArea;
        }

        let point = input.resolve(&self.config.pressure);
        if !self.pipeline.start_stroke(point, point.pressure, &self.brush) {
            return StrokeStart::AlreadyStroking;
        }
        let Some(stroke_id) = self.pipeline.live_stroke().map(|s| s.id()) else {
            return StrokeStart::AlreadyStroking;
        };

        self.emit_event(SessionEvent::StrokeStarted {
            stroke_id,
            x: point.x,
            y: point.y,
            timestamp_ms: point.timestamp_ms,
        });
        StrokeStart::Started(stroke_id)
    }

    /// Feed a sample to the live stroke; true when a point was stored
    pub fn extend_stroke(&mut self, input: InputPoint) -> bool {
        let point = input.resolve(&self.config.pressure);
        self.pipeline.add_point(point, point.pressure)
    }

    /// Finish the live stroke and commit it to the history
    pub fn finish_stroke(&mut self) -> Option<StrokeId> {
        let stroke = self.pipeline.end_stroke()?;
        let stroke_id = stroke.id();
        let point_count = stroke.len();

        self.history
            .execute_command(Command::AddStroke { stroke }, &mut self.canvas);
        debug!("finish_stroke: committed {} ({} points)", stroke_id, point_count);

        self.emit_event(SessionEvent::StrokeCommitted {
            stroke_id,
            point_count,
        });
        Some(stroke_id)
    }

    /// Discard the live stroke; nothing is committed
    pub fn abort_stroke(&mut self) -> bool {
        let Some(stroke_id) = self.pipeline.live_stroke().map(|s| s.id()) else {
            return false;
        };
        self.pipeline.abort_stroke();
        self.emit_event(SessionEvent::StrokeAborted {
            stroke_id,
            reason: "cancelled".to_string(),
        });
        true
    }

    pub fn is_stroking(&self) -> bool {
        self.pipeline.is_stroking()
    }

    // --- History ---

    /// Clear a disc of the persistent surface as an undoable command
    pub fn erase_at(&mut self, x: f32, y: f32, radius: f32) {
        self.history
            .execute_command(Command::EraseSegment { x, y, radius }, &mut self.canvas);
        self.emit_event(SessionEvent::Erased { x, y, radius });
    }

    pub fn undo(&mut self) -> bool {
        let Some(command) = self.history.applied().last().map(Command::kind) else {
            return false;
        };
        if !self.history.undo(&mut self.canvas) {
            return false;
        }
        self.emit_event(SessionEvent::Undone { command });
        true
    }

    pub fn redo(&mut self) -> bool {
        let next = self.history.applied().len();
        let Some(command) = self.history.commands().get(next).map(Command::kind) else {
            return false;
        };
        if !self.history.redo(&mut self.canvas) {
            return false;
        }
        self.emit_event(SessionEvent::Redone { command });
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &CommandStack {
        &self.history
    }

    /// Drop the history and both surfaces, e.g. when switching documents
    pub fn reset(&mut self) {
        if let Some(stroke_id) = self.pipeline.live_stroke().map(|s| s.id()) {
            self.pipeline.abort_stroke();
            self.emit_event(SessionEvent::StrokeAborted {
                stroke_id,
                reason: "reset".to_string(),
            });
        }
        self.history.clear();
        self.canvas.reset();
        info!("Design session reset");
        self.emit_event(SessionEvent::HistoryReset);
    }

    /// Hooks invoked with each executed or undone command
    pub fn command_hooks_mut(&mut self) -> &mut CommandHooks {
        self.canvas.hooks_mut()
    }

    // --- Brush ---

    /// Brush used by the next stroke
    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn set_brush(&mut self, brush: BrushSettings) {
        self.brush = brush.normalized();
    }

    /// Switch to a preset, keeping the current ink color unless erasing
    pub fn apply_preset(&mut self, preset: BrushPreset) {
        let settings = preset.settings();
        self.brush = if settings.is_eraser() {
            settings
        } else {
            settings.with_color(self.brush.color)
        };
        debug!("apply_preset: {}", preset.name());
    }

    // --- Masks ---

    pub fn masks(&self) -> &MaskManager {
        &self.masks
    }

    /// Activate the built-in mask for `garment_type`; false on a miss
    pub fn select_garment(&mut self, garment_type: &str) -> bool {
        let found = self.masks.load_garment_mask(garment_type).is_some();
        self.emit_mask_changed();
        found
    }

    pub fn install_mask(&mut self, mask: GarmentMask) {
        self.masks.install_mask(mask);
        self.emit_mask_changed();
    }

    pub fn clear_mask(&mut self) {
        self.masks.clear_mask();
        self.emit_mask_changed();
    }

    pub fn set_view(&mut self, view: Option<GarmentView>) {
        self.masks.set_view(view);
        self.emit_mask_changed();
    }

    fn emit_mask_changed(&self) {
        self.emit_event(SessionEvent::MaskChanged {
            garment_type: self.masks.active_mask().map(|m| m.garment_type.clone()),
            view: self.masks.view(),
        });
    }

    // --- Surfaces and export ---

    /// The persistent design surface
    pub fn surface(&self) -> &CpuSurface {
        self.canvas.surface()
    }

    /// Preview surface showing the live stroke
    pub fn preview(&self) -> &CpuSurface {
        self.pipeline.preview()
    }

    /// The full design as PNG bytes
    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        self.canvas.surface().encode_png()
    }

    /// The full design as a PNG data URL
    pub fn export_data_url(&self) -> Result<String, ExportError> {
        self.canvas.surface().to_data_url()
    }

    /// The design clipped to the active print areas, as PNG bytes
    pub fn export_printable_png(&self) -> Result<Vec<u8>, ExportError> {
        self.masks
            .clip_canvas_to_mask(self.canvas.surface())
            .encode_png()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::types::PointerKind;

    fn sample(x: f32, y: f32, t: u64) -> InputPoint {
        InputPoint::new(x, y, PointerKind::Mouse, t)
    }

    fn recorded(session: &mut DesignSession) -> Arc<Mutex<Vec<SessionEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        session.subscribe(move |event| sink.lock().unwrap().push(event));
        events
    }

    fn draw_line(session: &mut DesignSession, y: f32) -> Option<StrokeId> {
        assert!(matches!(
            session.begin_stroke(sample(300.0, y, 0)),
            StrokeStart::Started(_)
        ));
        for i in 1..=10 {
            session.extend_stroke(sample(300.0 + i as f32 * 10.0, y, i * 16));
        }
        session.finish_stroke()
    }

    #[test]
    fn test_default_session_loads_tshirt() {
        let session = DesignSession::default();
        let mask = session.masks().active_mask().unwrap();
        assert_eq!(mask.garment_type, "tshirt");
        assert_eq!(session.surface().width, 800);
        assert_eq!(session.surface().height, 1000);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_stroke_commits_to_history() {
        let mut session = DesignSession::default();
        let events = recorded(&mut session);

        let id = draw_line(&mut session, 400.0).unwrap();
        assert!(session.can_undo());
        assert!(session.surface().alpha_at(350, 400) > 0.0);
        assert!(session.preview().is_blank());

        let events = events.lock().unwrap();
        assert!(matches!(events[0], SessionEvent::StrokeStarted { stroke_id, .. } if stroke_id == id));
        assert!(matches!(events[1], SessionEvent::StrokeCommitted { stroke_id, .. } if stroke_id == id));
    }

    #[test]
    fn test_start_outside_print_area_rejected() {
        let mut session = DesignSession::default();
        assert_eq!(
            session.begin_stroke(sample(5.0, 5.0, 0)),
            StrokeStart::OutsidePrintArea
        );
        assert!(!session.is_stroking());
        assert!(session.finish_stroke().is_none());
    }

    #[test]
    fn test_no_mask_blocks_strokes() {
        let mut session = DesignSession::new(StudioConfig {
            default_garment: None,
            ..StudioConfig::default()
        });
        assert_eq!(
            session.begin_stroke(sample(400.0, 400.0, 0)),
            StrokeStart::OutsidePrintArea
        );
    }

    #[test]
    fn test_second_begin_rejected() {
        let mut session = DesignSession::default();
        let StrokeStart::Started(first) = session.begin_stroke(sample(300.0, 300.0, 0)) else {
            panic!("stroke should start inside the front print area");
        };
        assert_eq!(
            session.begin_stroke(sample(310.0, 310.0, 5)),
            StrokeStart::AlreadyStroking
        );
        assert_eq!(session.finish_stroke(), Some(first));
    }

    #[test]
    fn test_stroke_continues_outside_print_area() {
        let mut session = DesignSession::default();
        session.begin_stroke(sample(210.0, 230.0, 0));
        for i in 1..=20 {
            session.extend_stroke(sample(210.0 - i as f32 * 5.0, 230.0, i * 16));
        }
        session.finish_stroke().unwrap();

        // Ink outside the area stays on the design, printable output drops it
        assert!(session.surface().alpha_at(150, 230) > 0.0);
        let printable = session.masks().clip_canvas_to_mask(session.surface());
        assert_eq!(printable.alpha_at(150, 230), 0.0);
        assert!(printable.alpha_at(205, 230) > 0.0);
    }

    #[test]
    fn test_abort_commits_nothing() {
        let mut session = DesignSession::default();
        let events = recorded(&mut session);
        session.begin_stroke(sample(300.0, 300.0, 0));
        session.extend_stroke(sample(340.0, 300.0, 16));

        assert!(session.abort_stroke());
        assert!(!session.abort_stroke());
        assert!(!session.can_undo());
        assert!(session.surface().is_blank());
        assert!(session.preview().is_blank());
        assert!(matches!(
            events.lock().unwrap().last(),
            Some(SessionEvent::StrokeAborted { .. })
        ));
    }

    #[test]
    fn test_undo_redo_events() {
        let mut session = DesignSession::default();
        draw_line(&mut session, 400.0);
        session.erase_at(350.0, 400.0, 10.0);
        assert_eq!(session.surface().alpha_at(350, 400), 0.0);

        let events = recorded(&mut session);
        assert!(session.undo());
        assert!(session.surface().alpha_at(350, 400) > 0.0);
        assert!(session.redo());
        assert!(!session.redo());
        assert_eq!(session.surface().alpha_at(350, 400), 0.0);

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                SessionEvent::Undone {
                    command: "erase-segment"
                },
                SessionEvent::Redone {
                    command: "erase-segment"
                },
            ]
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = DesignSession::default();
        draw_line(&mut session, 400.0);
        session.begin_stroke(sample(300.0, 500.0, 500));
        let live_id = session.pipeline.live_stroke().map(|s| s.id()).unwrap();

        let events = recorded(&mut session);
        session.reset();
        assert!(!session.can_undo());
        assert!(!session.can_redo());
        assert!(!session.is_stroking());
        assert!(session.surface().is_blank());
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                SessionEvent::StrokeAborted {
                    stroke_id: live_id,
                    reason: "reset".to_string(),
                },
                SessionEvent::HistoryReset,
            ]
        );
    }

    #[test]
    fn test_reset_while_idle_skips_abort_event() {
        let mut session = DesignSession::default();
        draw_line(&mut session, 400.0);

        let events = recorded(&mut session);
        session.reset();
        assert_eq!(*events.lock().unwrap(), vec![SessionEvent::HistoryReset]);
    }

    #[test]
    fn test_history_cap_from_config() {
        let mut config = StudioConfig::default();
        config.history.max_commands = 3;
        let mut session = DesignSession::new(config);
        for i in 0..5 {
            session.erase_at(i as f32, 0.0, 1.0);
        }
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_brush_snapshot_per_stroke() {
        let mut session = DesignSession::default();
        session.apply_preset(BrushPreset::Marker);
        session.begin_stroke(sample(300.0, 300.0, 0));
        session.apply_preset(BrushPreset::Spray);
        session.extend_stroke(sample(360.0, 300.0, 16));
        session.finish_stroke();

        let Some(Command::AddStroke { stroke }) = session.history().commands().first() else {
            panic!("expected a committed stroke");
        };
        assert_eq!(stroke.brush().size, 12.0);
        assert_eq!(session.brush().size, 24.0);
    }

    #[test]
    fn test_apply_preset_keeps_color() {
        let mut session = DesignSession::default();
        session.set_brush(BrushSettings::default().with_color([1.0, 0.0, 0.0, 1.0]));
        session.apply_preset(BrushPreset::Marker);
        assert_eq!(session.brush().color, [1.0, 0.0, 0.0, 1.0]);

        session.apply_preset(BrushPreset::Eraser);
        assert_eq!(*session.brush(), BrushPreset::Eraser.settings());
    }

    #[test]
    fn test_mask_events() {
        let mut session = DesignSession::default();
        let events = recorded(&mut session);

        assert!(!session.select_garment("scarf"));
        assert!(session.select_garment("cap"));
        session.set_view(Some(GarmentView::Back));
        session.clear_mask();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            SessionEvent::MaskChanged {
                garment_type: None,
                view: None
            }
        );
        assert_eq!(
            events[2],
            SessionEvent::MaskChanged {
                garment_type: Some("cap".into()),
                view: Some(GarmentView::Back)
            }
        );
    }

    #[test]
    fn test_exports() {
        let mut session = DesignSession::default();
        draw_line(&mut session, 400.0);

        let png = session.export_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert!(
            session
                .export_data_url()
                .unwrap()
                .starts_with("data:image/png;base64,")
        );

        let printable = image::load_from_memory(&session.export_printable_png().unwrap())
            .unwrap()
            .to_rgba8();
        assert_eq!(printable.get_pixel(5, 5)[3], 0);
        assert!(printable.get_pixel(350, 400)[3] > 0);
    }

    #[test]
    fn test_command_hooks() {
        let mut session = DesignSession::default();
        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();
        session.command_hooks_mut().on_execute = Some(Box::new(move |_, _| {
            *sink.lock().unwrap() += 1;
        }));

        draw_line(&mut session, 400.0);
        session.erase_at(10.0, 10.0, 2.0);
        assert_eq!(*count.lock().unwrap(), 2);
    }
}
