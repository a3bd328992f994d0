//! Replay-based command target
//!
//! Undo rebuilds the persistent surface from scratch: start from `base`
//! and re-apply every command still in effect. Commands evicted from the
//! history are baked into `base` so the replay stays exact after the cap is
//! reached.

use glam::Vec2;
use tracing::debug;

use crate::render::{self, LineStyle};
use crate::surface::CpuSurface;
use crate::types::BlendMode;

use super::{Command, CommandTarget};

/// Callback receiving a command and the surface after it took effect
pub type CommandCallback = Box<dyn FnMut(&Command, &CpuSurface) + Send>;

/// Synchronous observers of command execution
#[derive(Default)]
pub struct CommandHooks {
    /// Called after a command is executed or redone
    pub on_execute: Option<CommandCallback>,
    /// Called after a command is undone
    pub on_undo: Option<CommandCallback>,
}

impl std::fmt::Debug for CommandHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHooks")
            .field("on_execute", &self.on_execute.is_some())
            .field("on_undo", &self.on_undo.is_some())
            .finish()
    }
}

/// Persistent design surface driven by a command stack
#[derive(Debug)]
pub struct ReplayCanvas {
    /// Effect of commands that left the history
    base: CpuSurface,
    surface: CpuSurface,
    hooks: CommandHooks,
}

impl ReplayCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            base: CpuSurface::new(width, height),
            surface: CpuSurface::new(width, height),
            hooks: CommandHooks::default(),
        }
    }

    /// The persistent surface
    pub fn surface(&self) -> &CpuSurface {
        &self.surface
    }

    /// Surface undo replays start from
    pub fn base(&self) -> &CpuSurface {
        &self.base
    }

    pub fn hooks_mut(&mut self) -> &mut CommandHooks {
        &mut self.hooks
    }

    /// Clear both surfaces, keeping the hooks
    pub fn reset(&mut self) {
        self.base.clear_rect(0, 0, self.base.width, self.base.height);
        self.surface
            .clear_rect(0, 0, self.surface.width, self.surface.height);
    }

    /// Apply one command's pixels to `surface`
    pub fn apply(command: &Command, surface: &mut CpuSurface) {
        match command {
            Command::AddStroke { stroke } => render::render_stroke(stroke, surface, None),
            Command::EraseSegment { x, y, radius } => {
                let style = LineStyle {
                    width: radius * 2.0,
                    color: [0.0, 0.0, 0.0, 1.0],
                    alpha: 1.0,
                    hardness: 1.0,
                    mode: BlendMode::DestinationOut,
                };
                render::stroke_polyline(surface, &[Vec2::new(*x, *y)], &style);
            }
        }
    }
}

impl CommandTarget for ReplayCanvas {
    fn execute(&mut self, command: &Command) {
        Self::apply(command, &mut self.surface);
        if let Some(callback) = self.hooks.on_execute.as_mut() {
            callback(command, &self.surface);
        }
    }

    fn undo(&mut self, command: &Command, applied: &[Command]) {
        debug!(
            "Undoing {} by replaying {} commands",
            command.kind(),
            applied.len()
        );
        self.surface.clone_from(&self.base);
        for previous in applied {
            Self::apply(previous, &mut self.surface);
        }
        if let Some(callback) = self.hooks.on_undo.as_mut() {
            callback(command, &self.surface);
        }
    }

    fn evict(&mut self, command: &Command) {
        Self::apply(command, &mut self.base);
    }
}
