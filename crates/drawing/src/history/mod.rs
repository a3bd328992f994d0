//! Linear command history with undo and redo
//!
//! [`CommandStack`] keeps an ordered list of executed [`Command`]s and a
//! cursor splitting them into applied and undone halves. Executing a new
//! command discards the undone half. The stack does not touch pixels itself;
//! it drives a [`CommandTarget`], normally a [`ReplayCanvas`].

mod replay;

pub use replay::{CommandCallback, CommandHooks, ReplayCanvas};

use serde::Serialize;
use tracing::debug;

use crate::constants::MAX_HISTORY;
use crate::stroke::Stroke;

/// A reversible drawing operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Render a completed stroke
    AddStroke { stroke: Stroke },
    /// Clear a hard-edged disc
    EraseSegment { x: f32, y: f32, radius: f32 },
}

impl Command {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Command::AddStroke { .. } => "add-stroke",
            Command::EraseSegment { .. } => "erase-segment",
        }
    }
}

/// Whatever a command stack applies its commands to
pub trait CommandTarget {
    /// Apply `command` on top of the current state
    fn execute(&mut self, command: &Command);

    /// Revert `command`
    ///
    /// `applied` holds the commands still in effect afterwards, oldest first.
    fn undo(&mut self, command: &Command, applied: &[Command]);

    /// `command` fell off the front of the history and can no longer be undone
    fn evict(&mut self, _command: &Command) {}
}

/// Bounded linear undo history
#[derive(Debug, Clone)]
pub struct CommandStack {
    commands: Vec<Command>,
    /// Number of applied commands; `commands[..cursor]` are in effect
    cursor: usize,
    max_commands: usize,
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }
}

impl CommandStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stack keeping at most `max_commands` (at least 1) commands
    pub fn with_capacity(max_commands: usize) -> Self {
        Self {
            commands: Vec::new(),
            cursor: 0,
            max_commands: max_commands.max(1),
        }
    }

    pub fn max_commands(&self) -> usize {
        self.max_commands
    }

    /// Execute `command`, dropping any undone commands first
    ///
    /// When the history grows past its cap the oldest command is evicted and
    /// handed to [`CommandTarget::evict`].
    pub fn execute_command<T: CommandTarget + ?Sized>(&mut self, command: Command, target: &mut T) {
        if self.cursor < self.commands.len() {
            debug!(
                "execute_command: discarding {} undone commands",
                self.commands.len() - self.cursor
            );
            self.commands.truncate(self.cursor);
        }

        target.execute(&command);
        self.commands.push(command);
        self.cursor += 1;

        if self.commands.len() > self.max_commands {
            let evicted = self.commands.remove(0);
            self.cursor -= 1;
            debug!("execute_command: evicted oldest {}", evicted.kind());
            target.evict(&evicted);
        }
    }

    /// Undo the most recent applied command
    ///
    /// Returns false if nothing is applied.
    pub fn undo<T: CommandTarget + ?Sized>(&mut self, target: &mut T) -> bool {
        if self.cursor == 0 {
            debug!("Undo: no commands applied");
            return false;
        }
        self.cursor -= 1;
        let (applied, rest) = self.commands.split_at(self.cursor);
        target.undo(&rest[0], applied);
        true
    }

    /// Re-execute the next undone command
    ///
    /// Returns false if nothing has been undone.
    pub fn redo<T: CommandTarget + ?Sized>(&mut self, target: &mut T) -> bool {
        let Some(command) = self.commands.get(self.cursor) else {
            debug!("Redo: no commands undone");
            return false;
        };
        target.execute(command);
        self.cursor += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    /// Forget every command
    pub fn clear(&mut self) {
        self.commands.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All retained commands, oldest first
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Index of the last applied command, None when nothing is applied
    pub fn current_index(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }

    /// Commands currently in effect, oldest first
    pub fn applied(&self) -> &[Command] {
        &self.commands[..self.cursor]
    }
}
