//! Command types for the Elm-style architecture
//!
//! Commands represent side effects the host performs after an update.
//! Geometry changes are not commands: the coordinator applies them to module
//! windows synchronously inside `update`.

use crate::model::ModuleId;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// Commands returned by update functions
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Request a redraw of the board and module windows
    Redraw,
    /// Ask the user whether to close a module
    /// Answered with `DockMsg::CloseConfirmed` or `DockMsg::CloseCancelled`
    ConfirmClose { module: ModuleId, title: String },
    /// Show a non-blocking notice (admission denials, resource warnings)
    ShowNotice {
        level: NoticeLevel,
        title: String,
        message: String,
    },
    /// Execute multiple commands
    Batch(Vec<Cmd>),
    /// Request application exit
    Quit,
}

impl Cmd {
    /// Combine commands, dropping `None`s and collapsing trivial batches
    pub fn batch(cmds: Vec<Cmd>) -> Option<Cmd> {
        let mut cmds: Vec<Cmd> = cmds.into_iter().filter(|c| *c != Cmd::None).collect();
        match cmds.len() {
            0 => None,
            1 => cmds.pop(),
            _ => Some(Cmd::Batch(cmds)),
        }
    }

    pub fn notice(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Cmd::ShowNotice {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Check if this command requires a redraw
    pub fn needs_redraw(&self) -> bool {
        match self {
            Cmd::None => false,
            Cmd::Redraw => true,
            // Dialogs answer with messages that trigger their own redraw
            Cmd::ConfirmClose { .. } => false,
            Cmd::ShowNotice { .. } => false,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.needs_redraw()),
            Cmd::Quit => false,
        }
    }

    /// Flatten nested batches into a list of leaf commands
    pub fn into_vec(self) -> Vec<Cmd> {
        match self {
            Cmd::None => Vec::new(),
            Cmd::Batch(cmds) => cmds.into_iter().flat_map(Cmd::into_vec).collect(),
            other => vec![other],
        }
    }
}
