//! Message types for the Elm-style architecture
//!
//! All state changes flow through these message types.

use std::time::Instant;

use crate::geometry::{Point, Size};
use crate::model::{ModuleEvent, ModuleId, ModuleInput};

/// Messages addressed to one module
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModuleMsg {
    /// A gesture or window-manager notification for the module
    Input { module: ModuleId, input: ModuleInput },
    /// An intent raised outside `Module::handle_input` (lifecycle, tests)
    Event(ModuleEvent),
}

/// Coordinator-level messages
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DockMsg {
    /// The user confirmed closing a module
    CloseConfirmed(ModuleId),
    /// The user cancelled closing a module
    CloseCancelled(ModuleId),
    /// Resize one slot (clamped to the minimum slot size)
    ResizeSlot { index: usize, size: Size },
    /// Vacate and destroy every module
    DestroyAll,
}

/// Board window geometry changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoardMsg {
    /// Board content area resized
    Resized(Size),
    /// Board content area moved on screen
    Moved(Point),
    /// Scroll by a delta (positive = right/down)
    ScrollBy { dx: f32, dy: f32 },
    /// Scroll to an absolute offset
    ScrollTo(Point),
    /// Windows may have been realized; finish pending attaches
    LayoutPass,
}

/// Application-level messages
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMsg {
    /// Timer poll from the event loop (settle timers, perf sampler)
    Tick(Instant),
    SetCpuThreshold(f64),
    SetMemoryThreshold(f64),
    SetProcessMemoryThreshold(u64),
    /// Tear everything down and exit
    Quit,
}

/// Top-level message type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Msg {
    /// Module input and intents
    Module(ModuleMsg),
    /// Coordinator decisions answered by the host
    Dock(DockMsg),
    /// Board geometry
    Board(BoardMsg),
    /// Timers, thresholds, shutdown
    App(AppMsg),
}

// Convenience constructors for common messages
impl Msg {
    pub fn input(module: ModuleId, input: ModuleInput) -> Self {
        Msg::Module(ModuleMsg::Input { module, input })
    }

    pub fn tick(now: Instant) -> Self {
        Msg::App(AppMsg::Tick(now))
    }
}
