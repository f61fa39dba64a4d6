//! Update functions for the Elm-style architecture
//!
//! All state transformations flow through these functions.

mod app;
mod board;
pub mod dock;
mod module;

use crate::commands::Cmd;
use crate::messages::Msg;
use crate::model::DockModel;

#[cfg(debug_assertions)]
use crate::tracing::LayoutSnapshot;
#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

pub use app::update_app;
pub use board::{sync_geometry, update_board};
pub use dock::{
    destroy_all, handle_module_event, spawn_module, try_spawn_module, update_dock,
};
pub use module::update_module;

/// Main update function - dispatches to sub-handlers
///
/// In debug builds, this wraps with tracing instrumentation.
/// In release builds, it's a direct dispatch with zero overhead.
#[inline]
pub fn update(model: &mut DockModel, msg: Msg) -> Option<Cmd> {
    #[cfg(debug_assertions)]
    {
        update_traced(model, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(model, msg)
    }
}

fn update_inner(model: &mut DockModel, msg: Msg) -> Option<Cmd> {
    match msg {
        Msg::Module(m) => update_module(model, m),
        Msg::Dock(m) => update_dock(model, m),
        Msg::Board(m) => update_board(model, m),
        Msg::App(m) => update_app(model, m),
    }
}

/// Update with tracing span, layout diff logging and occupancy checks
#[cfg(debug_assertions)]
fn update_traced(model: &mut DockModel, msg: Msg) -> Option<Cmd> {
    // Ticks arrive constantly
    let is_noisy = matches!(msg, Msg::App(crate::messages::AppMsg::Tick(_)));

    let msg_name = msg_type_name(&msg);
    let _span = if is_noisy {
        None
    } else {
        Some(span!(Level::DEBUG, "update", msg = %msg_name).entered())
    };

    let before = LayoutSnapshot::from_model(model);
    if !is_noisy {
        debug!(target: "message", msg = %msg_name, "processing");
    }

    let result = update_inner(model, msg);

    let after = LayoutSnapshot::from_model(model);
    if let Some(diff) = before.diff(&after) {
        debug!(target: "layout", %diff, "layout changed");
    }

    if let Err(e) = model.verify_occupancy() {
        panic!("occupancy invariant broken after {}: {}", msg_name, e);
    }

    result
}

/// Display name for a message, e.g. `Board::ScrollBy { dx: 40.0, dy: 0.0 }`
#[cfg(debug_assertions)]
fn msg_type_name(msg: &Msg) -> String {
    match msg {
        Msg::Module(m) => format!("Module::{:?}", m),
        Msg::Dock(m) => format!("Dock::{:?}", m),
        Msg::Board(m) => format!("Board::{:?}", m),
        Msg::App(m) => format!("App::{:?}", m),
    }
}
