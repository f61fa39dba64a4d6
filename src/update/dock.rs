//! Docking coordinator
//!
//! Reacts to module intents: places modules into slots, vacates them,
//! resolves reattachment targets and drives slot highlighting. Geometry is
//! applied to module windows synchronously, before the handler returns.

use crate::commands::{Cmd, NoticeLevel};
use crate::error::DockError;
use crate::frame::HostWindow;
use crate::geometry::{Point, Size};
use crate::messages::DockMsg;
use crate::model::{DockModel, DragPosition, ModuleEvent, ModuleEventKind, ModuleId, ModuleKind};

use super::board::sync_geometry;

/// Update function for coordinator messages
pub fn update_dock(model: &mut DockModel, msg: DockMsg) -> Option<Cmd> {
    match msg {
        DockMsg::CloseConfirmed(id) => {
            handle_module_event(model, ModuleEvent::new(id, ModuleEventKind::Destroyed))
        }

        DockMsg::CloseCancelled(id) => {
            tracing::debug!("Close of module {} cancelled", id);
            None
        }

        DockMsg::ResizeSlot { index, size } => match model.slots.resize_slot(index, size) {
            Ok(size) => {
                tracing::debug!("slot {} resized to {}x{}", index, size.width, size.height);
                sync_geometry(model);
                Some(Cmd::Redraw)
            }
            Err(_) => None,
        },

        DockMsg::DestroyAll => {
            destroy_all(model);
            Some(Cmd::Redraw)
        }
    }
}

/// Create a module of `kind` and register it
///
/// Admission denial is soft: nothing is created and the reason is returned
/// as a notice for the user.
pub fn spawn_module<F>(model: &mut DockModel, kind: ModuleKind, open_window: F) -> Option<Cmd>
where
    F: FnOnce(&str, Size) -> Box<dyn HostWindow>,
{
    match try_spawn_module(model, kind, open_window) {
        Ok(_) => Some(Cmd::Redraw),
        Err(e) => Some(Cmd::notice(
            NoticeLevel::Warning,
            "Cannot create module",
            e.to_string(),
        )),
    }
}

/// Like `spawn_module`, but hands back the new id or the denial
pub fn try_spawn_module<F>(
    model: &mut DockModel,
    kind: ModuleKind,
    open_window: F,
) -> Result<ModuleId, DockError>
where
    F: FnOnce(&str, Size) -> Box<dyn HostWindow>,
{
    let module = model
        .factory
        .create_module(kind, &model.admission, open_window)?;
    let id = module.id();
    model.modules.push(module);
    handle_module_event(model, ModuleEvent::new(id, ModuleEventKind::Created));
    Ok(id)
}

/// Vacate, clear and drop every module (shutdown)
pub fn destroy_all(model: &mut DockModel) {
    let ids: Vec<ModuleId> = model.modules.iter().map(|m| m.id()).collect();
    for id in ids {
        handle_module_destroyed(model, id);
    }
    model.slots.clear_highlights();
    tracing::info!("All modules destroyed");
}

/// Dispatch one module intent to its handler
pub fn handle_module_event(model: &mut DockModel, event: ModuleEvent) -> Option<Cmd> {
    let id = event.module;
    match event.kind {
        ModuleEventKind::Created => handle_module_created(model, id),

        ModuleEventKind::Destroyed => {
            handle_module_destroyed(model, id);
            Some(Cmd::Redraw)
        }

        ModuleEventKind::DetachRequested => {
            // The module already went free; only the slot needs clearing
            model.slots.vacate(id);
            Some(Cmd::Redraw)
        }

        ModuleEventKind::ReattachRequested { at, explicit } => {
            handle_reattach(model, id, at, explicit)
        }

        ModuleEventKind::CloseRequested => {
            let title = model.module(id)?.title().to_string();
            if model.config.confirm_close {
                Some(Cmd::ConfirmClose { module: id, title })
            } else {
                handle_module_event(model, ModuleEvent::new(id, ModuleEventKind::Destroyed))
            }
        }

        ModuleEventKind::DragPositionChanged(position) => handle_drag_position(model, position),
    }
}

fn handle_module_created(model: &mut DockModel, id: ModuleId) -> Option<Cmd> {
    model.slots.recompute_geometry(&model.board);

    let index = match model.slots.find_first_empty() {
        Some(index) => index,
        None => model.slots.create_slot(),
    };
    place_module(model, id, index);
    Some(Cmd::Redraw)
}

/// Vacate first, then drop, so no slot ever points at a dead module
fn handle_module_destroyed(model: &mut DockModel, id: ModuleId) {
    model.slots.vacate(id);
    let Some(pos) = model.modules.iter().position(|m| m.id() == id) else {
        tracing::debug!("Destroy of unknown module {} ignored", id);
        return;
    };
    let mut module = model.modules.remove(pos);
    module.clear_content();
    tracing::info!("Destroyed module {} \"{}\"", id, module.title());
}

fn handle_reattach(model: &mut DockModel, id: ModuleId, at: Point, explicit: bool) -> Option<Cmd> {
    if model.module(id)?.is_attached() {
        return None;
    }

    let target = if explicit {
        Some(
            model
                .slots
                .find_first_empty()
                .unwrap_or_else(|| model.slots.create_slot()),
        )
    } else {
        resolve_drop_target(model, at)
    };

    match target {
        Some(index) => {
            place_module(model, id, index);
            Some(Cmd::Redraw)
        }
        None => {
            tracing::debug!("module {} released at ({}, {}); stays free", id, at.x, at.y);
            None
        }
    }
}

/// Pick the slot a module released at `at` should land in
///
/// 1. The visible slot under the point (with tolerance), if it is empty.
/// 2. Otherwise the first empty visible slot, provided the point hit a slot
///    or lies within the tolerance band around the board.
/// 3. Otherwise none: the module stays free.
fn resolve_drop_target(model: &DockModel, at: Point) -> Option<usize> {
    let slots = &model.slots;
    let board = &model.board;

    if let Some(index) = slots.find_slot_at(at, board) {
        if slots.get(index).is_some_and(|s| s.is_empty()) {
            return Some(index);
        }
        return slots.find_first_empty_visible(board);
    }

    let near_board = board
        .viewport_rect()
        .expanded(slots.layout().hit_tolerance)
        .contains(at);
    if near_board {
        return slots.find_first_empty_visible(board);
    }
    None
}

/// Put `id` into slot `index` and fit its window onto the slot
fn place_module(model: &mut DockModel, id: ModuleId, index: usize) {
    let displaced = match model.slots.place(id, index) {
        Ok(displaced) => displaced,
        Err(_) => return,
    };
    if let Some(other) = displaced {
        if let Some(module) = model.module_mut(other) {
            module.detach();
        }
    }

    model.slots.ensure_minimum_free(model.config.minimum_free_slots);
    model.slots.recompute_geometry(&model.board);

    let Some(rect) = model.slots.get(index).map(|s| s.global()) else {
        return;
    };
    let Some(module) = model.module_mut(id) else {
        tracing::warn!("Placed unknown module {} in slot {}; vacating", id, index);
        model.slots.vacate(id);
        return;
    };
    match module.attach(rect) {
        Ok(_) => {}
        Err(DockError::GeometryNotReady(_)) => {
            tracing::debug!("module {} not realized yet; attach deferred", id);
        }
        Err(e) => tracing::warn!("attach of module {} failed: {}", id, e),
    }
}

fn handle_drag_position(model: &mut DockModel, position: DragPosition) -> Option<Cmd> {
    let changed = match position {
        DragPosition::Ended => model.slots.clear_highlights(),
        DragPosition::At(point) => {
            match model.slots.find_slot_at(point, &model.board) {
                Some(index) if model.slots.get(index).is_some_and(|s| s.is_empty()) => {
                    model.slots.highlight(index)
                }
                _ => model.slots.clear_highlights(),
            }
        }
    };
    changed.then_some(Cmd::Redraw)
}
