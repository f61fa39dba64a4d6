//! Board geometry handlers
//!
//! Every resize, move or scroll recomputes slot geometry first and then
//! re-fits each attached module in the same call, so attached windows never
//! trail the board.

use crate::commands::Cmd;
use crate::error::DockError;
use crate::messages::BoardMsg;
use crate::model::DockModel;

pub fn update_board(model: &mut DockModel, msg: BoardMsg) -> Option<Cmd> {
    match msg {
        BoardMsg::Resized(size) => {
            let content = model.content_size();
            model.board.set_size(size, content);
            // Slot height follows the viewport, so the extent may have changed
            let content = model.content_size();
            model.board.set_scroll(model.board.scroll(), content);
            sync_geometry(model);
            Some(Cmd::Redraw)
        }

        BoardMsg::Moved(origin) => {
            model.board.set_origin(origin);
            sync_geometry(model);
            None
        }

        BoardMsg::ScrollBy { dx, dy } => {
            let before = model.board.scroll();
            let content = model.content_size();
            model.board.scroll_by(dx, dy, content);
            if model.board.scroll() == before {
                return None;
            }
            sync_geometry(model);
            Some(Cmd::Redraw)
        }

        BoardMsg::ScrollTo(offset) => {
            let content = model.content_size();
            model.board.set_scroll(offset, content);
            sync_geometry(model);
            Some(Cmd::Redraw)
        }

        BoardMsg::LayoutPass => {
            let pending = model
                .modules
                .iter()
                .any(|m| m.pending_attach().is_some());
            sync_geometry(model);
            pending.then_some(Cmd::Redraw)
        }
    }
}

/// Recompute slot rectangles, then fit every attached module onto its slot
pub fn sync_geometry(model: &mut DockModel) {
    model.slots.recompute_geometry(&model.board);

    let slots = &model.slots;
    for module in model.modules.iter_mut().filter(|m| m.is_attached()) {
        let Some(rect) = slots.slot_of(module.id()).and_then(|i| slots.get(i)).map(|s| s.global())
        else {
            continue;
        };
        match module.reposition(rect) {
            Ok(_) | Err(DockError::GeometryNotReady(_)) => {}
            Err(e) => tracing::warn!("repositioning module {} failed: {}", module.id(), e),
        }
    }
}
