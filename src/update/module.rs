//! Module message routing
//!
//! Feeds input to the addressed module and hands every intent it raises to
//! the coordinator, in order.

use crate::commands::Cmd;
use crate::messages::ModuleMsg;
use crate::model::DockModel;

use super::dock::handle_module_event;

pub fn update_module(model: &mut DockModel, msg: ModuleMsg) -> Option<Cmd> {
    match msg {
        ModuleMsg::Input { module, input } => {
            let Some(target) = model.module_mut(module) else {
                tracing::debug!("Input for unknown module {} dropped", module);
                return None;
            };
            let events = target.handle_input(input);
            let cmds = events
                .into_iter()
                .filter_map(|event| handle_module_event(model, event))
                .collect();
            Cmd::batch(cmds)
        }

        ModuleMsg::Event(event) => handle_module_event(model, event),
    }
}
