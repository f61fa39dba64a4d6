//! App-level handlers: timer ticks, runtime threshold changes, shutdown

use std::time::Instant;

use crate::commands::{Cmd, NoticeLevel};
use crate::messages::AppMsg;
use crate::model::DockModel;

use super::dock::{destroy_all, handle_module_event};

pub fn update_app(model: &mut DockModel, msg: AppMsg) -> Option<Cmd> {
    match msg {
        AppMsg::Tick(now) => handle_tick(model, now),

        AppMsg::SetCpuThreshold(percent) => {
            model.admission.set_cpu_threshold(percent);
            model.config.cpu_threshold = percent;
            tracing::info!("CPU threshold set to {:.1}%", percent);
            None
        }

        AppMsg::SetMemoryThreshold(percent) => {
            model.admission.set_memory_threshold(percent);
            model.config.memory_threshold = percent;
            tracing::info!("Memory threshold set to {:.1}%", percent);
            None
        }

        AppMsg::SetProcessMemoryThreshold(mb) => {
            model.admission.set_process_memory_threshold(mb);
            model.config.process_memory_threshold_mb = mb;
            tracing::info!("Process memory threshold set to {} MB", mb);
            None
        }

        AppMsg::Quit => {
            destroy_all(model);
            Some(Cmd::Quit)
        }
    }
}

/// Fire due settle timers, then the performance sampler
fn handle_tick(model: &mut DockModel, now: Instant) -> Option<Cmd> {
    let mut cmds = Vec::new();

    let settled: Vec<_> = model
        .modules
        .iter_mut()
        .filter_map(|m| m.settle_due(now))
        .collect();
    for event in settled {
        tracing::debug!("module {} settled", event.module);
        cmds.extend(handle_module_event(model, event));
    }

    if let Some(warnings) = model.admission.poll(now) {
        let current: Vec<_> = warnings.iter().map(|w| w.resource).collect();
        for warning in &warnings {
            if !model.active_warnings.contains(&warning.resource) {
                tracing::warn!("{}", warning);
                cmds.push(Cmd::notice(
                    NoticeLevel::Warning,
                    "Performance warning",
                    warning.message.clone(),
                ));
            }
        }
        model.active_warnings = current;
    }

    Cmd::batch(cmds)
}
