//! Debug tracing infrastructure
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=layout=debug,message=debug` - scoped filtering
//! - `RUST_LOG=dockyard::update=debug` - module-level filtering
//!
//! # Log Files
//!
//! Logs are written to `~/.config/dockyard/logs/dockyard.log` with daily
//! rotation, always at debug level.

use serde::Serialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::model::{AttachState, DockModel};

/// Initialize tracing subscriber with console and file logging
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender =
                tracing_appender::rolling::daily(logs_dir, crate::config_paths::LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of slot occupancy for diffing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSnapshot {
    /// Occupant id per slot, in slot order
    pub occupants: Vec<Option<u64>>,
    pub highlighted: Option<usize>,
    pub free_modules: Vec<u64>,
    pub scroll: (f32, f32),
}

impl LayoutSnapshot {
    pub fn from_model(model: &DockModel) -> Self {
        Self {
            occupants: model
                .slots
                .iter()
                .map(|s| s.occupant().map(|id| id.0))
                .collect(),
            highlighted: model
                .slots
                .iter()
                .find(|s| s.is_highlighted())
                .map(|s| s.index()),
            free_modules: model
                .modules
                .iter()
                .filter(|m| m.attach_state() == AttachState::Free)
                .map(|m| m.id().0)
                .collect(),
            scroll: (model.board.scroll().x, model.board.scroll().y),
        }
    }

    /// Describe what changed between two snapshots
    pub fn diff(&self, other: &LayoutSnapshot) -> Option<String> {
        let mut changes = Vec::new();

        if self.occupants.len() != other.occupants.len() {
            changes.push(format!(
                "slot count: {} → {}",
                self.occupants.len(),
                other.occupants.len()
            ));
        }

        for (i, (before, after)) in self.occupants.iter().zip(&other.occupants).enumerate() {
            if before != after {
                changes.push(format!(
                    "slot {}: {} → {}",
                    i,
                    occupant_label(*before),
                    occupant_label(*after)
                ));
            }
        }

        if self.free_modules != other.free_modules {
            changes.push(format!("free: {:?} → {:?}", self.free_modules, other.free_modules));
        }

        if self.highlighted != other.highlighted {
            changes.push(format!(
                "highlight: {:?} → {:?}",
                self.highlighted, other.highlighted
            ));
        }

        if self.scroll != other.scroll {
            changes.push(format!(
                "scroll: ({}, {}) → ({}, {})",
                self.scroll.0, self.scroll.1, other.scroll.0, other.scroll.1
            ));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

fn occupant_label(occupant: Option<u64>) -> String {
    match occupant {
        Some(id) => format!("#{}", id),
        None => "empty".to_string(),
    }
}
