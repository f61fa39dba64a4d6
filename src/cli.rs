//! Command-line argument parsing
//!
//! Flags override values from the config file for this run only.

use clap::Parser;
use std::path::PathBuf;

use dockyard::config::DockConfig;

/// Dockable floating modules on a scrollable slot board
#[derive(Parser, Debug, Default)]
#[command(name = "dockyard", version, about = "Dockable floating modules")]
pub struct CliArgs {
    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of slots to create at startup
    #[arg(long, value_name = "N")]
    pub slots: Option<usize>,

    /// Keep at least N slots empty
    #[arg(long = "min-free", value_name = "N")]
    pub min_free: Option<usize>,

    /// Refuse new modules above this CPU usage (percent)
    #[arg(long, value_name = "PERCENT")]
    pub cpu_threshold: Option<f64>,

    /// Refuse new modules above this system memory usage (percent)
    #[arg(long, value_name = "PERCENT")]
    pub memory_threshold: Option<f64>,

    /// Refuse new modules above this process memory (MB)
    #[arg(long, value_name = "MB")]
    pub process_memory_threshold: Option<u64>,

    /// Close modules without asking
    #[arg(long)]
    pub no_confirm_close: bool,
}

impl CliArgs {
    /// Load the config this run should use (explicit path or default location)
    pub fn load_config(&self) -> DockConfig {
        match &self.config {
            Some(path) => DockConfig::load_from(path),
            None => DockConfig::load(),
        }
    }

    /// Overlay command-line flags onto `config`
    pub fn apply(&self, mut config: DockConfig) -> DockConfig {
        if let Some(slots) = self.slots {
            config.initial_slots = slots;
        }
        if let Some(min_free) = self.min_free {
            config.minimum_free_slots = min_free;
        }
        if let Some(cpu) = self.cpu_threshold {
            config.cpu_threshold = cpu;
        }
        if let Some(memory) = self.memory_threshold {
            config.memory_threshold = memory;
        }
        if let Some(mb) = self.process_memory_threshold {
            config.process_memory_threshold_mb = mb;
        }
        if self.no_confirm_close {
            config.confirm_close = false;
        }
        config.validated()
    }
}
