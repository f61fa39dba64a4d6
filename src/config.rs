//! Docking configuration persistence
//!
//! Stores user preferences in `~/.config/dockyard/config.yaml`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::Size;
use crate::model::module::ModuleSettings;
use crate::model::slot::SlotLayout;

/// Docking and admission settings
///
/// Every field has a default, so a partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    /// Deny module creation above this CPU usage (percent)
    pub cpu_threshold: f64,
    /// Deny module creation above this system memory usage (percent)
    pub memory_threshold: f64,
    /// Deny module creation above this resident size of our own process (MB)
    pub process_memory_threshold_mb: u64,
    /// Warn at this fraction of each threshold
    pub warning_ratio: f64,
    pub sample_interval_ms: u64,

    pub minimum_free_slots: usize,
    pub initial_slots: usize,
    pub slot_min_width: f32,
    pub slot_min_height: f32,
    pub slot_spacing: f32,
    pub board_margin: f32,
    /// Fraction of a slot's width that must be on screen for it to count as visible
    pub visibility_ratio: f32,
    /// Extra pixels around a slot that still count as a hit when dropping
    pub hit_tolerance: f32,

    /// Height of the drag grip at the top of a module's content (pixels)
    pub grip_height: f32,
    /// Quiet time after a window-manager drag before reattachment is evaluated
    pub settle_debounce_ms: u64,
    /// Ask before closing a module
    pub confirm_close: bool,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            cpu_threshold: 80.0,
            memory_threshold: 85.0,
            process_memory_threshold_mb: 1024,
            warning_ratio: 0.9,
            sample_interval_ms: 2000,
            minimum_free_slots: 1,
            initial_slots: 3,
            slot_min_width: 250.0,
            slot_min_height: 400.0,
            slot_spacing: 10.0,
            board_margin: 10.0,
            visibility_ratio: 0.3,
            hit_tolerance: 20.0,
            grip_height: 30.0,
            settle_debounce_ms: 300,
            confirm_close: true,
        }
    }
}

impl DockConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from a specific file, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str::<DockConfig>(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config.validated()
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp values that would break the layout or admission maths
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if !(self.cpu_threshold > 0.0) {
            tracing::warn!("cpu_threshold must be positive, using {}", defaults.cpu_threshold);
            self.cpu_threshold = defaults.cpu_threshold;
        }
        if !(self.memory_threshold > 0.0) {
            tracing::warn!(
                "memory_threshold must be positive, using {}",
                defaults.memory_threshold
            );
            self.memory_threshold = defaults.memory_threshold;
        }
        if self.process_memory_threshold_mb == 0 {
            self.process_memory_threshold_mb = defaults.process_memory_threshold_mb;
        }
        if !(self.warning_ratio > 0.0 && self.warning_ratio <= 1.0) {
            self.warning_ratio = defaults.warning_ratio;
        }
        if !(self.visibility_ratio > 0.0 && self.visibility_ratio <= 1.0) {
            self.visibility_ratio = defaults.visibility_ratio;
        }
        if self.sample_interval_ms == 0 {
            self.sample_interval_ms = defaults.sample_interval_ms;
        }

        self.slot_min_width = self.slot_min_width.max(1.0);
        self.slot_min_height = self.slot_min_height.max(1.0);
        self.slot_spacing = self.slot_spacing.max(0.0);
        self.board_margin = self.board_margin.max(0.0);
        self.hit_tolerance = self.hit_tolerance.max(0.0);
        self.grip_height = self.grip_height.max(1.0);
        self
    }

    pub fn slot_layout(&self) -> SlotLayout {
        SlotLayout {
            min_size: Size::new(self.slot_min_width, self.slot_min_height),
            spacing: self.slot_spacing,
            margin: self.board_margin,
            visibility_ratio: self.visibility_ratio,
            hit_tolerance: self.hit_tolerance,
        }
    }

    pub fn module_settings(&self) -> ModuleSettings {
        ModuleSettings {
            grip_height: self.grip_height,
            settle_delay: Duration::from_millis(self.settle_debounce_ms),
        }
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}
