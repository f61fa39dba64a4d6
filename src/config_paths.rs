//! Centralized configuration paths for dockyard
//!
//! All config files live under:
//! - Unix/macOS: `~/.config/dockyard/`
//! - Windows: `%APPDATA%\dockyard\`

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "dockyard";

/// Prefix of the daily-rotated log files
pub const LOG_FILE_PREFIX: &str = "dockyard.log";

/// Base config directory
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/dockyard`
///   - Else: `~/.config/dockyard`
///
/// Windows:
///   - `%APPDATA%\dockyard`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/dockyard/config.yaml`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// `~/.config/dockyard/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// `~/.config/dockyard/dumps/` (layout snapshots written on demand)
pub fn dumps_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("dumps"))
}

fn ensure_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))
}

/// Ensure the base config dir exists, returning it
pub fn ensure_config_dir() -> Result<PathBuf, String> {
    let dir = config_dir().ok_or_else(|| "No config directory available".to_string())?;
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Ensure logs dir exists, returning it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = ensure_config_dir()?.join("logs");
    ensure_dir(&logs)?;
    Ok(logs)
}

/// Ensure dumps dir exists, returning it
pub fn ensure_dumps_dir() -> Result<PathBuf, String> {
    let dumps = ensure_config_dir()?.join("dumps");
    ensure_dir(&dumps)?;
    Ok(dumps)
}
