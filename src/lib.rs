//! Dockyard - dockable floating modules on a scrollable slot board
//!
//! This crate provides the docking model and the Elm-style update logic.
//! The windowing host lives in the binary; everything here is headless and
//! driven by typed messages.

pub mod commands;
pub mod config;
pub mod config_paths;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod messages;
pub mod model;
pub mod perf;
pub mod timer;
pub mod tracing;
pub mod update;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::DockConfig;
pub use error::DockError;
pub use messages::Msg;
pub use model::DockModel;
