//! Runtime module - winit/platform integration
//!
//! - `app` - ApplicationHandler, window bookkeeping and input mapping
//! - `window` - `HostWindow` over real winit windows
//! - `render` - softbuffer drawing for the board and module windows

pub mod app;
pub mod render;
pub mod window;

pub use app::App;
