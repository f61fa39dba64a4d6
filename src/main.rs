//! Dockyard - dockable floating modules on a scrollable slot board

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use winit::event_loop::EventLoop;

use dockyard::geometry::{Point, Size};
use dockyard::model::DockModel;
use dockyard::perf::probe::default_probe;

mod cli;
#[cfg(debug_assertions)]
mod debug_dump;
mod runtime;

use cli::CliArgs;
use runtime::App;

/// Board window size before the platform reports the real one
const INITIAL_BOARD_SIZE: Size = Size {
    width: 1100.0,
    height: 600.0,
};

fn main() -> Result<()> {
    dockyard::tracing::init();

    let args = CliArgs::parse();
    let config = args.apply(args.load_config());
    tracing::info!(
        "Starting with {} slots (min free {})",
        config.initial_slots,
        config.minimum_free_slots
    );

    let model = DockModel::new(
        config,
        Point::ORIGIN,
        INITIAL_BOARD_SIZE,
        default_probe(),
        Instant::now(),
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(model);
    event_loop.run_app(&mut app)?;

    Ok(())
}
