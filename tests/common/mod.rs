//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use dockyard::config::DockConfig;
use dockyard::frame::{HeadlessWindow, HostWindow};
use dockyard::geometry::{Point, Rect, Size};
use dockyard::messages::Msg;
use dockyard::model::{DockModel, ModuleId, ModuleInput, ModuleKind};
use dockyard::perf::{CpuTicks, NullProbe, ProbeError, RawSample, SystemProbe};
use dockyard::update::{try_spawn_module, update};
use dockyard::Cmd;

/// Board size used by every test model: three 250px slots fit, a fourth doesn't
pub const BOARD_SIZE: Size = Size {
    width: 800.0,
    height: 600.0,
};

/// Where freshly opened test windows appear, well away from the board
pub const SPAWN_ORIGIN: Point = Point { x: 900.0, y: 100.0 };

pub fn test_config(slots: usize) -> DockConfig {
    DockConfig {
        initial_slots: slots,
        ..DockConfig::default()
    }
}

/// Model with `slots` initial slots on an 800x600 board at the screen origin
pub fn test_model(slots: usize) -> DockModel {
    model_with(test_config(slots), Box::new(NullProbe), Instant::now())
}

pub fn model_with(config: DockConfig, probe: Box<dyn SystemProbe>, now: Instant) -> DockModel {
    DockModel::new(config, Point::ORIGIN, BOARD_SIZE, probe, now)
}

/// Create a module backed by a realized headless window
pub fn spawn(model: &mut DockModel, kind: ModuleKind) -> ModuleId {
    try_spawn_module(model, kind, |_, size| {
        Box::new(HeadlessWindow::realized_at(size, SPAWN_ORIGIN))
    })
    .expect("module creation should be admitted")
}

pub fn send(model: &mut DockModel, id: ModuleId, input: ModuleInput) -> Option<Cmd> {
    update(model, Msg::input(id, input))
}

/// A point inside the module's grip bar
pub fn grip_point(model: &DockModel, id: ModuleId) -> Point {
    let content = model
        .module(id)
        .and_then(|m| m.content_rect())
        .expect("module should have geometry");
    content.origin().offset(10.0, 10.0)
}

/// Press on the grip, drag to `target` and release there
pub fn drag_to(model: &mut DockModel, id: ModuleId, target: Point) {
    let grip = grip_point(model, id);
    send(model, id, ModuleInput::PointerPressed { global: grip });
    send(model, id, ModuleInput::PointerMoved { global: target });
    send(model, id, ModuleInput::PointerReleased { global: target });
}

pub fn slot_rect(model: &DockModel, index: usize) -> Rect {
    model.slots.get(index).expect("slot exists").global()
}

pub fn slot_of(model: &DockModel, id: ModuleId) -> Option<usize> {
    model.slots.slot_of(id)
}

pub fn assert_frame_on(model: &DockModel, id: ModuleId, target: Rect) {
    let frame = model
        .module(id)
        .and_then(|m| m.frame_rect())
        .expect("module should have geometry");
    assert!(
        frame.approx_eq(&target, 0.5),
        "frame {:?} should match {:?}",
        frame,
        target
    );
}

// ============================================================================
// Probes
// ============================================================================

pub type ProbeScript = Rc<RefCell<VecDeque<RawSample>>>;

/// Probe that replays queued samples, repeating the last one when exhausted
pub struct ScriptedProbe {
    script: ProbeScript,
    last: RawSample,
}

impl ScriptedProbe {
    pub fn new(samples: Vec<RawSample>) -> (Self, ProbeScript) {
        let script: ProbeScript = Rc::new(RefCell::new(samples.into()));
        let probe = Self {
            script: Rc::clone(&script),
            last: RawSample::default(),
        };
        (probe, script)
    }
}

impl SystemProbe for ScriptedProbe {
    fn sample(&mut self) -> Result<RawSample, ProbeError> {
        if let Some(next) = self.script.borrow_mut().pop_front() {
            self.last = next;
        }
        Ok(self.last)
    }
}

/// A sample with the given cumulative CPU ticks and comfortable memory
pub fn cpu_sample(idle: u64, total: u64) -> RawSample {
    RawSample {
        cpu: Some(CpuTicks { idle, total }),
        mem_total_mb: 16_000,
        mem_used_mb: 4_000,
        process_mem_mb: 100,
    }
}

// ============================================================================
// Windows
// ============================================================================

/// Headless window the test can still reach after handing it to a module
#[derive(Clone)]
pub struct SharedWindow(pub Rc<RefCell<HeadlessWindow>>);

impl SharedWindow {
    pub fn new(window: HeadlessWindow) -> Self {
        Self(Rc::new(RefCell::new(window)))
    }
}

impl HostWindow for SharedWindow {
    fn is_realized(&self) -> bool {
        self.0.borrow().is_realized()
    }

    fn frame_rect(&self) -> Option<Rect> {
        self.0.borrow().frame_rect()
    }

    fn content_rect(&self) -> Option<Rect> {
        self.0.borrow().content_rect()
    }

    fn set_content_size(&mut self, size: Size) {
        self.0.borrow_mut().set_content_size(size);
    }

    fn move_frame_to(&mut self, origin: Point) {
        self.0.borrow_mut().move_frame_to(origin);
    }

    fn set_decorated(&mut self, decorated: bool) {
        self.0.borrow_mut().set_decorated(decorated);
    }

    fn is_decorated(&self) -> bool {
        self.0.borrow().is_decorated()
    }

    fn set_title(&mut self, title: &str) {
        self.0.borrow_mut().set_title(title);
    }
}
