//! Application state and event handling

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::Result;
use softbuffer::Context;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use dockyard::commands::{Cmd, NoticeLevel};
use dockyard::frame::{HeadlessWindow, HostWindow};
use dockyard::geometry::{Point, Size};
use dockyard::messages::{AppMsg, BoardMsg, DockMsg, ModuleMsg, Msg};
use dockyard::model::{
    DockModel, DragState, ModuleEvent, ModuleEventKind, ModuleId, ModuleInput, ModuleKind,
    ResizeEdge,
};
use dockyard::update::{try_spawn_module, update};

use super::render::{close_box, draw_board, draw_module, WindowSurface};
use super::window::{to_point, to_size, WindowState, WinitHostWindow};

/// Two presses closer than this (in time and distance) form a double-click
const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(400);
const DOUBLE_CLICK_DISTANCE: f32 = 4.0;

/// A native titlebar drag is over once the window stops moving for this long
const NATIVE_DRAG_QUIET: Duration = Duration::from_millis(120);

/// Logical pixels scrolled per arrow key or wheel line
const SCROLL_STEP: f32 = 40.0;

struct BoardWindow {
    window: Rc<Window>,
    surface: WindowSurface,
}

/// A slot edge being dragged on the board
struct SlotResize {
    index: usize,
    edge: ResizeEdge,
    start_pointer: Point,
    start_size: Size,
}

struct ModuleWindow {
    module: ModuleId,
    window: Rc<Window>,
    state: Rc<WindowState>,
    surface: Option<WindowSurface>,
    /// Cursor position inside the content area (logical)
    cursor: Option<Point>,
    /// Last window move not caused by the model, while a native drag lasts
    native_drag_moved: Option<Instant>,
}

pub struct App {
    model: DockModel,
    board: Option<BoardWindow>,
    modules: HashMap<WindowId, ModuleWindow>,
    context: Option<Context<Rc<Window>>>,
    msg_tx: Sender<Msg>,
    msg_rx: Receiver<Msg>,
    last_click: Option<(WindowId, Instant, Point)>,
    /// Cursor position inside the board window (logical)
    board_cursor: Option<Point>,
    slot_resize: Option<SlotResize>,
}

impl App {
    pub fn new(model: DockModel) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        Self {
            model,
            board: None,
            modules: HashMap::new(),
            context: None,
            msg_tx,
            msg_rx,
            last_click: None,
            board_cursor: None,
            slot_resize: None,
        }
    }

    fn init_board(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let size = self.model.board.size();
        let attributes = Window::default_attributes()
            .with_title("Dockyard")
            .with_inner_size(LogicalSize::new(size.width, size.height));
        let window = Rc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| anyhow::anyhow!("Failed to create board window: {}", e))?,
        );
        let context = Context::new(Rc::clone(&window))
            .map_err(|e| anyhow::anyhow!("Failed to create graphics context: {}", e))?;
        let surface = WindowSurface::new(&context, Rc::clone(&window))?;

        self.board = Some(BoardWindow { window, surface });
        self.context = Some(context);
        self.sync_board_geometry();
        Ok(())
    }

    /// Push the board window's current content origin and size into the model
    fn sync_board_geometry(&mut self) {
        let Some(board) = &self.board else {
            return;
        };
        let scale = board.window.scale_factor();
        let size = to_size(board.window.inner_size(), scale);
        let origin = board.window.inner_position().map(|p| to_point(p, scale));

        self.dispatch(Msg::Board(BoardMsg::Resized(size)));
        if let Ok(origin) = origin {
            self.dispatch(Msg::Board(BoardMsg::Moved(origin)));
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn dispatch(&mut self, msg: Msg) -> bool {
        let cmd = update(&mut self.model, msg);
        self.finish(cmd)
    }

    /// Apply host side effects of an update; true if anything needs redrawing
    fn finish(&mut self, cmd: Option<Cmd>) -> bool {
        self.reconcile_windows();
        match cmd {
            Some(cmd) => {
                let redraw = cmd.needs_redraw();
                self.process_cmd(cmd);
                redraw
            }
            None => false,
        }
    }

    fn process_cmd(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::None | Cmd::Redraw => {}

            Cmd::ConfirmClose { module, title } => {
                let tx = self.msg_tx.clone();
                std::thread::spawn(move || {
                    let answer = rfd::MessageDialog::new()
                        .set_level(rfd::MessageLevel::Warning)
                        .set_title("Close module")
                        .set_description(format!("Close \"{}\"?", title))
                        .set_buttons(rfd::MessageButtons::YesNo)
                        .show();
                    let msg = match answer {
                        rfd::MessageDialogResult::Yes => DockMsg::CloseConfirmed(module),
                        _ => DockMsg::CloseCancelled(module),
                    };
                    let _ = tx.send(Msg::Dock(msg));
                });
            }

            Cmd::ShowNotice {
                level,
                title,
                message,
            } => {
                std::thread::spawn(move || {
                    let level = match level {
                        NoticeLevel::Info => rfd::MessageLevel::Info,
                        NoticeLevel::Warning => rfd::MessageLevel::Warning,
                    };
                    rfd::MessageDialog::new()
                        .set_level(level)
                        .set_title(title)
                        .set_description(message)
                        .set_buttons(rfd::MessageButtons::Ok)
                        .show();
                });
            }

            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.process_cmd(cmd);
                }
            }

            Cmd::Quit => {
                self.modules.clear();
                self.board = None;
            }
        }
    }

    /// Drop host windows whose module no longer exists
    fn reconcile_windows(&mut self) {
        let model = &self.model;
        self.modules.retain(|_, w| model.module(w.module).is_some());
    }

    fn process_async_messages(&mut self) -> bool {
        let mut needs_redraw = false;
        while let Ok(msg) = self.msg_rx.try_recv() {
            needs_redraw |= self.dispatch(msg);
        }
        needs_redraw
    }

    fn request_redraw_all(&self) {
        if let Some(board) = &self.board {
            board.window.request_redraw();
        }
        for module in self.modules.values() {
            module.window.request_redraw();
        }
    }

    // =========================================================================
    // Module lifecycle
    // =========================================================================

    fn spawn(&mut self, event_loop: &ActiveEventLoop, kind: ModuleKind) -> bool {
        let mut opened = None;
        let result = try_spawn_module(&mut self.model, kind, |title, size| {
            match WinitHostWindow::open(event_loop, title, size) {
                Ok(host) => {
                    opened = Some(host.handles());
                    Box::new(host) as Box<dyn HostWindow>
                }
                Err(e) => {
                    tracing::error!("{:#}", e);
                    Box::new(HeadlessWindow::new(size))
                }
            }
        });

        let cmd = match (result, opened) {
            (Ok(id), Some((window, state))) => {
                self.modules.insert(
                    window.id(),
                    ModuleWindow {
                        module: id,
                        window,
                        state,
                        surface: None,
                        cursor: None,
                        native_drag_moved: None,
                    },
                );
                Some(Cmd::Redraw)
            }
            (Ok(id), None) => {
                let destroyed = ModuleEvent::new(id, ModuleEventKind::Destroyed);
                update(&mut self.model, Msg::Module(ModuleMsg::Event(destroyed)));
                Some(Cmd::notice(
                    NoticeLevel::Warning,
                    "Cannot create module",
                    "The window system refused to open a new window.",
                ))
            }
            (Err(e), _) => Some(Cmd::notice(
                NoticeLevel::Warning,
                "Cannot create module",
                e.to_string(),
            )),
        };
        self.finish(cmd)
    }

    // =========================================================================
    // Event handling
    // =========================================================================

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: &Key) -> bool {
        match key {
            Key::Character(c) => {
                let kind = c
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| ModuleKind::BUILT_IN.get(i).copied());
                match kind {
                    Some(kind) => self.spawn(event_loop, kind),
                    None => false,
                }
            }
            Key::Named(NamedKey::ArrowLeft) => self.scroll(-SCROLL_STEP, 0.0),
            Key::Named(NamedKey::ArrowRight) => self.scroll(SCROLL_STEP, 0.0),
            Key::Named(NamedKey::ArrowUp) => self.scroll(0.0, -SCROLL_STEP),
            Key::Named(NamedKey::ArrowDown) => self.scroll(0.0, SCROLL_STEP),
            Key::Named(NamedKey::Escape) => self.dispatch(Msg::App(AppMsg::Quit)),
            #[cfg(debug_assertions)]
            Key::Named(NamedKey::F7) => {
                let dump = crate::debug_dump::LayoutDump::from_model(&self.model);
                match dump.save_to_file() {
                    Ok(path) => tracing::info!("Layout dumped to {}", path),
                    Err(e) => tracing::warn!("Layout dump failed: {:#}", e),
                }
                false
            }
            _ => false,
        }
    }

    fn scroll(&mut self, dx: f32, dy: f32) -> bool {
        self.dispatch(Msg::Board(BoardMsg::ScrollBy { dx, dy }))
    }

    fn handle_board_event(&mut self, event_loop: &ActiveEventLoop, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::Resized(_) | WindowEvent::Moved(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.sync_board_geometry();
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (-x * SCROLL_STEP, -y * SCROLL_STEP),
                    MouseScrollDelta::PixelDelta(pos) => {
                        let scale = self.board.as_ref().map_or(1.0, |b| b.window.scale_factor());
                        ((-pos.x / scale) as f32, (-pos.y / scale) as f32)
                    }
                };
                // A vertical wheel pans the horizontal strip
                if dx == 0.0 {
                    self.scroll(dy, 0.0)
                } else {
                    self.scroll(dx, dy)
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let scale = self.board.as_ref().map_or(1.0, |b| b.window.scale_factor()) as f32;
                let local = Point::new(position.x as f32 / scale, position.y as f32 / scale);
                self.board_cursor = Some(local);
                self.drag_slot_edge(local)
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                match state {
                    ElementState::Pressed => self.begin_slot_resize(),
                    ElementState::Released => self.slot_resize = None,
                }
                false
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                self.handle_key(event_loop, &event.logical_key)
            }
            _ => false,
        }
    }

    /// Grab the right or bottom edge of the slot under the cursor
    fn begin_slot_resize(&mut self) {
        let Some(local) = self.board_cursor else {
            return;
        };
        let global = self.model.board.origin().plus(local);
        let slots = &self.model.slots;
        let grabbed = (0..slots.len()).find_map(|index| {
            let edge = slots.resize_edge_at(index, global, &self.model.board)?;
            let resizable = matches!(
                edge,
                ResizeEdge::Right | ResizeEdge::Bottom | ResizeEdge::BottomRight
            );
            if !resizable {
                return None;
            }
            Some((index, edge, slots.get(index)?.global().size()))
        });

        if let Some((index, edge, start_size)) = grabbed {
            tracing::debug!("resizing slot {} from {:?} edge", index, edge);
            self.slot_resize = Some(SlotResize {
                index,
                edge,
                start_pointer: local,
                start_size,
            });
        }
    }

    fn drag_slot_edge(&mut self, local: Point) -> bool {
        let Some(resize) = &self.slot_resize else {
            return false;
        };
        let delta = local.minus(resize.start_pointer);
        let mut size = resize.start_size;
        if matches!(resize.edge, ResizeEdge::Right | ResizeEdge::BottomRight) {
            size.width += delta.x;
        }
        if matches!(resize.edge, ResizeEdge::Bottom | ResizeEdge::BottomRight) {
            size.height += delta.y;
        }
        let index = resize.index;
        self.dispatch(Msg::Dock(DockMsg::ResizeSlot { index, size }))
    }

    fn handle_module_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: &WindowEvent,
    ) -> bool {
        let Some(host) = self.modules.get(&window_id) else {
            return false;
        };
        let id = host.module;

        match event {
            WindowEvent::CloseRequested => self.dispatch(Msg::input(id, ModuleInput::CloseClicked)),

            WindowEvent::Resized(_) => {
                host.state.mark_realized();
                host.state.confirm_resize();
                self.dispatch(Msg::Board(BoardMsg::LayoutPass));
                true
            }

            WindowEvent::Moved(position) => {
                let origin = to_point(*position, host.window.scale_factor());
                host.state.mark_realized();
                host.state.confirm_move();
                let expected = self
                    .model
                    .module(id)
                    .and_then(|m| m.applied_origin())
                    .is_some_and(|o| o.distance_to(origin) < 1.0);
                let content_drag = self
                    .model
                    .module(id)
                    .is_some_and(|m| m.drag_state() == DragState::ContentDragging);
                if expected || content_drag {
                    return false;
                }
                self.native_drag_step(window_id, id)
            }

            WindowEvent::CursorMoved { position, .. } => {
                let local = Point::new(position.x as f32, position.y as f32);
                let scale = host.window.scale_factor() as f32;
                let local = Point::new(local.x / scale, local.y / scale);
                if let Some(host) = self.modules.get_mut(&window_id) {
                    host.cursor = Some(local);
                }
                let dragging = self
                    .model
                    .module(id)
                    .is_some_and(|m| m.drag_state() == DragState::ContentDragging);
                match (dragging, self.global_pointer(id, local)) {
                    (true, Some(global)) => {
                        self.dispatch(Msg::input(id, ModuleInput::PointerMoved { global }))
                    }
                    _ => false,
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let Some(local) = host.cursor else {
                    return false;
                };
                let Some(global) = self.global_pointer(id, local) else {
                    return false;
                };
                match state {
                    ElementState::Pressed => self.handle_press(window_id, id, local, global),
                    ElementState::Released => {
                        self.dispatch(Msg::input(id, ModuleInput::PointerReleased { global }))
                    }
                }
            }

            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                self.handle_key(event_loop, &event.logical_key)
            }

            _ => false,
        }
    }

    fn handle_press(&mut self, window_id: WindowId, id: ModuleId, local: Point, global: Point) -> bool {
        let grip_height = self.model.factory.settings().grip_height;
        let width = self
            .model
            .module(id)
            .and_then(|m| m.content_rect())
            .map_or(0.0, |r| r.width);
        if close_box(width, grip_height).contains(local) {
            self.last_click = None;
            return self.dispatch(Msg::input(id, ModuleInput::CloseClicked));
        }

        let now = Instant::now();
        let double = matches!(
            self.last_click,
            Some((w, t, p)) if w == window_id
                && now.duration_since(t) < DOUBLE_CLICK_INTERVAL
                && p.distance_to(global) < DOUBLE_CLICK_DISTANCE
        );
        if double {
            self.last_click = None;
            self.dispatch(Msg::input(id, ModuleInput::DoubleClicked { global }))
        } else {
            self.last_click = Some((window_id, now, global));
            self.dispatch(Msg::input(id, ModuleInput::PointerPressed { global }))
        }
    }

    /// Translate a content-local cursor position to screen coordinates
    fn global_pointer(&self, id: ModuleId, local: Point) -> Option<Point> {
        let content = self.model.module(id)?.content_rect()?;
        Some(content.origin().plus(local))
    }

    /// An externally caused window move: start or continue a native drag
    fn native_drag_step(&mut self, window_id: WindowId, id: ModuleId) -> bool {
        let now = Instant::now();
        let Some(host) = self.modules.get_mut(&window_id) else {
            return false;
        };
        let started = host.native_drag_moved.replace(now).is_none();

        let mut redraw = false;
        if started {
            redraw |= self.dispatch(Msg::input(id, ModuleInput::NativeDragStarted));
        }
        redraw |= self.dispatch(Msg::input(
            id,
            ModuleInput::WindowMoved {
                pointer: None,
                at: now,
            },
        ));
        redraw
    }

    /// Close native drags whose window has been still for a while
    fn end_quiet_native_drags(&mut self, now: Instant) -> bool {
        let ended: Vec<(ModuleId, Instant)> = self
            .modules
            .values_mut()
            .filter_map(|host| {
                let moved = host.native_drag_moved?;
                if now.duration_since(moved) < NATIVE_DRAG_QUIET {
                    return None;
                }
                host.native_drag_moved = None;
                Some((host.module, moved))
            })
            .collect();

        let mut redraw = false;
        for (id, moved) in ended {
            redraw |= self.dispatch(Msg::input(
                id,
                ModuleInput::NativeDragEnded {
                    pointer: None,
                    at: moved,
                },
            ));
        }
        redraw
    }

    fn next_wakeup(&self) -> Instant {
        self.modules
            .values()
            .filter_map(|host| host.native_drag_moved.map(|t| t + NATIVE_DRAG_QUIET))
            .fold(self.model.next_deadline(), |earliest, t| earliest.min(t))
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn render(&mut self, window_id: WindowId) -> Result<()> {
        if let Some(board) = &mut self.board {
            if board.window.id() == window_id {
                let model = &self.model;
                return board.surface.draw(|canvas| draw_board(canvas, model));
            }
        }

        let Some(host) = self.modules.get_mut(&window_id) else {
            return Ok(());
        };
        let Some(module) = self.model.module(host.module) else {
            return Ok(());
        };
        if host.surface.is_none() {
            let Some(context) = &self.context else {
                return Ok(());
            };
            host.surface = Some(WindowSurface::new(context, Rc::clone(&host.window))?);
        }
        let grip_height = self.model.factory.settings().grip_height;
        match &mut host.surface {
            Some(surface) => surface.draw(|canvas| draw_module(canvas, module, grip_height)),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.board.is_some() {
            return;
        }
        if let Err(e) = self.init_board(event_loop) {
            tracing::error!("{:#}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let is_board = self
            .board
            .as_ref()
            .is_some_and(|b| b.window.id() == window_id);

        let should_redraw = match &event {
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render(window_id) {
                    tracing::warn!("Render failed: {:#}", e);
                }
                false
            }
            WindowEvent::CloseRequested if is_board => self.dispatch(Msg::App(AppMsg::Quit)),
            _ if is_board => self.handle_board_event(event_loop, &event),
            _ => self.handle_module_event(event_loop, window_id, &event),
        };

        if self.board.is_none() {
            event_loop.exit();
        } else if should_redraw {
            self.request_redraw_all();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let mut redraw = self.process_async_messages();
        redraw |= self.end_quiet_native_drags(now);
        redraw |= self.dispatch(Msg::tick(now));

        if self.board.is_none() {
            event_loop.exit();
            return;
        }
        if redraw {
            self.request_redraw_all();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_wakeup()));
    }
}
