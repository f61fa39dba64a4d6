//! Floating module and its attach/detach state machine
//!
//! A `Module` is a window that is either **Free** (floating anywhere) or
//! **Attached** (bound to a slot's rectangle). User gestures arrive as
//! `ModuleInput`; the module updates its own drag sub-state and returns the
//! intents (`ModuleEvent`) the coordinator has to act on. The coordinator in
//! turn drives the module through `attach`, `detach` and `move_to`.
//!
//! ## Drag sub-states
//!
//! - `ContentDragging`: press started in the grip bar (top `grip_height` px of
//!   the content area); the module follows the pointer itself.
//! - `TitlebarDragging`: the window manager is moving the window; the module
//!   only observes, then waits for the position to settle.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::content::ModuleContent;
use crate::error::DockError;
use crate::frame::{FitError, FrameCompensator, HostWindow};
use crate::geometry::{Point, Rect};
use crate::timer::Debouncer;

static NEXT_MODULE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique module identifier; never reused within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(pub u64);

impl ModuleId {
    /// Allocate the next id
    pub fn next() -> Self {
        ModuleId(NEXT_MODULE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind tag selecting a module's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    Example,
    Custom,
    TextEditor,
    Calculator,
    FileBrowser,
    ImageViewer,
    DataVisualizer,
    Settings,
    /// Application-defined kinds; codes start at `USER_DEFINED_BASE`
    UserDefined(u32),
}

impl ModuleKind {
    pub const USER_DEFINED_BASE: u32 = 1000;

    pub const BUILT_IN: [ModuleKind; 8] = [
        ModuleKind::Example,
        ModuleKind::Custom,
        ModuleKind::TextEditor,
        ModuleKind::Calculator,
        ModuleKind::FileBrowser,
        ModuleKind::ImageViewer,
        ModuleKind::DataVisualizer,
        ModuleKind::Settings,
    ];

    /// Stable numeric code
    pub fn code(&self) -> u32 {
        match self {
            ModuleKind::Example => 0,
            ModuleKind::Custom => 1,
            ModuleKind::TextEditor => 2,
            ModuleKind::Calculator => 3,
            ModuleKind::FileBrowser => 4,
            ModuleKind::ImageViewer => 5,
            ModuleKind::DataVisualizer => 6,
            ModuleKind::Settings => 7,
            ModuleKind::UserDefined(code) => *code,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0..=7 => Some(Self::BUILT_IN[code as usize]),
            c if c >= Self::USER_DEFINED_BASE => Some(ModuleKind::UserDefined(c)),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModuleKind::Example => "Example",
            ModuleKind::Custom => "Custom",
            ModuleKind::TextEditor => "Text Editor",
            ModuleKind::Calculator => "Calculator",
            ModuleKind::FileBrowser => "File Browser",
            ModuleKind::ImageViewer => "Image Viewer",
            ModuleKind::DataVisualizer => "Data Visualizer",
            ModuleKind::Settings => "Settings",
            ModuleKind::UserDefined(_) => "User Module",
        }
    }
}

/// Whether a module floats or is bound to a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AttachState {
    #[default]
    Free,
    Attached,
}

/// Interaction sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DragState {
    #[default]
    Idle,
    ContentDragging,
    TitlebarDragging,
}

/// User gestures and window-manager notifications, in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModuleInput {
    PointerPressed { global: Point },
    PointerMoved { global: Point },
    PointerReleased { global: Point },
    DoubleClicked { global: Point },
    /// The window manager started moving the window
    NativeDragStarted,
    /// The window manager moved the window
    WindowMoved { pointer: Option<Point>, at: Instant },
    /// The window manager finished moving the window
    NativeDragEnded { pointer: Option<Point>, at: Instant },
    CloseClicked,
}

/// Drag position for slot highlighting
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPosition {
    At(Point),
    /// Drag is over; clear every highlight
    Ended,
}

impl From<Point> for DragPosition {
    fn from(point: Point) -> Self {
        if point == Point::DRAG_ENDED {
            DragPosition::Ended
        } else {
            DragPosition::At(point)
        }
    }
}

/// Intent raised by a module
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModuleEventKind {
    Created,
    Destroyed,
    DetachRequested,
    ReattachRequested { at: Point, explicit: bool },
    CloseRequested,
    DragPositionChanged(DragPosition),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleEvent {
    pub module: ModuleId,
    pub kind: ModuleEventKind,
}

impl ModuleEvent {
    pub fn new(module: ModuleId, kind: ModuleEventKind) -> Self {
        Self { module, kind }
    }
}

/// Per-module interaction settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleSettings {
    pub grip_height: f32,
    pub settle_delay: Duration,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            grip_height: 30.0,
            settle_delay: Duration::from_millis(300),
        }
    }
}

pub struct Module {
    id: ModuleId,
    kind: ModuleKind,
    title: String,
    attach: AttachState,
    drag: DragState,
    window: Box<dyn HostWindow>,
    compensator: FrameCompensator,
    content: Box<dyn ModuleContent>,
    settle: Debouncer,
    grip_height: f32,
    /// Pointer minus frame origin at press time
    press_offset: Option<Point>,
    /// Slot rectangle waiting for the window to be realized
    pending_attach: Option<Rect>,
    last_pointer: Option<Point>,
    /// Frame origin this module last asked the window for
    applied_origin: Option<Point>,
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("title", &self.title)
            .field("attach", &self.attach)
            .field("drag", &self.drag)
            .field("frame", &self.window.frame_rect())
            .field("pending_attach", &self.pending_attach)
            .finish_non_exhaustive()
    }
}

impl Module {
    pub fn new(
        id: ModuleId,
        kind: ModuleKind,
        title: impl Into<String>,
        window: Box<dyn HostWindow>,
        content: Box<dyn ModuleContent>,
        settings: ModuleSettings,
    ) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            attach: AttachState::Free,
            drag: DragState::Idle,
            window,
            compensator: FrameCompensator::new(),
            content,
            settle: Debouncer::new(settings.settle_delay),
            grip_height: settings.grip_height,
            press_offset: None,
            pending_attach: None,
            last_pointer: None,
            applied_origin: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.window.set_title(&self.title);
    }

    pub fn attach_state(&self) -> AttachState {
        self.attach
    }

    pub fn is_attached(&self) -> bool {
        self.attach == AttachState::Attached
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn frame_rect(&self) -> Option<Rect> {
        self.window.frame_rect()
    }

    pub fn content_rect(&self) -> Option<Rect> {
        self.window.content_rect()
    }

    pub fn window(&self) -> &dyn HostWindow {
        self.window.as_ref()
    }

    pub fn window_mut(&mut self) -> &mut dyn HostWindow {
        self.window.as_mut()
    }

    pub fn content(&self) -> &dyn ModuleContent {
        self.content.as_ref()
    }

    pub fn clear_content(&mut self) {
        self.content.clear();
    }

    pub fn pending_attach(&self) -> Option<Rect> {
        self.pending_attach
    }

    pub fn settle_deadline(&self) -> Option<Instant> {
        self.settle.deadline()
    }

    pub fn applied_origin(&self) -> Option<Point> {
        self.applied_origin
    }

    /// True when `point` lies in the grip bar of the content area
    pub fn in_grip(&self, point: Point) -> bool {
        let Some(content) = self.window.content_rect() else {
            return false;
        };
        let local = point.minus(content.origin());
        local.x >= 0.0 && local.x < content.width && local.y >= 0.0 && local.y < self.grip_height
    }

    // =========================================================================
    // Coordinator commands
    // =========================================================================

    /// Bind to `target`: go frameless, then fit the frame onto the rectangle
    ///
    /// If the window isn't realized yet the target is kept and the module is
    /// still considered attached; the next layout pass finishes the fit.
    pub fn attach(&mut self, target: Rect) -> Result<Rect, DockError> {
        if self.window.is_decorated() {
            self.window.set_decorated(false);
        }
        self.compensator.invalidate();
        self.attach = AttachState::Attached;
        self.drag = DragState::Idle;
        self.press_offset = None;
        self.settle.cancel();
        self.fit_to(target)
    }

    /// Re-fit an attached module onto its slot (after layout changes, or to
    /// finish a pending attach)
    pub fn reposition(&mut self, target: Rect) -> Result<Rect, DockError> {
        debug_assert!(self.is_attached());
        self.fit_to(target)
    }

    /// Become free-floating with regular window decorations
    pub fn detach(&mut self) {
        self.attach = AttachState::Free;
        self.pending_attach = None;
        if !self.window.is_decorated() {
            self.window.set_decorated(true);
        }
        self.compensator.invalidate();
    }

    /// Move the frame's top-left corner to `origin`
    pub fn move_to(&mut self, origin: Point) {
        self.window.move_frame_to(origin);
        self.applied_origin = Some(origin);
    }

    fn fit_to(&mut self, target: Rect) -> Result<Rect, DockError> {
        match self.compensator.fit(self.window.as_mut(), target) {
            Ok(frame) => {
                self.pending_attach = None;
                self.applied_origin = Some(frame.origin());
                Ok(frame)
            }
            Err(FitError::NotRealized) => {
                self.pending_attach = Some(target);
                Err(DockError::GeometryNotReady(self.id))
            }
        }
    }

    // =========================================================================
    // Input state machine
    // =========================================================================

    pub fn handle_input(&mut self, input: ModuleInput) -> Vec<ModuleEvent> {
        let mut events = Vec::new();

        match input {
            ModuleInput::PointerPressed { global } => {
                if !self.in_grip(global) {
                    return events;
                }
                let Some(frame) = self.window.frame_rect() else {
                    return events;
                };
                self.press_offset = Some(global.minus(frame.origin()));
                self.last_pointer = Some(global);
                self.settle.cancel();
                if self.is_attached() {
                    self.detach();
                    events.push(self.event(ModuleEventKind::DetachRequested));
                }
                self.drag = DragState::ContentDragging;
            }

            ModuleInput::PointerMoved { global } => {
                if self.drag != DragState::ContentDragging {
                    return events;
                }
                let offset = self.press_offset.unwrap_or(Point::ORIGIN);
                self.move_to(global.minus(offset));
                self.last_pointer = Some(global);
                events.push(self.event(ModuleEventKind::DragPositionChanged(DragPosition::At(
                    global,
                ))));
            }

            ModuleInput::PointerReleased { global } => {
                if self.drag != DragState::ContentDragging {
                    return events;
                }
                self.drag = DragState::Idle;
                self.press_offset = None;
                self.last_pointer = Some(global);
                events.push(self.event(ModuleEventKind::ReattachRequested {
                    at: global,
                    explicit: false,
                }));
                events.push(self.event(ModuleEventKind::DragPositionChanged(DragPosition::Ended)));
            }

            ModuleInput::DoubleClicked { global } => {
                if !self.in_grip(global) {
                    return events;
                }
                self.drag = DragState::Idle;
                self.press_offset = None;
                self.settle.cancel();
                if self.is_attached() {
                    self.detach();
                    events.push(self.event(ModuleEventKind::DetachRequested));
                } else {
                    events.push(self.event(ModuleEventKind::ReattachRequested {
                        at: global,
                        explicit: true,
                    }));
                }
            }

            ModuleInput::NativeDragStarted => {
                self.settle.cancel();
                self.last_pointer = None;
                if self.is_attached() {
                    self.detach();
                    events.push(self.event(ModuleEventKind::DetachRequested));
                }
                self.drag = DragState::TitlebarDragging;
            }

            ModuleInput::WindowMoved { pointer, at } => {
                if self.is_attached() || self.drag != DragState::TitlebarDragging {
                    return events;
                }
                if pointer.is_some() {
                    self.last_pointer = pointer;
                }
                let position = self.settle_point();
                events.push(self.event(ModuleEventKind::DragPositionChanged(DragPosition::At(
                    position,
                ))));
                self.settle.restart(at);
            }

            ModuleInput::NativeDragEnded { pointer, at } => {
                if self.drag == DragState::TitlebarDragging {
                    self.drag = DragState::Idle;
                }
                if pointer.is_some() {
                    self.last_pointer = pointer;
                }
                events.push(self.event(ModuleEventKind::DragPositionChanged(DragPosition::Ended)));
                if !self.is_attached() {
                    self.settle.restart(at);
                }
            }

            ModuleInput::CloseClicked => {
                events.push(self.event(ModuleEventKind::CloseRequested));
            }
        }

        events
    }

    /// Fire the settle timer if due; emits a reattach-intent once settled
    pub fn settle_due(&mut self, now: Instant) -> Option<ModuleEvent> {
        if !self.settle.fire_if_due(now) {
            return None;
        }
        if self.drag != DragState::Idle || self.is_attached() {
            tracing::trace!("module {}: settle fired during drag, ignored", self.id);
            return None;
        }
        let at = self.settle_point();
        Some(self.event(ModuleEventKind::ReattachRequested {
            at,
            explicit: false,
        }))
    }

    /// Last known pointer, else the top-centre of the frame
    fn settle_point(&self) -> Point {
        if let Some(pointer) = self.last_pointer {
            return pointer;
        }
        match self.window.frame_rect() {
            Some(frame) => Point::new(frame.center().x, frame.y),
            None => Point::ORIGIN,
        }
    }

    fn event(&self, kind: ModuleEventKind) -> ModuleEvent {
        ModuleEvent::new(self.id, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::HeadlessWindow;
    use crate::geometry::Size;
    use crate::model::content::content_for;

    fn module_at(origin: Point) -> Module {
        let window = HeadlessWindow::realized_at(Size::new(300.0, 400.0), origin);
        Module::new(
            ModuleId::next(),
            ModuleKind::Example,
            "Example",
            Box::new(window),
            content_for(ModuleKind::Example),
            ModuleSettings::default(),
        )
    }

    fn kinds(events: &[ModuleEvent]) -> Vec<ModuleEventKind> {
        events.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = ModuleId::next();
        let b = ModuleId::next();
        assert!(b > a);
    }

    #[test]
    fn test_kind_codes_round_trip() {
        for kind in ModuleKind::BUILT_IN {
            assert_eq!(ModuleKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(
            ModuleKind::from_code(1000),
            Some(ModuleKind::UserDefined(1000))
        );
        assert_eq!(ModuleKind::from_code(500), None);
    }

    #[test]
    fn test_sentinel_point_is_drag_ended() {
        assert_eq!(DragPosition::from(Point::new(-1.0, -1.0)), DragPosition::Ended);
        assert_eq!(
            DragPosition::from(Point::new(5.0, 5.0)),
            DragPosition::At(Point::new(5.0, 5.0))
        );
    }

    #[test]
    fn test_attach_fits_frame_and_goes_frameless() {
        let mut m = module_at(Point::ORIGIN);
        let target = Rect::new(10.0, 10.0, 250.0, 380.0);
        let frame = m.attach(target).unwrap();
        assert!(frame.approx_eq(&target, 0.5));
        assert!(m.is_attached());
        assert!(!m.window().is_decorated());
    }

    #[test]
    fn test_attach_unrealized_window_is_pending() {
        let window = HeadlessWindow::new(Size::new(300.0, 400.0));
        let mut m = Module::new(
            ModuleId::next(),
            ModuleKind::Custom,
            "Custom",
            Box::new(window),
            content_for(ModuleKind::Custom),
            ModuleSettings::default(),
        );
        let target = Rect::new(10.0, 10.0, 250.0, 380.0);
        assert!(matches!(
            m.attach(target),
            Err(DockError::GeometryNotReady(_))
        ));
        assert_eq!(m.pending_attach(), Some(target));
        assert!(m.is_attached());
    }

    #[test]
    fn test_grip_press_while_attached_detaches() {
        let mut m = module_at(Point::ORIGIN);
        m.attach(Rect::new(10.0, 10.0, 250.0, 380.0)).unwrap();

        let events = m.handle_input(ModuleInput::PointerPressed {
            global: Point::new(50.0, 20.0),
        });
        assert_eq!(kinds(&events), vec![ModuleEventKind::DetachRequested]);
        assert_eq!(m.attach_state(), AttachState::Free);
        assert_eq!(m.drag_state(), DragState::ContentDragging);
        assert!(m.window().is_decorated());
    }

    #[test]
    fn test_press_outside_grip_is_ignored() {
        let mut m = module_at(Point::ORIGIN);
        m.attach(Rect::new(10.0, 10.0, 250.0, 380.0)).unwrap();
        let events = m.handle_input(ModuleInput::PointerPressed {
            global: Point::new(50.0, 200.0),
        });
        assert!(events.is_empty());
        assert!(m.is_attached());
    }

    #[test]
    fn test_content_drag_follows_pointer_then_requests_reattach() {
        let mut m = module_at(Point::new(100.0, 100.0));
        // Content origin is (101, 128) with default decorations
        m.handle_input(ModuleInput::PointerPressed {
            global: Point::new(150.0, 130.0),
        });

        let events = m.handle_input(ModuleInput::PointerMoved {
            global: Point::new(250.0, 230.0),
        });
        assert_eq!(
            kinds(&events),
            vec![ModuleEventKind::DragPositionChanged(DragPosition::At(
                Point::new(250.0, 230.0)
            ))]
        );
        assert_eq!(m.frame_rect().unwrap().origin(), Point::new(200.0, 200.0));

        let events = m.handle_input(ModuleInput::PointerReleased {
            global: Point::new(250.0, 230.0),
        });
        assert_eq!(
            kinds(&events),
            vec![
                ModuleEventKind::ReattachRequested {
                    at: Point::new(250.0, 230.0),
                    explicit: false
                },
                ModuleEventKind::DragPositionChanged(DragPosition::Ended),
            ]
        );
        assert_eq!(m.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_native_drag_start_while_free_only_marks_state() {
        let mut m = module_at(Point::ORIGIN);
        let events = m.handle_input(ModuleInput::NativeDragStarted);
        assert!(events.is_empty());
        assert_eq!(m.drag_state(), DragState::TitlebarDragging);
    }

    #[test]
    fn test_native_drag_settles_once_after_quiet() {
        let t0 = Instant::now();
        let mut m = module_at(Point::ORIGIN);
        m.handle_input(ModuleInput::NativeDragStarted);
        m.handle_input(ModuleInput::WindowMoved {
            pointer: Some(Point::new(40.0, 10.0)),
            at: t0,
        });
        m.handle_input(ModuleInput::NativeDragEnded {
            pointer: None,
            at: t0 + Duration::from_millis(50),
        });

        assert!(m.settle_due(t0 + Duration::from_millis(200)).is_none());
        let event = m.settle_due(t0 + Duration::from_millis(350)).unwrap();
        assert_eq!(
            event.kind,
            ModuleEventKind::ReattachRequested {
                at: Point::new(40.0, 10.0),
                explicit: false
            }
        );
        assert!(m.settle_due(t0 + Duration::from_millis(1000)).is_none());
    }

    #[test]
    fn test_settle_ignored_while_drag_restarted() {
        let t0 = Instant::now();
        let mut m = module_at(Point::ORIGIN);
        m.handle_input(ModuleInput::NativeDragEnded {
            pointer: None,
            at: t0,
        });
        // Out-of-order start after the end: drag is active again
        m.handle_input(ModuleInput::NativeDragStarted);
        assert!(m.settle_due(t0 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_double_click_toggles() {
        let mut m = module_at(Point::ORIGIN);
        let grip = Point::new(20.0, 35.0);

        let events = m.handle_input(ModuleInput::DoubleClicked { global: grip });
        assert_eq!(
            kinds(&events),
            vec![ModuleEventKind::ReattachRequested {
                at: grip,
                explicit: true
            }]
        );

        m.attach(Rect::new(0.0, 0.0, 200.0, 300.0)).unwrap();
        let events = m.handle_input(ModuleInput::DoubleClicked {
            global: Point::new(20.0, 5.0),
        });
        assert_eq!(kinds(&events), vec![ModuleEventKind::DetachRequested]);
        assert!(!m.is_attached());
    }

    #[test]
    fn test_move_to_records_applied_origin() {
        let mut m = module_at(Point::ORIGIN);
        m.move_to(Point::new(42.0, 24.0));
        assert_eq!(m.applied_origin(), Some(Point::new(42.0, 24.0)));
        assert_eq!(m.frame_rect().unwrap().origin(), Point::new(42.0, 24.0));
    }
}
