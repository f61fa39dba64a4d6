//! winit-backed module windows
//!
//! Geometry requests are asynchronous on most platforms: the window reports
//! the old size/position until the compositor answers. Requested values are
//! therefore remembered and reported back until the matching `Resized` or
//! `Moved` event arrives.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use dockyard::frame::HostWindow;
use dockyard::geometry::{Point, Rect, Size};

/// Host-side bookkeeping shared between the event loop and the model's window
#[derive(Debug, Default)]
pub struct WindowState {
    realized: Cell<bool>,
    requested_size: Cell<Option<Size>>,
    requested_origin: Cell<Option<Point>>,
}

impl WindowState {
    /// The platform has shown the window and reported its geometry
    pub fn mark_realized(&self) {
        self.realized.set(true);
    }

    pub fn is_realized(&self) -> bool {
        self.realized.get()
    }

    pub fn confirm_resize(&self) {
        self.requested_size.set(None);
    }

    pub fn confirm_move(&self) {
        self.requested_origin.set(None);
    }
}

pub fn to_point(position: PhysicalPosition<i32>, scale: f64) -> Point {
    let logical: LogicalPosition<f32> = position.to_logical(scale);
    Point::new(logical.x, logical.y)
}

pub fn to_size(size: PhysicalSize<u32>, scale: f64) -> Size {
    let logical: LogicalSize<f32> = size.to_logical(scale);
    Size::new(logical.width, logical.height)
}

/// A module's top-level window, in logical screen coordinates
pub struct WinitHostWindow {
    window: Rc<Window>,
    state: Rc<WindowState>,
}

impl WinitHostWindow {
    /// Open a decorated, not-yet-realized module window
    pub fn open(event_loop: &ActiveEventLoop, title: &str, size: Size) -> Result<Self> {
        let attributes = Window::default_attributes()
            .with_title(title)
            .with_decorations(true)
            .with_inner_size(LogicalSize::new(size.width, size.height));
        let window = event_loop
            .create_window(attributes)
            .map_err(|e| anyhow::anyhow!("Failed to create module window: {}", e))?;

        Ok(Self {
            window: Rc::new(window),
            state: Rc::new(WindowState::default()),
        })
    }

    /// Handles the event loop keeps for routing and drawing
    pub fn handles(&self) -> (Rc<Window>, Rc<WindowState>) {
        (Rc::clone(&self.window), Rc::clone(&self.state))
    }

    fn scale(&self) -> f64 {
        self.window.scale_factor()
    }

    /// Offset of the content area inside the frame, and the extra frame size
    fn decoration_extent(&self) -> (Point, Size) {
        let scale = self.scale();
        let offset = match (self.window.outer_position(), self.window.inner_position()) {
            (Ok(outer), Ok(inner)) => to_point(inner, scale).minus(to_point(outer, scale)),
            _ => Point::ORIGIN,
        };
        let outer = to_size(self.window.outer_size(), scale);
        let inner = to_size(self.window.inner_size(), scale);
        let extra = Size::new(
            (outer.width - inner.width).max(0.0),
            (outer.height - inner.height).max(0.0),
        );
        (offset, extra)
    }

    fn frame_origin(&self) -> Point {
        if let Some(origin) = self.state.requested_origin.get() {
            return origin;
        }
        let scale = self.scale();
        self.window
            .outer_position()
            .or_else(|_| self.window.inner_position())
            .map(|p| to_point(p, scale))
            .unwrap_or(Point::ORIGIN)
    }

    fn content_size(&self) -> Size {
        self.state
            .requested_size
            .get()
            .unwrap_or_else(|| to_size(self.window.inner_size(), self.scale()))
    }
}

impl HostWindow for WinitHostWindow {
    fn is_realized(&self) -> bool {
        self.state.is_realized()
    }

    fn frame_rect(&self) -> Option<Rect> {
        if !self.is_realized() {
            return None;
        }
        let (_, extra) = self.decoration_extent();
        let content = self.content_size();
        Some(Rect::from_origin_size(
            self.frame_origin(),
            Size::new(content.width + extra.width, content.height + extra.height),
        ))
    }

    fn content_rect(&self) -> Option<Rect> {
        if !self.is_realized() {
            return None;
        }
        let (offset, _) = self.decoration_extent();
        Some(Rect::from_origin_size(
            self.frame_origin().plus(offset),
            self.content_size(),
        ))
    }

    fn set_content_size(&mut self, size: Size) {
        let applied = self
            .window
            .request_inner_size(LogicalSize::new(size.width, size.height));
        if applied.is_none() {
            self.state.requested_size.set(Some(size));
        }
    }

    fn move_frame_to(&mut self, origin: Point) {
        self.window
            .set_outer_position(LogicalPosition::new(origin.x, origin.y));
        self.state.requested_origin.set(Some(origin));
    }

    fn set_decorated(&mut self, decorated: bool) {
        self.window.set_decorations(decorated);
    }

    fn is_decorated(&self) -> bool {
        self.window.is_decorated()
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }
}
