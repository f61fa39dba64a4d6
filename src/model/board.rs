//! Board viewport: where the slot strip is shown and how far it is scrolled

use serde::Serialize;

use crate::geometry::{Point, Rect, Size};

/// Scrollable canvas hosting the slot strip
///
/// `origin` is the screen position of the board's content area. Slot
/// geometry is stored board-local and mapped through `to_global`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Board {
    origin: Point,
    size: Size,
    scroll: Point,
}

impl Board {
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            origin,
            size,
            scroll: Point::ORIGIN,
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn scroll(&self) -> Point {
        self.scroll
    }

    /// Visible board area in screen coordinates
    pub fn viewport_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    /// Map a board-local rectangle to screen coordinates
    pub fn to_global(&self, local: Rect) -> Rect {
        local.translated(self.origin.x - self.scroll.x, self.origin.y - self.scroll.y)
    }

    /// Map a screen point to board-local coordinates
    pub fn to_local(&self, global: Point) -> Point {
        global.minus(self.origin).plus(self.scroll)
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Resize the viewport, re-clamping the scroll offset
    pub fn set_size(&mut self, size: Size, content: Size) {
        self.size = size;
        self.set_scroll(self.scroll, content);
    }

    pub fn scroll_by(&mut self, dx: f32, dy: f32, content: Size) {
        self.set_scroll(self.scroll.offset(dx, dy), content);
    }

    /// Set the scroll offset, clamped so the content never scrolls past its end
    pub fn set_scroll(&mut self, scroll: Point, content: Size) {
        let max_x = (content.width - self.size.width).max(0.0);
        let max_y = (content.height - self.size.height).max(0.0);
        self.scroll = Point::new(scroll.x.clamp(0.0, max_x), scroll.y.clamp(0.0, max_y));
    }
}
