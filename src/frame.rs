//! Window decoration compensation
//!
//! A docked module must show its content exactly over a slot, but the host
//! adds a platform/theme dependent frame around every window. The
//! compensator measures that frame from the live window and sizes the
//! content so the *frame* lands on the target rectangle.
//!
//! ## Pieces
//!
//! - `HostWindow`: what the compensator needs from a real window
//! - `FrameCompensator`: lazily measured margins plus the fit algorithm
//! - `HeadlessWindow`: simulated window used by tests and headless hosts

use crate::geometry::{Margins, Point, Rect, Size};

/// Minimum content edge length the compensator will request
const MIN_CONTENT_EDGE: f32 = 1.0;

/// Operations the compensator and module need from a host window
///
/// Rectangles are in screen coordinates. `frame_rect` includes decorations,
/// `content_rect` is the drawable area. Both return `None` until the window
/// has been realized by the platform.
pub trait HostWindow {
    fn is_realized(&self) -> bool;
    fn frame_rect(&self) -> Option<Rect>;
    fn content_rect(&self) -> Option<Rect>;
    fn set_content_size(&mut self, size: Size);
    fn move_frame_to(&mut self, origin: Point);
    fn set_decorated(&mut self, decorated: bool);
    fn is_decorated(&self) -> bool;
    fn set_title(&mut self, title: &str);
}

/// Why a fit could not be performed right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitError {
    /// The window has no geometry yet; retry after the next layout pass
    NotRealized,
}

/// Measures frame-to-content margins and fits windows onto target rectangles
#[derive(Debug, Clone, Default)]
pub struct FrameCompensator {
    margins: Option<Margins>,
}

impl FrameCompensator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached margins, if they have been measured since the last invalidation
    pub fn margins(&self) -> Option<Margins> {
        self.margins
    }

    /// Forget cached margins (decoration mode or theme may have changed)
    pub fn invalidate(&mut self) {
        self.margins = None;
    }

    /// Measure margins from the live window, caching the result
    pub fn measure(&mut self, window: &dyn HostWindow) -> Result<Margins, FitError> {
        if let Some(margins) = self.margins {
            return Ok(margins);
        }
        if !window.is_realized() {
            return Err(FitError::NotRealized);
        }
        let (Some(frame), Some(content)) = (window.frame_rect(), window.content_rect()) else {
            return Err(FitError::NotRealized);
        };
        let margins = Margins::between(&frame, &content);
        tracing::trace!(
            "frame margins measured: top={} bottom={} left={} right={}",
            margins.top,
            margins.bottom,
            margins.left,
            margins.right
        );
        self.margins = Some(margins);
        Ok(margins)
    }

    /// Size and move `window` so that its frame rectangle equals `target`
    ///
    /// Returns the frame rectangle read back from the window afterwards.
    pub fn fit(&mut self, window: &mut dyn HostWindow, target: Rect) -> Result<Rect, FitError> {
        let margins = self.measure(window)?;

        let content = Size::new(
            (target.width - margins.horizontal()).max(MIN_CONTENT_EDGE),
            (target.height - margins.vertical()).max(MIN_CONTENT_EDGE),
        );
        window.set_content_size(content);
        window.move_frame_to(target.origin());

        window.frame_rect().ok_or(FitError::NotRealized)
    }
}

/// Decoration thickness a `HeadlessWindow` simulates when framed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decorations {
    pub title_bar: f32,
    pub border: f32,
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            title_bar: 28.0,
            border: 1.0,
        }
    }
}

/// An in-memory window with simulated decorations
///
/// Starts unrealized; call `realize()` to give it geometry, mirroring the
/// show-then-measure order real platforms impose.
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    realized: bool,
    decorated: bool,
    decorations: Decorations,
    frame_origin: Point,
    content_size: Size,
    title: String,
}

impl HeadlessWindow {
    pub fn new(content_size: Size) -> Self {
        Self {
            realized: false,
            decorated: true,
            decorations: Decorations::default(),
            frame_origin: Point::ORIGIN,
            content_size,
            title: String::new(),
        }
    }

    pub fn with_decorations(mut self, decorations: Decorations) -> Self {
        self.decorations = decorations;
        self
    }

    /// Realized window at the given frame origin
    pub fn realized_at(content_size: Size, frame_origin: Point) -> Self {
        let mut window = Self::new(content_size);
        window.frame_origin = frame_origin;
        window.realized = true;
        window
    }

    pub fn realize(&mut self) {
        self.realized = true;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn current_margins(&self) -> Margins {
        if self.decorated {
            let d = self.decorations;
            Margins::new(d.title_bar, d.border, d.border, d.border)
        } else {
            Margins::default()
        }
    }
}

impl HostWindow for HeadlessWindow {
    fn is_realized(&self) -> bool {
        self.realized
    }

    fn frame_rect(&self) -> Option<Rect> {
        if !self.realized {
            return None;
        }
        let m = self.current_margins();
        Some(Rect::new(
            self.frame_origin.x,
            self.frame_origin.y,
            self.content_size.width + m.horizontal(),
            self.content_size.height + m.vertical(),
        ))
    }

    fn content_rect(&self) -> Option<Rect> {
        if !self.realized {
            return None;
        }
        let m = self.current_margins();
        Some(Rect::new(
            self.frame_origin.x + m.left,
            self.frame_origin.y + m.top,
            self.content_size.width,
            self.content_size.height,
        ))
    }

    fn set_content_size(&mut self, size: Size) {
        self.content_size = size;
    }

    fn move_frame_to(&mut self, origin: Point) {
        self.frame_origin = origin;
    }

    fn set_decorated(&mut self, decorated: bool) {
        self.decorated = decorated;
    }

    fn is_decorated(&self) -> bool {
        self.decorated
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }
}
