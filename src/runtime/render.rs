//! Flat-colour software rendering for the board and module windows

use std::num::NonZeroU32;
use std::rc::Rc;

use anyhow::Result;
use softbuffer::{Context, Surface};
use winit::window::Window;

use dockyard::geometry::{Point, Rect};
use dockyard::model::{DockModel, Module};

const BOARD_BACKGROUND: u32 = 0xFF1E1F22;
const SLOT_EMPTY: u32 = 0xFF2B2D30;
const SLOT_BORDER: u32 = 0xFF43454A;
const SLOT_HIGHLIGHT: u32 = 0xFF22415F;
const SLOT_HIGHLIGHT_BORDER: u32 = 0xFF4A90E2;
const SLOT_OCCUPIED: u32 = 0xFF25272A;
const MODULE_BODY: u32 = 0xFF2B2D30;
const GRIP_ATTACHED: u32 = 0xFF3C3F41;
const GRIP_FREE: u32 = 0xFF4E5254;
const CLOSE_BOX: u32 = 0xFFC75450;
const TEXT_PLACEHOLDER: u32 = 0xFF6F737A;

/// Close button in the grip bar, in content-local logical coordinates
pub fn close_box(content_width: f32, grip_height: f32) -> Rect {
    let inset = 6.0;
    let edge = (grip_height - 2.0 * inset).max(4.0);
    Rect::new(content_width - inset - edge, inset, edge, edge)
}

/// A pixel buffer with clipped drawing primitives
pub struct Canvas<'a> {
    buffer: &'a mut [u32],
    width: usize,
    height: usize,
    scale: f32,
}

impl<'a> Canvas<'a> {
    pub fn new(buffer: &'a mut [u32], width: usize, height: usize, scale: f32) -> Self {
        let height = if width > 0 {
            height.min(buffer.len() / width)
        } else {
            0
        };
        Self {
            buffer,
            width,
            height,
            scale,
        }
    }

    pub fn clear(&mut self, color: u32) {
        self.buffer.fill(color);
    }

    /// Fill a rectangle given in logical coordinates
    pub fn fill_rect(&mut self, rect: Rect, color: u32) {
        let s = self.scale;
        let x0 = ((rect.x * s).max(0.0) as usize).min(self.width);
        let y0 = ((rect.y * s).max(0.0) as usize).min(self.height);
        let x1 = ((rect.right() * s).max(0.0) as usize).min(self.width);
        let y1 = ((rect.bottom() * s).max(0.0) as usize).min(self.height);
        if x0 >= x1 {
            return;
        }

        for y in y0..y1 {
            let row = y * self.width;
            self.buffer[row + x0..row + x1].fill(color);
        }
    }

    /// One-pixel outline of a logical rectangle
    pub fn stroke_rect(&mut self, rect: Rect, color: u32) {
        let px = 1.0 / self.scale;
        self.fill_rect(Rect::new(rect.x, rect.y, rect.width, px), color);
        self.fill_rect(Rect::new(rect.x, rect.bottom() - px, rect.width, px), color);
        self.fill_rect(Rect::new(rect.x, rect.y, px, rect.height), color);
        self.fill_rect(Rect::new(rect.right() - px, rect.y, px, rect.height), color);
    }
}

/// Draw slots relative to the board's content origin
pub fn draw_board(canvas: &mut Canvas, model: &DockModel) {
    canvas.clear(BOARD_BACKGROUND);
    let origin = model.board.origin();

    for slot in model.slots.iter() {
        let global = slot.global();
        let rect = global.translated(-origin.x, -origin.y);
        let (fill, border) = if slot.is_highlighted() {
            (SLOT_HIGHLIGHT, SLOT_HIGHLIGHT_BORDER)
        } else if slot.is_empty() {
            (SLOT_EMPTY, SLOT_BORDER)
        } else {
            (SLOT_OCCUPIED, SLOT_BORDER)
        };
        canvas.fill_rect(rect, fill);
        canvas.stroke_rect(rect, border);
    }
}

/// Draw a module's content area: grip bar, close box, accent and body
pub fn draw_module(canvas: &mut Canvas, module: &Module, grip_height: f32) {
    canvas.clear(MODULE_BODY);
    let Some(content) = module.content_rect() else {
        return;
    };
    let view = module.content().content_view();
    let accent = 0xFF000000 | view.accent;

    let grip = Rect::new(0.0, 0.0, content.width, grip_height);
    let grip_color = if module.is_attached() {
        GRIP_ATTACHED
    } else {
        GRIP_FREE
    };
    canvas.fill_rect(grip, grip_color);
    canvas.fill_rect(Rect::new(0.0, grip_height - 3.0, content.width, 3.0), accent);
    canvas.fill_rect(close_box(content.width, grip_height), CLOSE_BOX);

    // Without a font, each text line becomes a bar proportional to its length
    let mut pen = Point::new(12.0, grip_height + 16.0);
    let heading_width = (view.heading.chars().count() as f32 * 9.0).min(content.width - 24.0);
    canvas.fill_rect(Rect::new(pen.x, pen.y, heading_width, 10.0), accent);
    pen = pen.offset(0.0, 24.0);
    for line in &view.lines {
        let width = (line.chars().count() as f32 * 6.0).min(content.width - 24.0);
        canvas.fill_rect(Rect::new(pen.x, pen.y, width, 6.0), TEXT_PLACEHOLDER);
        pen = pen.offset(0.0, 16.0);
    }
}

/// A softbuffer surface sized to its window
pub struct WindowSurface {
    surface: Surface<Rc<Window>, Rc<Window>>,
    window: Rc<Window>,
    width: u32,
    height: u32,
}

impl WindowSurface {
    pub fn new(context: &Context<Rc<Window>>, window: Rc<Window>) -> Result<Self> {
        let surface = Surface::new(context, Rc::clone(&window))
            .map_err(|e| anyhow::anyhow!("Failed to create surface: {}", e))?;
        Ok(Self {
            surface,
            window,
            width: 0,
            height: 0,
        })
    }

    /// Resize if needed, draw with `paint`, then present
    pub fn draw(&mut self, paint: impl FnOnce(&mut Canvas)) -> Result<()> {
        let size = self.window.inner_size();
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(());
        };
        if size.width != self.width || size.height != self.height {
            self.surface
                .resize(width, height)
                .map_err(|e| anyhow::anyhow!("Failed to resize surface: {}", e))?;
            self.width = size.width;
            self.height = size.height;
        }

        let scale = self.window.scale_factor() as f32;
        let mut buffer = self
            .surface
            .buffer_mut()
            .map_err(|e| anyhow::anyhow!("Failed to get surface buffer: {}", e))?;
        {
            let mut canvas = Canvas::new(
                &mut buffer[..],
                self.width as usize,
                self.height as usize,
                scale,
            );
            paint(&mut canvas);
        }
        buffer
            .present()
            .map_err(|e| anyhow::anyhow!("Failed to present buffer: {}", e))?;
        Ok(())
    }
}
