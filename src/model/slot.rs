//! Slot manager
//!
//! Slots are docking targets laid out as a horizontal strip on the board.
//! The strip only ever grows; a slot's index is stable for the whole run.
//!
//! Occupancy is a non-owning `ModuleId`. Visibility and screen geometry are
//! derived from the board on every query, so hit-testing always sees the
//! current scroll position. `recompute_geometry` additionally refreshes the
//! cached rectangles used for drawing.

use serde::Serialize;

use super::board::Board;
use super::module::ModuleId;
use crate::error::DockError;
use crate::geometry::{Point, Rect, Size};

/// Width of the band along a slot's border that counts as a resize handle
pub const RESIZE_BAND: f32 = 8.0;

/// Geometry and policy shared by all slots
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotLayout {
    pub min_size: Size,
    pub spacing: f32,
    pub margin: f32,
    /// Minimum visible fraction of a slot's width for it to count as visible
    pub visibility_ratio: f32,
    /// Hit-test tolerance around each slot, in pixels
    pub hit_tolerance: f32,
}

impl Default for SlotLayout {
    fn default() -> Self {
        Self {
            min_size: Size::new(250.0, 400.0),
            spacing: 10.0,
            margin: 10.0,
            visibility_ratio: 0.3,
            hit_tolerance: 20.0,
        }
    }
}

/// Which border of a slot a point is grabbing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResizeEdge {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    index: usize,
    /// Size set by the user; `None` follows the layout defaults
    custom_size: Option<Size>,
    local: Rect,
    global: Rect,
    occupant: Option<ModuleId>,
    highlighted: bool,
}

impl Slot {
    fn new(index: usize) -> Self {
        Self {
            index,
            custom_size: None,
            local: Rect::default(),
            global: Rect::default(),
            occupant: None,
            highlighted: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn occupant(&self) -> Option<ModuleId> {
        self.occupant
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Board-local rectangle as of the last `recompute_geometry`
    pub fn local(&self) -> Rect {
        self.local
    }

    /// Screen rectangle as of the last `recompute_geometry`
    pub fn global(&self) -> Rect {
        self.global
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlotManager {
    slots: Vec<Slot>,
    layout: SlotLayout,
}

impl SlotManager {
    pub fn new(layout: SlotLayout) -> Self {
        Self {
            slots: Vec::new(),
            layout,
        }
    }

    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn occupant(&self, index: usize) -> Option<ModuleId> {
        self.slots.get(index).and_then(|s| s.occupant)
    }

    /// Index of the slot holding `module`
    pub fn slot_of(&self, module: ModuleId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.occupant == Some(module))
    }

    pub fn free_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_empty()).count()
    }

    /// Append a slot at the end of the strip
    pub fn create_slot(&mut self) -> usize {
        let index = self.slots.len();
        self.slots.push(Slot::new(index));
        tracing::debug!("slot {} created", index);
        index
    }

    /// Create slots until at least `n` are unoccupied; returns how many were added
    pub fn ensure_minimum_free(&mut self, n: usize) -> usize {
        let missing = n.saturating_sub(self.free_count());
        for _ in 0..missing {
            self.create_slot();
        }
        missing
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    fn slot_size(&self, slot: &Slot, board: &Board) -> Size {
        if let Some(size) = slot.custom_size {
            return size;
        }
        let fill = board.size().height - 2.0 * self.layout.margin;
        Size::new(self.layout.min_size.width, fill.max(self.layout.min_size.height))
    }

    /// Board-local rectangles for every slot, computed from live board state
    fn local_rects<'a>(&'a self, board: &'a Board) -> impl Iterator<Item = (usize, Rect)> + 'a {
        let margin = self.layout.margin;
        let spacing = self.layout.spacing;
        let mut x = margin;
        self.slots.iter().map(move |slot| {
            let size = self.slot_size(slot, board);
            let rect = Rect::new(x, margin, size.width, size.height);
            x += size.width + spacing;
            (slot.index, rect)
        })
    }

    /// Screen rectangles for every slot, computed from live board state
    pub fn global_rects<'a>(&'a self, board: &'a Board) -> impl Iterator<Item = (usize, Rect)> + 'a {
        self.local_rects(board)
            .map(move |(index, local)| (index, board.to_global(local)))
    }

    /// Screen rectangle of one slot
    pub fn global_rect(&self, index: usize, board: &Board) -> Option<Rect> {
        self.global_rects(board)
            .find(|(i, _)| *i == index)
            .map(|(_, rect)| rect)
    }

    /// Total extent of the strip including margins
    pub fn content_size(&self, board: &Board) -> Size {
        let margin = self.layout.margin;
        let (right, bottom) = self
            .local_rects(board)
            .fold((0.0f32, 0.0f32), |(r, b), (_, rect)| {
                (r.max(rect.right()), b.max(rect.bottom()))
            });
        Size::new(right + margin, bottom + margin)
    }

    /// Refresh the cached local/global rectangles of every slot
    pub fn recompute_geometry(&mut self, board: &Board) {
        let rects: Vec<(usize, Rect)> = self.local_rects(board).collect();
        for (index, local) in rects {
            let slot = &mut self.slots[index];
            slot.local = local;
            slot.global = board.to_global(local);
        }
    }

    pub fn is_visible(&self, index: usize, board: &Board) -> bool {
        self.global_rect(index, board)
            .is_some_and(|rect| self.rect_visible(&rect, board))
    }

    fn rect_visible(&self, rect: &Rect, board: &Board) -> bool {
        rect.visible_width_ratio(&board.viewport_rect()) >= self.layout.visibility_ratio
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Lowest-index unoccupied slot
    pub fn find_first_empty(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_empty())
    }

    /// Lowest-index unoccupied slot that is sufficiently visible
    pub fn find_first_empty_visible(&self, board: &Board) -> Option<usize> {
        self.global_rects(board)
            .find(|(index, rect)| self.slots[*index].is_empty() && self.rect_visible(rect, board))
            .map(|(index, _)| index)
    }

    /// Visible slot whose tolerance-expanded rectangle contains `point`
    ///
    /// Neighbouring expanded rectangles can overlap in the spacing between
    /// slots. A slot that contains the point without expansion wins;
    /// otherwise the one whose centre is nearest.
    pub fn find_slot_at(&self, point: Point, board: &Board) -> Option<usize> {
        let tolerance = self.layout.hit_tolerance;
        let mut best: Option<(usize, f32)> = None;

        for (index, rect) in self.global_rects(board) {
            if !self.rect_visible(&rect, board) || !rect.expanded(tolerance).contains(point) {
                continue;
            }
            if rect.contains(point) {
                return Some(index);
            }
            let distance = rect.center().distance_to(point);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }

        best.map(|(index, _)| index)
    }

    /// Classify a point near a slot's border as a resize handle
    pub fn resize_edge_at(&self, index: usize, point: Point, board: &Board) -> Option<ResizeEdge> {
        let rect = self.global_rect(index, board)?;
        if !rect.contains(point) {
            return None;
        }
        let left = point.x - rect.x < RESIZE_BAND;
        let right = rect.right() - point.x <= RESIZE_BAND;
        let top = point.y - rect.y < RESIZE_BAND;
        let bottom = rect.bottom() - point.y <= RESIZE_BAND;

        match (left, right, top, bottom) {
            (true, _, true, _) => Some(ResizeEdge::TopLeft),
            (_, true, true, _) => Some(ResizeEdge::TopRight),
            (true, _, _, true) => Some(ResizeEdge::BottomLeft),
            (_, true, _, true) => Some(ResizeEdge::BottomRight),
            (true, _, _, _) => Some(ResizeEdge::Left),
            (_, true, _, _) => Some(ResizeEdge::Right),
            (_, _, true, _) => Some(ResizeEdge::Top),
            (_, _, _, true) => Some(ResizeEdge::Bottom),
            _ => None,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    fn check_index(&self, index: usize) -> Result<(), DockError> {
        if index < self.slots.len() {
            return Ok(());
        }
        let err = DockError::InvalidSlotIndex {
            index,
            len: self.slots.len(),
        };
        debug_assert!(false, "{}", err);
        tracing::error!("{}", err);
        Err(err)
    }

    /// Put `module` into slot `index`
    ///
    /// Any other slot the module held is vacated first. Returns the module
    /// that previously occupied the slot, which the caller must set free.
    pub fn place(&mut self, module: ModuleId, index: usize) -> Result<Option<ModuleId>, DockError> {
        self.check_index(index)?;

        if self.slots[index].occupant == Some(module) {
            return Ok(None);
        }
        if let Some(previous) = self.slot_of(module) {
            self.clear_slot(previous);
        }

        let slot = &mut self.slots[index];
        let displaced = slot.occupant.replace(module);
        slot.highlighted = false;
        tracing::debug!("module {} placed in slot {}", module, index);
        if let Some(displaced) = displaced {
            tracing::debug!("module {} displaced from slot {}", displaced, index);
        }
        Ok(displaced)
    }

    /// Clear whichever slot holds `module`; no-op when it holds none
    pub fn vacate(&mut self, module: ModuleId) -> Option<usize> {
        let index = self.slot_of(module)?;
        self.clear_slot(index);
        tracing::debug!("module {} vacated slot {}", module, index);
        Some(index)
    }

    fn clear_slot(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        slot.occupant = None;
        slot.highlighted = false;
    }

    /// Resize one slot, clamped to the layout minimum
    pub fn resize_slot(&mut self, index: usize, size: Size) -> Result<Size, DockError> {
        self.check_index(index)?;
        let size = size.at_least(self.layout.min_size);
        self.slots[index].custom_size = Some(size);
        Ok(size)
    }

    /// Highlight exactly one slot; returns true when anything changed
    pub fn highlight(&mut self, index: usize) -> bool {
        if self.check_index(index).is_err() {
            return false;
        }
        let mut changed = false;
        for slot in &mut self.slots {
            let want = slot.index == index;
            if slot.highlighted != want {
                slot.highlighted = want;
                changed = true;
            }
        }
        changed
    }

    /// Remove every highlight; returns true when anything changed
    pub fn clear_highlights(&mut self) -> bool {
        let mut changed = false;
        for slot in &mut self.slots {
            changed |= std::mem::replace(&mut slot.highlighted, false);
        }
        changed
    }
}
