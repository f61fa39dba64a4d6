//! Docking model - the complete state of the board
//!
//! Following the Elm Architecture, everything the coordinator mutates lives
//! in `DockModel`; `update` is the only writer.

pub mod board;
pub mod content;
pub mod factory;
pub mod module;
pub mod slot;

pub use board::Board;
pub use content::{content_for, ContentView, ModuleContent, PlaceholderContent};
pub use factory::ModuleFactory;
pub use module::{
    AttachState, DragPosition, DragState, Module, ModuleEvent, ModuleEventKind, ModuleId,
    ModuleInput, ModuleKind, ModuleSettings,
};
pub use slot::{ResizeEdge, Slot, SlotLayout, SlotManager};

use std::time::Instant;

use crate::config::DockConfig;
use crate::error::AdmissionDenial;
use crate::geometry::{Point, Size};
use crate::perf::{AdmissionController, SystemProbe, Thresholds};

/// The complete docking state
#[derive(Debug)]
pub struct DockModel {
    pub config: DockConfig,
    pub board: Board,
    pub slots: SlotManager,
    /// Registered modules in creation order
    pub modules: Vec<Module>,
    pub admission: AdmissionController,
    pub factory: ModuleFactory,
    /// Resources currently in the warning band (to notify only on entry)
    pub active_warnings: Vec<AdmissionDenial>,
}

impl DockModel {
    /// Build the model with `config.initial_slots` empty slots
    pub fn new(
        config: DockConfig,
        board_origin: Point,
        board_size: Size,
        probe: Box<dyn SystemProbe>,
        now: Instant,
    ) -> Self {
        let admission = AdmissionController::new(
            probe,
            Thresholds::from_config(&config),
            config.sample_interval(),
            now,
        );
        let factory = ModuleFactory::new(
            config.module_settings(),
            Size::new(config.slot_min_width, config.slot_min_height),
        );

        let mut slots = SlotManager::new(config.slot_layout());
        for _ in 0..config.initial_slots {
            slots.create_slot();
        }
        slots.ensure_minimum_free(config.minimum_free_slots);

        let board = Board::new(board_origin, board_size);
        slots.recompute_geometry(&board);

        Self {
            config,
            board,
            slots,
            modules: Vec::new(),
            admission,
            factory,
            active_warnings: Vec::new(),
        }
    }

    // =========================================================================
    // Registry queries
    // =========================================================================

    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.iter().find(|m| m.id() == id)
    }

    pub fn module_mut(&mut self, id: ModuleId) -> Option<&mut Module> {
        self.modules.iter_mut().find(|m| m.id() == id)
    }

    pub fn all_modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn modules_by_kind(&self, kind: ModuleKind) -> impl Iterator<Item = &Module> {
        self.modules.iter().filter(move |m| m.kind() == kind)
    }

    pub fn count_by_kind(&self, kind: ModuleKind) -> usize {
        self.modules_by_kind(kind).count()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    // =========================================================================
    // Derived state
    // =========================================================================

    /// Full extent of the slot strip
    pub fn content_size(&self) -> Size {
        self.slots.content_size(&self.board)
    }

    /// Earliest instant at which a `Tick` has work to do
    pub fn next_deadline(&self) -> Instant {
        self.modules
            .iter()
            .filter_map(|m| m.settle_deadline())
            .fold(self.admission.next_due(), |earliest, d| earliest.min(d))
    }

    /// Check that slot occupancy and module attach states agree
    ///
    /// Every occupant must be a registered, attached module, and every
    /// attached module must sit in exactly one slot.
    pub fn verify_occupancy(&self) -> Result<(), String> {
        for slot in self.slots.iter() {
            let Some(id) = slot.occupant() else {
                continue;
            };
            match self.module(id) {
                None => return Err(format!("slot {} holds unknown module {}", slot.index(), id)),
                Some(m) if !m.is_attached() => {
                    return Err(format!("slot {} holds free module {}", slot.index(), id))
                }
                Some(_) => {}
            }
        }
        for module in &self.modules {
            let held = self
                .slots
                .iter()
                .filter(|s| s.occupant() == Some(module.id()))
                .count();
            match (module.is_attached(), held) {
                (true, 1) | (false, 0) => {}
                (attached, n) => {
                    return Err(format!(
                        "module {} attached={} occupies {} slots",
                        module.id(),
                        attached,
                        n
                    ))
                }
            }
        }
        Ok(())
    }
}
