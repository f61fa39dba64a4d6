//! Error kinds for the docking subsystem
//!
//! Handlers convert failures into one of these at their own boundary; none of
//! them is fatal to the event loop.

use thiserror::Error;

use crate::model::ModuleId;

/// Which resource limit caused a module creation to be refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdmissionDenial {
    CpuLimit,
    MemoryLimit,
    ProcessMemoryLimit,
}

/// Module creation refused by the admission controller
///
/// The reason is user-facing and always cites measured value and threshold.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason}")]
pub struct AdmissionError {
    pub kind: AdmissionDenial,
    pub reason: String,
}

/// Errors surfaced by docking operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DockError {
    /// Soft failure: the module is simply not created
    #[error("module creation denied: {0}")]
    AdmissionDenied(#[from] AdmissionError),

    /// Coordinator and slot manager disagree about the slot list
    #[error("slot index {index} out of range ({len} slots)")]
    InvalidSlotIndex { index: usize, len: usize },

    /// The module's window has not been realized yet; retry after layout
    #[error("window for module {0} is not realized yet")]
    GeometryNotReady(ModuleId),
}
