//! Admission-checked module construction

use crate::error::AdmissionError;
use crate::frame::HostWindow;
use crate::geometry::Size;
use crate::perf::AdmissionController;

use super::content::content_for;
use super::module::{Module, ModuleId, ModuleKind, ModuleSettings};

/// Builds modules once the admission controller approves
#[derive(Debug, Clone)]
pub struct ModuleFactory {
    settings: ModuleSettings,
    /// Content size requested for newly opened windows
    initial_size: Size,
}

impl ModuleFactory {
    pub fn new(settings: ModuleSettings, initial_size: Size) -> Self {
        Self {
            settings,
            initial_size,
        }
    }

    pub fn settings(&self) -> ModuleSettings {
        self.settings
    }

    /// Create a module of `kind`
    ///
    /// `open_window` is only called after admission approves, so a denied
    /// request never opens a window. It receives the title and initial
    /// content size.
    pub fn create_module<F>(
        &self,
        kind: ModuleKind,
        admission: &AdmissionController,
        open_window: F,
    ) -> Result<Module, AdmissionError>
    where
        F: FnOnce(&str, Size) -> Box<dyn HostWindow>,
    {
        if let Err(e) = admission.can_create() {
            tracing::info!("Creation of {} module denied: {}", kind.display_name(), e);
            return Err(e);
        }

        let id = ModuleId::next();
        let title = format!("{} {}", kind.display_name(), id.0);
        let mut window = open_window(&title, self.initial_size);
        window.set_title(&title);

        tracing::info!("Created module {} ({:?}) \"{}\"", id, kind, title);
        Ok(Module::new(
            id,
            kind,
            title,
            window,
            content_for(kind),
            self.settings,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::frame::HeadlessWindow;
    use crate::perf::{NullProbe, PerformanceSnapshot, Thresholds};

    fn admission() -> AdmissionController {
        AdmissionController::new(
            Box::new(NullProbe),
            Thresholds::default(),
            Duration::from_secs(2),
            Instant::now(),
        )
    }

    #[test]
    fn test_create_module_sets_title() {
        let factory = ModuleFactory::new(ModuleSettings::default(), Size::new(250.0, 400.0));
        let module = factory
            .create_module(ModuleKind::Calculator, &admission(), |_, size| {
                Box::new(HeadlessWindow::new(size))
            })
            .unwrap();
        assert_eq!(module.kind(), ModuleKind::Calculator);
        assert!(module.title().starts_with("Calculator "));
        assert!(module.window().is_decorated());
    }

    #[test]
    fn test_denied_creation_never_opens_window() {
        let factory = ModuleFactory::new(ModuleSettings::default(), Size::new(250.0, 400.0));
        let mut admission = admission();
        admission.set_snapshot(PerformanceSnapshot {
            cpu_percent: 95.0,
            ..Default::default()
        });

        let opened = Cell::new(false);
        let result = factory.create_module(ModuleKind::Example, &admission, |_, size| {
            opened.set(true);
            Box::new(HeadlessWindow::new(size))
        });
        assert!(result.is_err());
        assert!(!opened.get());
    }
}
