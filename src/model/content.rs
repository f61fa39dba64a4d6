//! Module content
//!
//! The docking subsystem never looks inside a module's content; it only needs
//! something it can show and reset. Each `ModuleKind` maps to a content
//! implementation through `content_for`.

use super::module::ModuleKind;

/// What a host draws inside a module's content area
#[derive(Debug, Clone, PartialEq)]
pub struct ContentView {
    pub heading: String,
    pub lines: Vec<String>,
    /// 0xRRGGBB accent for the grip bar and body tint
    pub accent: u32,
}

/// Capabilities every module content provides
pub trait ModuleContent {
    fn content_view(&self) -> ContentView;

    /// Drop any state the content holds (called before destruction)
    fn clear(&mut self);
}

/// Content for kinds whose real views live outside this crate
#[derive(Debug, Clone)]
pub struct PlaceholderContent {
    kind: ModuleKind,
    lines: Vec<String>,
}

impl PlaceholderContent {
    pub fn new(kind: ModuleKind) -> Self {
        Self {
            kind,
            lines: vec![Self::message(kind).to_string()],
        }
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    fn message(kind: ModuleKind) -> &'static str {
        match kind {
            ModuleKind::Example => "Drag the grip bar to undock me",
            ModuleKind::Custom => "Custom module",
            ModuleKind::TextEditor => "Text editor coming soon...",
            ModuleKind::Calculator => "Calculator coming soon...",
            ModuleKind::FileBrowser => "File browser coming soon...",
            ModuleKind::ImageViewer => "Image viewer coming soon...",
            ModuleKind::DataVisualizer => "Charts coming soon...",
            ModuleKind::Settings => "Settings coming soon...",
            ModuleKind::UserDefined(_) => "User-defined module",
        }
    }

    fn accent(kind: ModuleKind) -> u32 {
        match kind {
            ModuleKind::Example => 0x4C8BF5,
            ModuleKind::Custom => 0x8E6CEF,
            ModuleKind::TextEditor => 0x3FB37F,
            ModuleKind::Calculator => 0xF5A623,
            ModuleKind::FileBrowser => 0x50B5C8,
            ModuleKind::ImageViewer => 0xE0607E,
            ModuleKind::DataVisualizer => 0xB8C94A,
            ModuleKind::Settings => 0x9AA0A6,
            ModuleKind::UserDefined(_) => 0xD08A5C,
        }
    }
}

impl ModuleContent for PlaceholderContent {
    fn content_view(&self) -> ContentView {
        ContentView {
            heading: self.kind.display_name().to_string(),
            lines: self.lines.clone(),
            accent: Self::accent(self.kind),
        }
    }

    fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Build the content for a module kind
pub fn content_for(kind: ModuleKind) -> Box<dyn ModuleContent> {
    Box::new(PlaceholderContent::new(kind))
}
