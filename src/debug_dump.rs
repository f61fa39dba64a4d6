//! Debug layout dump for development diagnostics
//!
//! Serializes the board, slots and modules to JSON. Triggered by F7 in debug
//! builds; files land in the config `dumps/` directory.

use serde::Serialize;

use dockyard::geometry::{Point, Rect, Size};
use dockyard::model::{AttachState, DockModel, DragState};
use dockyard::perf::PerformanceSnapshot;
use dockyard::tracing::LayoutSnapshot;

#[derive(Serialize)]
pub struct LayoutDump {
    pub timestamp: String,
    pub board: BoardDump,
    pub slots: Vec<SlotDump>,
    pub modules: Vec<ModuleDump>,
    pub performance: PerformanceSnapshot,
    pub occupancy: LayoutSnapshot,
}

#[derive(Serialize)]
pub struct BoardDump {
    pub origin: Point,
    pub size: Size,
    pub scroll: Point,
    pub content_size: Size,
}

#[derive(Serialize)]
pub struct SlotDump {
    pub index: usize,
    pub occupant: Option<u64>,
    pub highlighted: bool,
    pub visible: bool,
    pub global: Rect,
}

#[derive(Serialize)]
pub struct ModuleDump {
    pub id: u64,
    pub kind: String,
    pub title: String,
    pub attach: AttachState,
    pub drag: DragState,
    pub frame: Option<Rect>,
    pub pending_attach: Option<Rect>,
}

impl LayoutDump {
    pub fn from_model(model: &DockModel) -> Self {
        let slots = model
            .slots
            .iter()
            .map(|slot| SlotDump {
                index: slot.index(),
                occupant: slot.occupant().map(|id| id.0),
                highlighted: slot.is_highlighted(),
                visible: model.slots.is_visible(slot.index(), &model.board),
                global: slot.global(),
            })
            .collect();

        let modules = model
            .modules
            .iter()
            .map(|m| ModuleDump {
                id: m.id().0,
                kind: m.kind().display_name().to_string(),
                title: m.title().to_string(),
                attach: m.attach_state(),
                drag: m.drag_state(),
                frame: m.frame_rect(),
                pending_attach: m.pending_attach(),
            })
            .collect();

        Self {
            timestamp: chrono_timestamp(),
            board: BoardDump {
                origin: model.board.origin(),
                size: model.board.size(),
                scroll: model.board.scroll(),
                content_size: model.content_size(),
            },
            slots,
            modules,
            performance: *model.admission.snapshot(),
            occupancy: LayoutSnapshot::from_model(model),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }

    /// Write the dump and return the file path
    pub fn save_to_file(&self) -> anyhow::Result<String> {
        let dir = dockyard::config_paths::ensure_dumps_dir().map_err(anyhow::Error::msg)?;
        let path = dir.join(format!("{}-layout-dump.json", self.timestamp));
        std::fs::write(&path, self.to_json())?;
        Ok(path.display().to_string())
    }
}

fn chrono_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let (year, month, day) = civil_from_days((secs / 86400) as i64);
    let secs_today = secs % 86400;

    format!(
        "{:04}-{:02}-{:02}-{:02}{:02}{:02}",
        year,
        month,
        day,
        secs_today / 3600,
        (secs_today % 3600) / 60,
        secs_today % 60
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian date
fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let days = days + 719468;
    let era = (if days >= 0 { days } else { days - 146096 }) / 146097;
    let doe = (days - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe as i64 + era * 400 + i64::from(month <= 2);
    (year as i32, month, day)
}
