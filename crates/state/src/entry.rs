use std::path::PathBuf;
use uuid::Uuid;

use crate::intake::PickedFile;

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

/// A video file picked by the user. Immutable once created.
#[derive(Debug, Clone)]
pub struct VideoEntry {
    pub id: EntryId,
    pub name: String,
    pub size: u64,
    /// `/`-separated, starting with the picked folder's own name.
    pub relative_path: String,
    pub path: PathBuf,
}

impl VideoEntry {
    pub fn from_picked(file: PickedFile) -> Self {
        Self {
            id: EntryId::new(),
            name: file.name,
            size: file.size,
            relative_path: file.relative_path,
            path: file.path,
        }
    }

    pub fn folder(&self) -> &str {
        crate::intake::folder_of(&self.relative_path)
    }

    pub fn display_size(&self) -> String {
        format_file_size(self.size)
    }
}

/// Human readable size in 1024-based units, two decimals with trailing
/// zeros trimmed (`1.5 KB`, `1 MB`).
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0usize;
    let mut threshold = 1024u64;
    while unit + 1 < SIZE_UNITS.len() && bytes >= threshold {
        unit += 1;
        threshold = threshold.saturating_mul(1024);
    }

    let mut value = round2(bytes as f64 / 1024f64.powi(unit as i32));
    if value >= 1024.0 && unit + 1 < SIZE_UNITS.len() {
        unit += 1;
        value = round2(bytes as f64 / 1024f64.powi(unit as i32));
    }

    format!("{} {}", trim_decimals(value), SIZE_UNITS[unit])
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn trim_decimals(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
