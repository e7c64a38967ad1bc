use std::path::PathBuf;

use crate::entry::VideoEntry;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm"];

/// Group key for files that sit directly in the selection root.
pub const ROOT_FOLDER: &str = "";

/// A file handed over by the folder picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub size: u64,
    pub relative_path: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct FolderGroups {
    groups: Vec<(String, Vec<VideoEntry>)>,
}

impl FolderGroups {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|(_, entries)| entries.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[VideoEntry])> {
        self.groups
            .iter()
            .map(|(folder, entries)| (folder.as_str(), entries.as_slice()))
    }

    pub fn into_inner(self) -> Vec<(String, Vec<VideoEntry>)> {
        self.groups
    }
}

#[derive(Debug)]
pub enum IntakeOutcome {
    /// Nothing selected, or nothing with a supported extension.
    NoVideos { scanned: usize },
    Loaded(FolderGroups),
}

pub fn is_supported_video(name: &str) -> bool {
    let Some(dot) = name.rfind('.') else {
        return false;
    };
    let ext = name[dot + 1..].to_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

pub fn filter_supported(files: Vec<PickedFile>) -> Vec<PickedFile> {
    files
        .into_iter()
        .filter(|f| is_supported_video(&f.name))
        .collect()
}

pub fn folder_of(relative_path: &str) -> &str {
    match relative_path.rfind('/') {
        Some(idx) => &relative_path[..idx],
        None => ROOT_FOLDER,
    }
}

pub fn folder_label(folder: &str) -> &str {
    if folder == ROOT_FOLDER {
        "Root"
    } else {
        folder
    }
}

pub fn group_by_folder(entries: Vec<VideoEntry>) -> FolderGroups {
    let mut groups: Vec<(String, Vec<VideoEntry>)> = Vec::new();
    for entry in entries {
        let folder = entry.folder().to_string();
        match groups.iter_mut().find(|(f, _)| *f == folder) {
            Some((_, list)) => list.push(entry),
            None => groups.push((folder, vec![entry])),
        }
    }
    FolderGroups { groups }
}

pub fn intake(files: Vec<PickedFile>) -> IntakeOutcome {
    let scanned = files.len();
    let supported = filter_supported(files);
    if supported.is_empty() {
        return IntakeOutcome::NoVideos { scanned };
    }
    let entries = supported.into_iter().map(VideoEntry::from_picked).collect();
    IntakeOutcome::Loaded(group_by_folder(entries))
}
