use std::collections::HashMap;

use crate::entry::{EntryId, VideoEntry};
use crate::intake::FolderGroups;
use crate::thumbnail::Liveness;

#[derive(Debug, Clone)]
pub struct FolderGroup {
    pub folder: String,
    pub entries: Vec<EntryId>,
}

/// The visible list: folder groups in display order plus the entries
/// they reference.
#[derive(Debug, Default)]
pub struct Library {
    entries: HashMap<EntryId, VideoEntry>,
    groups: Vec<FolderGroup>,
    liveness: HashMap<EntryId, Liveness>,
}

impl Library {
    pub fn from_groups(groups: FolderGroups) -> Self {
        let mut library = Self::default();
        for (folder, entries) in groups.into_inner() {
            let ids = entries.iter().map(|e| e.id).collect();
            for entry in entries {
                library.liveness.insert(entry.id, Liveness::new());
                library.entries.insert(entry.id, entry);
            }
            library.groups.push(FolderGroup {
                folder,
                entries: ids,
            });
        }
        library
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn groups(&self) -> &[FolderGroup] {
        &self.groups
    }

    pub fn entry(&self, id: &EntryId) -> Option<&VideoEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn liveness(&self, id: &EntryId) -> Option<&Liveness> {
        self.liveness.get(id)
    }

    /// Visible entries in display order.
    pub fn visible_entries(&self) -> Vec<&VideoEntry> {
        self.groups
            .iter()
            .flat_map(|g| g.entries.iter())
            .filter_map(|id| self.entries.get(id))
            .collect()
    }

    /// Last visible row whose name matches, like a top-to-bottom scan that
    /// keeps overwriting its match.
    pub fn find_by_name(&self, name: &str) -> Option<EntryId> {
        self.visible_entries()
            .into_iter()
            .rev()
            .find(|e| e.name == name)
            .map(|e| e.id)
    }

    /// Removes a row from the visible list. The folder header stays even
    /// when it becomes empty.
    pub fn remove(&mut self, id: &EntryId) -> Option<VideoEntry> {
        let entry = self.entries.remove(id)?;
        for group in &mut self.groups {
            group.entries.retain(|e| e != id);
        }
        if let Some(token) = self.liveness.remove(id) {
            token.kill();
        }
        Some(entry)
    }

    /// Marks every row dead, used when a new folder replaces the list.
    pub fn retire(&mut self) {
        for token in self.liveness.values() {
            token.kill();
        }
    }
}
