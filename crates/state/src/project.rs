use rand::Rng;

use crate::entry::{EntryId, VideoEntry};
use crate::intake::{self, IntakeOutcome, PickedFile};
use crate::library::Library;
use crate::recommend::{self, Recommendation};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LibraryStatus {
    #[default]
    AwaitingSelection,
    NoSupportedFiles,
    ScanFailed(String),
    Loaded,
}

pub struct AppState {
    pub library: Library,
    pub recommendations: Vec<Recommendation>,
    pub status: LibraryStatus,
    pub recommendation_count: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            library: Library::default(),
            recommendations: Vec::new(),
            status: LibraryStatus::default(),
            recommendation_count: recommend::MAX_RECOMMENDATIONS,
        }
    }
}

impl AppState {
    /// Replaces the library with a fresh selection. Returns true when a
    /// non-empty list was loaded.
    pub fn load_selection<R: Rng>(&mut self, files: Vec<PickedFile>, rng: &mut R) -> bool {
        self.library.retire();
        match intake::intake(files) {
            IntakeOutcome::NoVideos { .. } => {
                self.library = Library::default();
                self.recommendations.clear();
                self.status = LibraryStatus::NoSupportedFiles;
                false
            }
            IntakeOutcome::Loaded(groups) => {
                self.library = Library::from_groups(groups);
                self.status = LibraryStatus::Loaded;
                self.regenerate_recommendations(rng);
                true
            }
        }
    }

    pub fn scan_failed(&mut self, reason: impl Into<String>) {
        self.library.retire();
        self.library = Library::default();
        self.recommendations.clear();
        self.status = LibraryStatus::ScanFailed(reason.into());
    }

    /// Removes a row from the list (never the file) and rebuilds the
    /// recommendation panel from what is left.
    pub fn remove_entry<R: Rng>(&mut self, id: &EntryId, rng: &mut R) -> Option<VideoEntry> {
        let removed = self.library.remove(id)?;
        self.regenerate_recommendations(rng);
        Some(removed)
    }

    pub fn regenerate_recommendations<R: Rng>(&mut self, rng: &mut R) {
        self.recommendations =
            recommend::generate_recommendations(&self.library, self.recommendation_count, rng);
    }

    pub fn recommendation(&self, card: &recommend::CardId) -> Option<&Recommendation> {
        self.recommendations.iter().find(|r| r.card == *card)
    }

    /// Row a card should highlight: its own entry when still listed,
    /// otherwise the last row with the same name.
    pub fn resolve_card_row(&self, rec: &Recommendation) -> Option<EntryId> {
        if self.library.contains(&rec.entry) {
            return Some(rec.entry);
        }
        self.library.find_by_name(&rec.title)
    }
}
