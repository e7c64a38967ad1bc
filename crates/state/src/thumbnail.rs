use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::entry::EntryId;
use crate::recommend::CardId;

/// The on-screen slot a thumbnail is produced for. Rows and cards are
/// cached independently even when they show the same file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThumbnailTarget {
    Row(EntryId),
    Card(CardId),
}

/// Shared flag cleared when the slot a background job writes to goes away.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn kill(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}
