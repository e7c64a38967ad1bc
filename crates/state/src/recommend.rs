use std::fmt;
use std::path::PathBuf;

use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::entry::EntryId;
use crate::library::Library;

pub const MAX_RECOMMENDATIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardId(Uuid);

impl CardId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

/// Cosmetic play length shown on a card. Not read from the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedDuration {
    pub minutes: u8,
    pub seconds: u8,
}

impl fmt::Display for SimulatedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub card: CardId,
    pub entry: EntryId,
    pub title: String,
    pub path: PathBuf,
    pub size: u64,
    pub duration: SimulatedDuration,
    pub views: u32,
}

impl Recommendation {
    pub fn meta_line(&self) -> String {
        format!("Local video \u{2022} {} views", self.views)
    }
}

/// Uniformly samples up to `count` visible entries and dresses them up
/// as cards.
pub fn generate_recommendations<R: Rng>(
    library: &Library,
    count: usize,
    rng: &mut R,
) -> Vec<Recommendation> {
    let mut pool = library.visible_entries();
    pool.shuffle(rng);
    pool.truncate(count);

    pool.into_iter()
        .map(|entry| Recommendation {
            card: CardId::new(),
            entry: entry.id,
            title: entry.name.clone(),
            path: entry.path.clone(),
            size: entry.size,
            duration: SimulatedDuration {
                minutes: rng.gen_range(0..60),
                seconds: rng.gen_range(0..60),
            },
            views: rng.gen_range(0..1000),
        })
        .collect()
}
