use std::path::PathBuf;

use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use vidshelf_media::thumbnail::{ThumbnailSize, ThumbnailSource};
use vidshelf_state::entry::{EntryId, VideoEntry};
use vidshelf_state::recommend::Recommendation;
use vidshelf_state::thumbnail::{Liveness, ThumbnailTarget};

use crate::config::AppConfig;
use crate::workers::thumbnail_worker::ThumbnailRequest;
use crate::VidshelfApp;

impl VidshelfApp {
    pub fn open_folder(&mut self, path: PathBuf) {
        tracing::info!(path = %path.display(), "opening folder");
        self.textures.clear_thumbnails();
        self.retire_cards();

        let files = match vidshelf_media::import::scan_folder(&path) {
            Ok(files) => files,
            Err(e) => {
                tracing::error!("{e}");
                self.state.scan_failed(e.to_string());
                return;
            }
        };
        let scanned = files.len();

        if !self.state.load_selection(files, &mut self.rng) {
            tracing::info!(scanned, "no supported video files");
            return;
        }
        tracing::info!(
            scanned,
            videos = self.state.library.len(),
            folders = self.state.library.groups().len(),
            "library loaded"
        );

        self.request_row_thumbnails();
        self.request_card_thumbnails();
    }

    pub fn confirm_and_delete(&mut self, id: EntryId) {
        let Some(entry) = self.state.library.entry(&id) else {
            return;
        };
        let answer = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title("Remove video")
            .set_description(format!(
                "Remove \"{}\" from the list? The file stays on disk.",
                entry.name
            ))
            .set_buttons(MessageButtons::YesNo)
            .show();
        if answer != MessageDialogResult::Yes {
            return;
        }
        self.delete_entry(id);
    }

    pub fn delete_entry(&mut self, id: EntryId) {
        let Some(removed) = self.state.remove_entry(&id, &mut self.rng) else {
            return;
        };
        tracing::info!(name = %removed.name, "removed from list");
        self.textures.forget(&ThumbnailTarget::Row(id));
        self.playback.forget_row(&id);

        self.retire_cards();
        self.request_card_thumbnails();
    }

    fn request_row_thumbnails(&mut self) {
        let requests: Vec<ThumbnailRequest> = self
            .state
            .library
            .visible_entries()
            .into_iter()
            .filter_map(|entry| {
                let liveness = self.state.library.liveness(&entry.id)?.clone();
                Some(row_request(entry, liveness, &self.config))
            })
            .collect();

        for req in requests {
            self.submit(req);
        }
    }

    fn request_card_thumbnails(&mut self) {
        let requests: Vec<ThumbnailRequest> = self
            .state
            .recommendations
            .iter()
            .map(|rec| {
                let liveness = Liveness::new();
                self.card_liveness.insert(rec.card, liveness.clone());
                card_request(rec, liveness)
            })
            .collect();

        for req in requests {
            self.submit(req);
        }
    }

    fn retire_cards(&mut self) {
        for (card, liveness) in self.card_liveness.drain() {
            liveness.kill();
            self.textures.forget(&ThumbnailTarget::Card(card));
        }
    }

    fn submit(&mut self, req: ThumbnailRequest) {
        let target = req.target;
        if self.thumbnails.req_tx.send(req).is_err() {
            tracing::warn!("thumbnail workers are gone, keeping placeholder");
            return;
        }
        self.textures.mark_pending(target);
    }
}

/// List rows above the deferral threshold wait so smaller files go first.
pub(crate) fn row_request(
    entry: &VideoEntry,
    liveness: Liveness,
    config: &AppConfig,
) -> ThumbnailRequest {
    let deferred = entry.size > config.defer_threshold_bytes();
    ThumbnailRequest {
        target: ThumbnailTarget::Row(entry.id),
        source: ThumbnailSource {
            name: entry.name.clone(),
            path: entry.path.clone(),
            byte_size: entry.size,
        },
        size: ThumbnailSize::LIST_ROW,
        liveness,
        defer: deferred.then(|| config.defer_delay()),
    }
}

pub(crate) fn card_request(rec: &Recommendation, liveness: Liveness) -> ThumbnailRequest {
    ThumbnailRequest {
        target: ThumbnailTarget::Card(rec.card),
        source: ThumbnailSource {
            name: rec.title.clone(),
            path: rec.path.clone(),
            byte_size: rec.size,
        },
        size: ThumbnailSize::CARD,
        liveness,
        defer: None,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use vidshelf_media::thumbnail::MIB;
    use vidshelf_state::entry::EntryId;
    use vidshelf_state::recommend::{CardId, SimulatedDuration};

    use super::*;

    fn entry(size: u64) -> VideoEntry {
        VideoEntry {
            id: EntryId::new(),
            name: "clip.mp4".into(),
            size,
            relative_path: "videos/clip.mp4".into(),
            path: PathBuf::from("/videos/clip.mp4"),
        }
    }

    #[test]
    fn rows_at_the_threshold_are_not_deferred() {
        let config = AppConfig::default();
        let req = row_request(&entry(50 * MIB), Liveness::new(), &config);
        assert!(req.defer.is_none());
        assert_eq!(req.size, ThumbnailSize::LIST_ROW);
        assert_eq!(req.source.byte_size, 50 * MIB);
    }

    #[test]
    fn rows_above_the_threshold_wait_100ms() {
        let config = AppConfig::default();
        let row = entry(50 * MIB + 1);
        let req = row_request(&row, Liveness::new(), &config);
        assert_eq!(req.defer, Some(Duration::from_millis(100)));
        assert_eq!(req.target, ThumbnailTarget::Row(row.id));
    }

    #[test]
    fn threshold_and_delay_follow_config() {
        let config = AppConfig {
            defer_threshold_mib: 1,
            defer_delay_ms: 250,
            ..AppConfig::default()
        };
        let req = row_request(&entry(2 * MIB), Liveness::new(), &config);
        assert_eq!(req.defer, Some(Duration::from_millis(250)));
    }

    #[test]
    fn cards_are_never_deferred() {
        let rec = Recommendation {
            card: CardId::new(),
            entry: EntryId::new(),
            title: "huge.mkv".into(),
            path: PathBuf::from("/videos/huge.mkv"),
            size: 90 * MIB,
            duration: SimulatedDuration {
                minutes: 3,
                seconds: 7,
            },
            views: 42,
        };
        let req = card_request(&rec, Liveness::new());
        assert!(req.defer.is_none());
        assert_eq!(req.size, ThumbnailSize::CARD);
        assert_eq!(req.target, ThumbnailTarget::Card(rec.card));
    }
}
