use std::path::PathBuf;

use vidshelf_media::lease::{LeaseRegistry, MediaLease};
use vidshelf_media::pipeline::DecodedFrame;
use vidshelf_media::player::{PlayerEvent, VideoPlayer};
use vidshelf_state::entry::EntryId;
use vidshelf_state::playback::PlaybackState;

/// What to play, and which row (if any) to highlight while it plays.
#[derive(Debug, Clone)]
pub struct PlayRequest {
    pub row: Option<EntryId>,
    pub name: String,
    pub path: PathBuf,
}

/// Sole owner of the visible player, its lease and the active row.
pub struct PlaybackController<P: VideoPlayer> {
    player: P,
    leases: LeaseRegistry,
    active_lease: Option<MediaLease>,
    active_row: Option<EntryId>,
    now_playing: Option<String>,
    state: PlaybackState,
}

impl<P: VideoPlayer> PlaybackController<P> {
    pub fn new(player: P, leases: LeaseRegistry) -> Self {
        Self {
            player,
            leases,
            active_lease: None,
            active_row: None,
            now_playing: None,
            state: PlaybackState::Idle,
        }
    }

    pub fn active_row(&self) -> Option<EntryId> {
        self.active_row
    }

    pub fn now_playing(&self) -> Option<&str> {
        self.now_playing.as_deref()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn has_live_source(&self) -> bool {
        self.active_lease.is_some()
    }

    #[cfg(test)]
    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn select(&mut self, request: PlayRequest) {
        self.player.detach_handlers();
        self.player.pause();
        self.release_active();

        let lease = self.leases.mint(&request.path);
        self.active_row = request.row;
        self.now_playing = Some(request.name.clone());

        if let Err(e) = self.player.set_source(&lease) {
            tracing::warn!(name = %request.name, "could not open video: {e}");
            self.player.stop();
            lease.release();
            self.state = PlaybackState::Idle;
            return;
        }

        match self.player.play() {
            Ok(()) => {
                tracing::info!(name = %request.name, "playing");
                self.active_lease = Some(lease);
                self.state = PlaybackState::Playing;
            }
            Err(e) => {
                tracing::warn!(name = %request.name, "playback did not start: {e}");
                self.player.stop();
                lease.release();
                self.state = PlaybackState::Idle;
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            PlaybackState::Playing => {
                self.player.pause();
                self.state = self.state.toggled();
            }
            PlaybackState::Paused => match self.player.play() {
                Ok(()) => self.state = self.state.toggled(),
                Err(e) => {
                    tracing::warn!("playback did not resume: {e}");
                    self.player.stop();
                    self.release_active();
                    self.state = PlaybackState::Idle;
                }
            },
            PlaybackState::Idle => {}
        }
    }

    pub fn stop(&mut self) {
        self.player.stop();
        self.release_active();
        self.active_row = None;
        self.state = PlaybackState::Idle;
    }

    pub fn poll(&mut self) {
        for event in self.player.poll_events() {
            self.handle_event(event);
        }
    }

    pub fn latest_frame(&mut self) -> Option<DecodedFrame> {
        self.player.latest_frame()
    }

    fn handle_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::MetadataLoaded {
                duration,
                resolution,
            } => {
                tracing::info!(
                    name = self.now_playing.as_deref().unwrap_or_default(),
                    ?duration,
                    ?resolution,
                    "video metadata loaded"
                );
            }
            PlayerEvent::Ended => {
                tracing::debug!("playback ended");
                self.release_active();
                self.active_row = None;
                self.state = PlaybackState::Idle;
            }
            PlayerEvent::Error(message) => {
                tracing::warn!("player error: {message}");
                self.player.stop();
                self.release_active();
                self.state = PlaybackState::Idle;
            }
        }
    }

    /// Called when the row being played disappears from the list.
    pub fn forget_row(&mut self, row: &EntryId) {
        if self.active_row.as_ref() == Some(row) {
            self.active_row = None;
        }
    }

    /// Releases whatever is still live. Run before the window goes away.
    pub fn shutdown(&mut self) {
        self.player.stop();
        self.release_active();
        self.state = PlaybackState::Idle;
    }

    fn release_active(&mut self) {
        if let Some(lease) = self.active_lease.take() {
            lease.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use vidshelf_media::error::PlayerError;

    use super::*;

    /// Records calls and checks the live lease count whenever a source is
    /// bound.
    struct FakePlayer {
        leases: LeaseRegistry,
        live_at_bind: Vec<u64>,
        bound: Vec<String>,
        reject_play: bool,
        events: VecDeque<PlayerEvent>,
        pauses: u32,
        stops: u32,
        detaches: u32,
    }

    impl FakePlayer {
        fn new(leases: LeaseRegistry) -> Self {
            Self {
                leases,
                live_at_bind: Vec::new(),
                bound: Vec::new(),
                reject_play: false,
                events: VecDeque::new(),
                pauses: 0,
                stops: 0,
                detaches: 0,
            }
        }
    }

    impl VideoPlayer for FakePlayer {
        fn detach_handlers(&mut self) {
            self.detaches += 1;
            self.events.clear();
        }

        fn pause(&mut self) {
            self.pauses += 1;
        }

        fn set_source(&mut self, lease: &MediaLease) -> Result<(), PlayerError> {
            self.live_at_bind.push(self.leases.live());
            self.bound.push(lease.uri().to_string());
            Ok(())
        }

        fn play(&mut self) -> Result<(), PlayerError> {
            if self.reject_play {
                Err(PlayerError::Rejected("autoplay blocked".into()))
            } else {
                Ok(())
            }
        }

        fn stop(&mut self) {
            self.stops += 1;
        }

        fn poll_events(&mut self) -> Vec<PlayerEvent> {
            self.events.drain(..).collect()
        }

        fn latest_frame(&mut self) -> Option<DecodedFrame> {
            None
        }
    }

    fn controller() -> (PlaybackController<FakePlayer>, LeaseRegistry) {
        let leases = LeaseRegistry::new();
        let player = FakePlayer::new(leases.clone());
        (PlaybackController::new(player, leases.clone()), leases)
    }

    fn request(name: &str) -> (EntryId, PlayRequest) {
        let id = EntryId::new();
        (
            id,
            PlayRequest {
                row: Some(id),
                name: name.into(),
                path: PathBuf::from(format!("/videos/{name}")),
            },
        )
    }

    fn push_event(ctrl: &mut PlaybackController<FakePlayer>, event: PlayerEvent) {
        ctrl.player.events.push_back(event);
    }

    #[test]
    fn switching_videos_keeps_a_single_live_lease() {
        let (mut ctrl, leases) = controller();
        let (a, req_a) = request("a.mp4");
        let (b, req_b) = request("b.mp4");

        ctrl.select(req_a);
        assert_eq!(leases.live(), 1);
        assert_eq!(ctrl.active_row(), Some(a));

        ctrl.select(req_b);
        assert_eq!(leases.live(), 1);
        assert_eq!(ctrl.active_row(), Some(b));
        assert_eq!(ctrl.player().live_at_bind, vec![1, 1]);
        assert_eq!(leases.released(), 1);
        assert_eq!(ctrl.player().detaches, 2);
        assert_eq!(ctrl.player().pauses, 2);
    }

    #[test]
    fn rejected_play_releases_the_new_lease() {
        let (mut ctrl, leases) = controller();
        ctrl.player.reject_play = true;
        let (a, req) = request("a.mp4");

        ctrl.select(req);

        assert_eq!(leases.live(), 0);
        assert_eq!(leases.minted(), 1);
        assert_eq!(ctrl.state(), PlaybackState::Idle);
        assert_eq!(ctrl.active_row(), Some(a));
        assert_eq!(ctrl.player().stops, 1);
    }

    #[test]
    fn end_of_playback_releases_and_clears_highlight() {
        let (mut ctrl, leases) = controller();
        let (_, req) = request("a.mp4");
        ctrl.select(req);

        push_event(&mut ctrl, PlayerEvent::Ended);
        ctrl.poll();

        assert_eq!(leases.live(), 0);
        assert_eq!(ctrl.active_row(), None);
        assert_eq!(ctrl.state(), PlaybackState::Idle);
    }

    #[test]
    fn player_error_releases_but_keeps_highlight() {
        let (mut ctrl, leases) = controller();
        let (a, req) = request("a.mp4");
        ctrl.select(req);

        push_event(&mut ctrl, PlayerEvent::Error("decoder missing".into()));
        ctrl.poll();

        assert_eq!(leases.live(), 0);
        assert_eq!(ctrl.active_row(), Some(a));
        assert!(!ctrl.has_live_source());
    }

    #[test]
    fn stale_events_are_dropped_on_reselect() {
        let (mut ctrl, leases) = controller();
        let (_, req_a) = request("a.mp4");
        let (b, req_b) = request("b.mp4");
        ctrl.select(req_a);
        push_event(&mut ctrl, PlayerEvent::Ended);

        ctrl.select(req_b);
        ctrl.poll();

        assert_eq!(ctrl.active_row(), Some(b));
        assert_eq!(leases.live(), 1);
    }

    #[test]
    fn shutdown_releases_the_active_lease() {
        let (mut ctrl, leases) = controller();
        let (_, req) = request("a.mp4");
        ctrl.select(req);
        ctrl.shutdown();
        assert_eq!(leases.live(), 0);
        assert_eq!(leases.released(), 1);

        ctrl.shutdown();
        assert_eq!(leases.released(), 1);
    }

    #[test]
    fn pause_and_resume_keep_the_lease() {
        let (mut ctrl, leases) = controller();
        let (_, req) = request("a.mp4");
        ctrl.select(req);

        ctrl.toggle_pause();
        assert_eq!(ctrl.state(), PlaybackState::Paused);
        assert_eq!(leases.live(), 1);

        ctrl.toggle_pause();
        assert_eq!(ctrl.state(), PlaybackState::Playing);

        ctrl.stop();
        assert_eq!(leases.live(), 0);
        assert_eq!(ctrl.active_row(), None);
    }

    #[test]
    fn playing_without_a_row_highlights_nothing() {
        let (mut ctrl, leases) = controller();
        ctrl.select(PlayRequest {
            row: None,
            name: "loose.mp4".into(),
            path: PathBuf::from("/videos/loose.mp4"),
        });
        assert_eq!(ctrl.active_row(), None);
        assert_eq!(leases.live(), 1);
        assert!(ctrl.player().bound[0].ends_with("loose.mp4"));
    }
}
