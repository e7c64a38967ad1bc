/// Transport state of the visible player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn is_active(self) -> bool {
        !matches!(self, PlaybackState::Idle)
    }

    pub fn toggled(self) -> Self {
        match self {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Playing,
            PlaybackState::Idle => PlaybackState::Idle,
        }
    }
}
