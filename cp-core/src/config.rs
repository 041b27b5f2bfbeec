/// What the point parser does with a line that is not two finite numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MalformedLinePolicy {
    /// Fail the whole load with [`crate::error::Error::MalformedPointLine`].
    #[default]
    Reject,
    /// Drop the line and keep the rest.
    Skip,
}

/// Playback and loading settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackConfig {
    /// Pause applied at every `Delay` event, in milliseconds.
    pub delay_ms: u64,
    pub malformed_lines: MalformedLinePolicy,
    /// Extra room above and below the points when sizing divider lines.
    pub y_margin: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1200,
            malformed_lines: MalformedLinePolicy::Reject,
            y_margin: 10.0,
        }
    }
}

impl PlaybackConfig {
    /// Same settings with no pacing, for collecting a whole run at once.
    pub fn instant() -> Self {
        Self {
            delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.delay_ms)
    }
}
