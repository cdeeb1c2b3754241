use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use super::throttle::Throttle;
use crate::progress_client::{ProgressClient, ProgressPayload, ProgressUpdate};

pub const USER_ID: &str = "ravi123";
pub const VIDEO_ID: &str = "lecture1";

/// Minimum spacing between accepted time-update events.
pub const UPDATE_THROTTLE: Duration = Duration::from_millis(1000);

const MEDIA_ERROR_MESSAGE: &str = "Error loading video. Please try again.";

/// Everything the player shows besides the video itself.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub loading: bool,
    pub buffering: bool,
    /// Error banner
    pub error: Option<String>,
    pub percent: f64,
    /// Seconds, as reported by the server
    pub total_watched_time: f64,
    /// Seconds, truncated
    pub current_time: i64,
    /// Seconds, truncated
    pub duration: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for DisplayState {
    fn default() -> Self {
        DisplayState {
            loading: true,
            buffering: false,
            error: None,
            percent: 0.0,
            total_watched_time: 0.0,
            current_time: 0,
            duration: 0,
            last_updated: None,
        }
    }
}

/// Playback position as the media element reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaPosition {
    pub current_time: f64,
    pub duration: f64,
}

/// Whole seconds towards zero; NaN (unknown duration) becomes 0.
fn truncate_seconds(value: f64) -> i64 {
    value.trunc() as i64
}

/// Mirrors the server's progress record for the fixed user/video pair and reports
/// playback position back to it.
pub struct PlayerSession {
    client: ProgressClient,
    throttle: Throttle,
    state: DisplayState,
}

impl PlayerSession {
    pub fn new(client: ProgressClient) -> Self {
        Self {
            client,
            throttle: Throttle::new(UPDATE_THROTTLE),
            state: DisplayState::default(),
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Initial read of stored progress. Failures end up in the error banner.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn load_progress(&mut self) {
        self.state.loading = true;
        match self.client.get_progress(USER_ID, VIDEO_ID).await {
            Ok(Some(payload)) => self.apply(payload),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "error loading progress");
                self.state.error = Some(e.user_message());
            }
        }
        self.state.loading = false;
    }

    /// Handle a time-update event observed at `now`. Returns whether it passed the
    /// throttle. Update failures are logged and otherwise ignored.
    #[tracing::instrument(level = "debug", skip(self, now))]
    pub async fn on_time_update_at(&mut self, position: MediaPosition, now: Instant) -> bool {
        if !self.throttle.try_accept(now) {
            return false;
        }

        let current_time = truncate_seconds(position.current_time);
        let duration = truncate_seconds(position.duration);
        self.state.current_time = current_time;
        self.state.duration = duration;

        let update = ProgressUpdate::new(USER_ID, VIDEO_ID, current_time, duration, Utc::now());
        match self.client.update_progress(&update).await {
            Ok(Some(payload)) => self.apply(payload),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, current_time, "error updating progress"),
        }
        true
    }

    pub fn on_waiting(&mut self) {
        self.state.buffering = true;
    }

    pub fn on_playing(&mut self) {
        self.state.buffering = false;
    }

    pub fn on_media_error(&mut self) {
        self.state.error = Some(MEDIA_ERROR_MESSAGE.to_string());
        self.state.loading = false;
    }

    fn apply(&mut self, payload: ProgressPayload) {
        self.state.percent = payload.percent.unwrap_or(0.0);
        self.state.total_watched_time = payload.total_watched_time.unwrap_or(0.0);
        self.state.last_updated = payload.last_updated;
    }
}
