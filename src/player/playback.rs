// Headless stand-in for a video element: a clock that advances the playback
// position and fires time-update events into the session.

use std::{future::Future, time::Duration};

use tokio::time::{Instant, MissedTickBehavior};

use super::{
    format::{format_date, format_time},
    session::{MediaPosition, PlayerSession},
};

/// Typical browser `timeupdate` cadence.
pub const TIME_UPDATE_PERIOD: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    /// Waiting for data; the position does not move
    Stalled,
    Ended,
}

#[derive(Debug, Clone, PartialEq)]
struct Stall {
    at: f64,
    remaining: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedPlayback {
    position: f64,
    duration: f64,
    speed: f64,
    stall: Option<Stall>,
}

impl SimulatedPlayback {
    pub fn new(duration: f64, start: f64, speed: f64) -> Self {
        let duration = duration.max(0.0);
        Self {
            position: start.clamp(0.0, duration),
            duration,
            speed,
            stall: None,
        }
    }

    /// Pretend the network stalls for `length` once the position reaches `at`.
    pub fn with_stall(mut self, at: f64, length: Duration) -> Self {
        self.stall = Some(Stall {
            at,
            remaining: length,
        });
        self
    }

    pub fn position(&self) -> MediaPosition {
        MediaPosition {
            current_time: self.position,
            duration: self.duration,
        }
    }

    /// Move forward by `elapsed` wall-clock time scaled by the playback speed.
    pub fn advance(&mut self, elapsed: Duration) -> PlaybackStatus {
        let mut elapsed = elapsed;
        if let Some(mut stall) = self.stall.take() {
            if self.position >= stall.at {
                if elapsed < stall.remaining {
                    stall.remaining -= elapsed;
                    self.stall = Some(stall);
                    return PlaybackStatus::Stalled;
                }
                // stall over, the rest of the tick plays
                elapsed -= stall.remaining;
            } else {
                let reach = self.position + elapsed.as_secs_f64() * self.speed;
                if reach >= stall.at {
                    self.position = stall.at.min(self.duration);
                    self.stall = Some(stall);
                    return self.status();
                }
                self.stall = Some(stall);
            }
        }
        self.position = (self.position + elapsed.as_secs_f64() * self.speed).min(self.duration);
        self.status()
    }

    fn status(&self) -> PlaybackStatus {
        if self.is_ended() {
            PlaybackStatus::Ended
        } else {
            PlaybackStatus::Playing
        }
    }

    pub fn is_ended(&self) -> bool {
        self.position >= self.duration
    }
}

fn log_display_state(session: &PlayerSession) {
    let state = session.state();
    tracing::info!(
        percent = state.percent,
        current = %format_time(state.current_time as f64),
        duration = %format_time(state.duration as f64),
        total_watched = %format_time(state.total_watched_time),
        last_updated = %format_date(state.last_updated),
        buffering = state.buffering,
        "progress"
    );
}

/// Play until the end of the video or until `shutdown` resolves.
pub async fn run_playback<F>(
    session: &mut PlayerSession,
    playback: &mut SimulatedPlayback,
    shutdown: F,
) where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(TIME_UPDATE_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick: Instant = ticker.tick().await;
    session.on_playing();
    tracing::info!(position = playback.position().current_time, "playback started");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!(position = playback.position().current_time, "playback stopped");
                break;
            }
            now = ticker.tick() => {
                let status = playback.advance(now.saturating_duration_since(last_tick));
                last_tick = now;
                let buffering = session.state().buffering;
                match status {
                    PlaybackStatus::Stalled => {
                        if !buffering {
                            tracing::info!(position = playback.position().current_time, "buffering");
                            session.on_waiting();
                        }
                        continue;
                    }
                    PlaybackStatus::Playing | PlaybackStatus::Ended if buffering => {
                        session.on_playing();
                    }
                    _ => {}
                }
                // a slow backend must not hold off shutdown
                tokio::select! {
                    _ = &mut shutdown => {
                        tracing::info!(position = playback.position().current_time, "playback stopped during update");
                        break;
                    }
                    accepted = session.on_time_update_at(playback.position(), now) => {
                        if accepted {
                            log_display_state(session);
                        }
                    }
                }
                if status == PlaybackStatus::Ended {
                    tracing::info!("playback reached the end");
                    break;
                }
            }
        }
    }
}
