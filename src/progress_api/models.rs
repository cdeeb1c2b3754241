use chrono::{DateTime, Utc};
use poem_openapi::{ApiResponse, Object, payload::Json};

use crate::domain::models::Progress;

/// Progress summary returned by both progress endpoints.
#[derive(Debug, Clone, Object)]
#[oai(rename_all = "camelCase")]
pub struct ProgressDto {
    /// Percent of the video watched, 0 - 100
    pub percent: i32,
    /// Seconds of distinct video content watched
    pub total_watched_time: i32,
    pub last_updated: DateTime<Utc>,
    /// Last reported playback position in seconds
    pub resume_time: i32,
}

impl ProgressDto {
    pub fn from_progress(progress: &Progress, percent: i32) -> Self {
        ProgressDto {
            percent,
            total_watched_time: progress.total_watched_time,
            last_updated: progress.last_updated,
            resume_time: progress.resume_time,
        }
    }
}

/// One playback sample reported by a player.
#[derive(Debug, Clone, Object)]
#[oai(rename_all = "camelCase")]
pub struct ProgressUpdateDto {
    pub user_id: Option<String>,
    pub video_id: Option<String>,
    /// Current playback position in whole seconds
    pub current_time: Option<i32>,
    /// Video length in whole seconds
    pub duration: Option<i32>,
    /// Client-side ISO-8601 time of the sample; informational only
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Object)]
pub struct ErrorDto {
    pub error: bool,
    /// Human-readable error message
    pub message: String,
}

impl From<String> for ErrorDto {
    fn from(message: String) -> Self {
        ErrorDto {
            error: true,
            message,
        }
    }
}

#[derive(ApiResponse)]
pub enum ProgressResponseDto {
    /// Current progress for the pair
    #[oai(status = 200)]
    Ok(Json<ProgressDto>),

    /// Invalid request or storage failure
    #[oai(status = 400)]
    BadRequest(Json<ErrorDto>),
}
