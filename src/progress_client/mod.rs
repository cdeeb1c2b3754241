// Client for the progress-tracking endpoints

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PROGRESS_PATH: &str = "/api/progress";
pub const UPDATE_PROGRESS_PATH: &str = "/api/progress/update";

/// Upper bound for a single request, connect included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const LOAD_FAILED_MESSAGE: &str = "An error occurred while loading progress.";
const NO_RESPONSE_MESSAGE: &str =
    "Could not connect to the server. Please check if the backend is running.";

/// Why a progress request failed, split the way the player reports it.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// The server answered with a non-success status
    #[error("server responded with {status}")]
    Http {
        status: StatusCode,
        message: Option<String>,
    },
    /// The request never got a response (refused, unreachable, timed out)
    #[error("no response from progress server")]
    NoResponse(#[source] reqwest::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProgressError {
    /// Banner text shown to the viewer.
    pub fn user_message(&self) -> String {
        match self {
            ProgressError::Http { status, message } => {
                let mut text = format!("Server error: {}", status.as_u16());
                if let Some(message) = message.as_deref().filter(|m| !m.is_empty()) {
                    text.push_str(" - ");
                    text.push_str(message);
                }
                text
            }
            ProgressError::NoResponse(_) => NO_RESPONSE_MESSAGE.to_string(),
            ProgressError::Other(_) => LOAD_FAILED_MESSAGE.to_string(),
        }
    }

    fn from_send(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            ProgressError::NoResponse(err)
        } else {
            ProgressError::Other(err.into())
        }
    }
}

/// Progress record as returned by the server. Every field may be missing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProgressPayload {
    pub percent: Option<f64>,
    pub total_watched_time: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ProgressPayload {
    /// Read each field on its own; a missing or mistyped field is left empty.
    pub fn from_value(value: &Value) -> Self {
        let number = |key: &str| value.get(key).and_then(Value::as_f64);
        ProgressPayload {
            percent: number("percent"),
            total_watched_time: number("totalWatchedTime"),
            last_updated: value
                .get("lastUpdated")
                .cloned()
                .and_then(|v| de::opt_datetime_from_str_or_millis(v).ok().flatten()),
        }
    }
}

/// Body of `POST /api/progress/update`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate<'a> {
    pub user_id: &'a str,
    pub video_id: &'a str,
    pub current_time: i64,
    pub duration: i64,
    /// ISO-8601 with millisecond precision, e.g. `2025-09-01T10:00:00.000Z`
    pub timestamp: String,
}

impl<'a> ProgressUpdate<'a> {
    pub fn new(
        user_id: &'a str,
        video_id: &'a str,
        current_time: i64,
        duration: i64,
        at: DateTime<Utc>,
    ) -> Self {
        ProgressUpdate {
            user_id,
            video_id,
            current_time,
            duration,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ProgressClient {
    base_url: String,
    client: reqwest::Client,
}

impl ProgressClient {
    /// Create a new client for the given origin (e.g. "http://localhost:9983").
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base_url_str = base_url.into();
        tracing::debug!(base_url = %base_url_str, "creating ProgressClient");
        Ok(ProgressClient {
            base_url: base_url_str.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// GET /api/progress?userId=..&videoId=..
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_progress(
        &self,
        user_id: &str,
        video_id: &str,
    ) -> Result<Option<ProgressPayload>, ProgressError> {
        let url = self.url(PROGRESS_PATH);
        tracing::debug!(%url, "GET progress");
        let resp = self
            .client
            .get(&url)
            .query(&[("userId", user_id), ("videoId", video_id)])
            .send()
            .await
            .map_err(ProgressError::from_send)?;
        Self::read_payload(resp).await
    }

    /// POST /api/progress/update
    #[tracing::instrument(level = "debug", skip(self, update), fields(current_time = update.current_time))]
    pub async fn update_progress(
        &self,
        update: &ProgressUpdate<'_>,
    ) -> Result<Option<ProgressPayload>, ProgressError> {
        let url = self.url(UPDATE_PROGRESS_PATH);
        tracing::debug!(%url, "POST progress update");
        let resp = self
            .client
            .post(&url)
            .json(update)
            .send()
            .await
            .map_err(ProgressError::from_send)?;
        Self::read_payload(resp).await
    }

    /// `None` when the server answered with an empty or `null` body. Any other
    /// successful body yields a payload, with unreadable fields left empty.
    async fn read_payload(
        resp: reqwest::Response,
    ) -> Result<Option<ProgressPayload>, ProgressError> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ProgressError::Other(e.into()))?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message);
            return Err(ProgressError::Http { status, message });
        }
        if body.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(ProgressPayload::from_value(&value))),
            Err(e) => {
                let snippet_len = body.len().min(500);
                let snippet = body.get(..snippet_len).unwrap_or_default();
                tracing::warn!(error = %e, body_snippet = %snippet, "progress payload is not JSON");
                Ok(Some(ProgressPayload::default()))
            }
        }
    }
}

/// Internal serde helpers
pub mod de {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    /// Accept a timestamp as an RFC 3339 string or as epoch milliseconds; null/"" -> None.
    pub fn opt_datetime_from_str_or_millis<'de, D>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum MillisOrStr {
            Millis(i64),
            Str(String),
        }

        let val: Option<MillisOrStr> = Option::deserialize(deserializer)?;
        Ok(match val {
            None => None,
            Some(MillisOrStr::Millis(ms)) => DateTime::from_timestamp_millis(ms),
            Some(MillisOrStr::Str(s)) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        })
    }
}
