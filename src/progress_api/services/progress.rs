use chrono::Utc;
use poem_openapi::payload::Json;

use crate::{
    domain::models::Progress,
    progress_api::models::{ErrorDto, ProgressDto, ProgressResponseDto, ProgressUpdateDto},
    storage::ProgressRepo,
};

/// A sample that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSample {
    pub user_id: String,
    pub video_id: String,
    pub current_time: i32,
    pub duration: i32,
}

impl TryFrom<ProgressUpdateDto> for PlaybackSample {
    type Error = String;

    fn try_from(dto: ProgressUpdateDto) -> Result<Self, Self::Error> {
        let user_id = dto
            .user_id
            .filter(|s| !s.trim().is_empty())
            .ok_or("User ID is required")?;
        let video_id = dto
            .video_id
            .filter(|s| !s.trim().is_empty())
            .ok_or("Video ID is required")?;
        let current_time = dto.current_time.ok_or("Current time is required")?;
        if current_time < 0 {
            return Err("Current time must be non-negative".into());
        }
        let duration = dto.duration.ok_or("Duration is required")?;
        if duration < 1 {
            return Err("Duration must be positive".into());
        }
        Ok(PlaybackSample {
            user_id,
            video_id,
            current_time,
            duration,
        })
    }
}

pub struct ProgressService<'a> {
    pub repo: &'a dyn ProgressRepo,
}

impl<'a> ProgressService<'a> {
    pub fn new(repo: &'a dyn ProgressRepo) -> Self {
        Self { repo }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_progress(&self, user_id: &str, video_id: &str) -> ProgressResponseDto {
        tracing::info!(%user_id, %video_id, "getting progress");
        let loaded = self.repo.get(user_id, video_id).await;
        match loaded {
            Ok(Some(progress)) => ProgressResponseDto::Ok(Json(ProgressDto::from_progress(
                &progress,
                progress.current_percent(),
            ))),
            Ok(None) => {
                let progress = Progress::empty(user_id, video_id, Utc::now());
                ProgressResponseDto::Ok(Json(ProgressDto::from_progress(&progress, 0)))
            }
            Err(e) => {
                tracing::error!(error = ?e, "error getting progress");
                ProgressResponseDto::BadRequest(Json(ErrorDto::from(format!(
                    "Failed to get video progress: {e:#}"
                ))))
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self, update))]
    pub async fn update_progress(&self, update: ProgressUpdateDto) -> ProgressResponseDto {
        if let Some(ts) = update.timestamp.as_deref() {
            tracing::debug!(client_timestamp = %ts, "progress sample received");
        }
        let sample = match PlaybackSample::try_from(update) {
            Ok(sample) => sample,
            Err(message) => {
                tracing::warn!(%message, "rejected progress update");
                return ProgressResponseDto::BadRequest(Json(ErrorDto::from(format!(
                    "Failed to update video progress: {message}"
                ))));
            }
        };
        tracing::info!(
            user_id = %sample.user_id,
            video_id = %sample.video_id,
            current_time = sample.current_time,
            "updating progress"
        );
        match self.record_sample(&sample).await {
            Ok(progress) => ProgressResponseDto::Ok(Json(ProgressDto::from_progress(
                &progress,
                progress.current_percent(),
            ))),
            Err(e) => {
                tracing::error!(error = ?e, "error updating progress");
                ProgressResponseDto::BadRequest(Json(ErrorDto::from(format!(
                    "Failed to update video progress: {e:#}"
                ))))
            }
        }
    }

    async fn record_sample(&self, sample: &PlaybackSample) -> anyhow::Result<Progress> {
        let now = Utc::now();
        let mut progress = self
            .repo
            .get(&sample.user_id, &sample.video_id)
            .await?
            .unwrap_or_else(|| Progress::empty(&sample.user_id, &sample.video_id, now));
        progress.record(sample.current_time, sample.duration, now);
        self.repo.save(&progress).await?;
        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{SeaOrmProgressRepo, open_database};

    struct BrokenRepo;

    #[async_trait::async_trait]
    impl ProgressRepo for BrokenRepo {
        async fn get(&self, _: &str, _: &str) -> anyhow::Result<Option<Progress>> {
            anyhow::bail!("database is gone")
        }

        async fn save(&self, _: &Progress) -> anyhow::Result<()> {
            anyhow::bail!("database is gone")
        }
    }

    async fn sqlite_repo() -> SeaOrmProgressRepo {
        SeaOrmProgressRepo::new(open_database("sqlite::memory:").await.unwrap())
    }

    fn update(current_time: i32, duration: i32) -> ProgressUpdateDto {
        ProgressUpdateDto {
            user_id: Some("ravi123".into()),
            video_id: Some("lecture1".into()),
            current_time: Some(current_time),
            duration: Some(duration),
            timestamp: Some("2025-09-01T10:00:00.000Z".into()),
        }
    }

    fn ok(resp: ProgressResponseDto) -> ProgressDto {
        match resp {
            ProgressResponseDto::Ok(Json(dto)) => dto,
            ProgressResponseDto::BadRequest(Json(e)) => panic!("unexpected error: {}", e.message),
        }
    }

    fn bad_request(resp: ProgressResponseDto) -> ErrorDto {
        match resp {
            ProgressResponseDto::BadRequest(Json(e)) => e,
            ProgressResponseDto::Ok(_) => panic!("expected a 400"),
        }
    }

    #[test]
    fn validation_messages() {
        let mut dto = update(0, 10);
        dto.user_id = Some("  ".into());
        assert_eq!(PlaybackSample::try_from(dto).unwrap_err(), "User ID is required");

        let mut dto = update(0, 10);
        dto.video_id = None;
        assert_eq!(PlaybackSample::try_from(dto).unwrap_err(), "Video ID is required");

        let mut dto = update(0, 10);
        dto.current_time = None;
        assert_eq!(PlaybackSample::try_from(dto).unwrap_err(), "Current time is required");

        assert_eq!(
            PlaybackSample::try_from(update(-1, 10)).unwrap_err(),
            "Current time must be non-negative"
        );
        assert_eq!(
            PlaybackSample::try_from(update(0, 0)).unwrap_err(),
            "Duration must be positive"
        );
    }

    #[tokio::test]
    async fn unknown_pair_reads_as_zero() {
        let repo = sqlite_repo().await;
        let dto = ok(ProgressService::new(&repo).get_progress("ravi123", "lecture1").await);
        assert_eq!(dto.percent, 0);
        assert_eq!(dto.total_watched_time, 0);
        assert_eq!(dto.resume_time, 0);
    }

    #[tokio::test]
    async fn updates_accumulate_distinct_seconds() {
        let repo = sqlite_repo().await;
        let service = ProgressService::new(&repo);
        for t in [0, 1, 2, 2, 3] {
            ok(service.update_progress(update(t, 8)).await);
        }
        let after_update = ok(service.update_progress(update(6, 8)).await);
        assert_eq!(after_update.total_watched_time, 5);
        assert_eq!(after_update.percent, 62);
        assert_eq!(after_update.resume_time, 6);

        let read = ok(service.get_progress("ravi123", "lecture1").await);
        assert_eq!(read.percent, 62);
        assert_eq!(read.total_watched_time, 5);
        assert_eq!(read.resume_time, 6);
    }

    #[tokio::test]
    async fn invalid_update_is_rejected_without_writing() {
        let repo = sqlite_repo().await;
        let service = ProgressService::new(&repo);
        let err = bad_request(service.update_progress(update(3, 0)).await);
        assert!(err.error);
        assert_eq!(
            err.message,
            "Failed to update video progress: Duration must be positive"
        );
        assert!(repo.get("ravi123", "lecture1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn storage_failures_become_bad_requests() {
        let service = ProgressService::new(&BrokenRepo);
        let err = bad_request(service.get_progress("ravi123", "lecture1").await);
        assert!(err.message.starts_with("Failed to get video progress: "));
        assert!(err.message.contains("database is gone"));

        let err = bad_request(service.update_progress(update(1, 10)).await);
        assert!(err.message.starts_with("Failed to update video progress: "));
    }

    #[tokio::test]
    async fn corrupt_stored_intervals_fail_both_endpoints() {
        use entities::video_progress;
        use sea_orm::{ActiveValue::Set, EntityTrait};

        let db = open_database("sqlite::memory:").await.unwrap();
        let row = video_progress::ActiveModel {
            id: Set(uuid::Uuid::now_v7()),
            user_id: Set("ravi123".into()),
            video_id: Set("lecture1".into()),
            resume_time: Set(4),
            percent: Set(40),
            video_duration: Set(Some(10)),
            total_watched_time: Set(4),
            intervals: Set("[[0, 4".into()),
            last_updated: Set(Utc::now()),
        };
        video_progress::Entity::insert(row)
            .exec_without_returning(&db)
            .await
            .unwrap();

        let repo = SeaOrmProgressRepo::new(db.clone());
        let service = ProgressService::new(&repo);

        let err = bad_request(service.get_progress("ravi123", "lecture1").await);
        assert!(err.error);
        assert!(
            err.message.starts_with("Failed to get video progress: "),
            "{}",
            err.message
        );

        let err = bad_request(service.update_progress(update(5, 10)).await);
        assert!(
            err.message.starts_with("Failed to update video progress: "),
            "{}",
            err.message
        );

        // the bad row is left as it was
        let stored = video_progress::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(stored.intervals, "[[0, 4");
        assert_eq!(stored.resume_time, 4);
    }
}
