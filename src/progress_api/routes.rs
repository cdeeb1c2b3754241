use std::sync::Arc;

use poem_openapi::{OpenApi, param::Query, payload::Json};

use super::models::{ProgressResponseDto, ProgressUpdateDto};
use super::services::progress::ProgressService;
use crate::storage::ProgressRepo;

pub struct ProgressApi {
    pub repo: Arc<dyn ProgressRepo>,
}

#[OpenApi]
impl ProgressApi {
    /// Stored progress of a user on a video
    #[oai(path = "/api/progress", method = "get")]
    #[tracing::instrument(level = "debug", skip(self, user_id, video_id))]
    async fn get_progress(
        &self,
        #[oai(name = "userId")] Query(user_id): Query<String>,
        #[oai(name = "videoId")] Query(video_id): Query<String>,
    ) -> ProgressResponseDto {
        ProgressService::new(self.repo.as_ref())
            .get_progress(&user_id, &video_id)
            .await
    }

    /// Record the current playback position of a user on a video
    #[oai(path = "/api/progress/update", method = "post")]
    #[tracing::instrument(level = "debug", skip(self, body))]
    async fn update_progress(&self, body: Json<ProgressUpdateDto>) -> ProgressResponseDto {
        ProgressService::new(self.repo.as_ref())
            .update_progress(body.0)
            .await
    }
}
