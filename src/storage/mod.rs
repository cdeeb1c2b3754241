// Persistence of progress rows behind a trait so the API services stay storage-agnostic

mod sea_orm_repo;

pub use sea_orm_repo::{SeaOrmProgressRepo, open_database};

use crate::domain::models::Progress;

#[async_trait::async_trait]
pub trait ProgressRepo: Send + Sync {
    async fn get(&self, user_id: &str, video_id: &str) -> anyhow::Result<Option<Progress>>;
    /// Insert or replace the row for `(progress.user_id, progress.video_id)`.
    async fn save(&self, progress: &Progress) -> anyhow::Result<()>;
}
