use anyhow::Context;
use entities::video_progress;
use migration::MigratorTrait;
use sea_orm::{
    ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, QueryFilter,
    sea_query::OnConflict,
};

use super::ProgressRepo;
use crate::domain::{
    mapping::{map_model_to_progress, map_progress_to_active},
    models::Progress,
};

/// Connect and bring the schema up to date.
pub async fn open_database(connection_string: &str) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(connection_string.to_owned());
    if connection_string.contains(":memory:") {
        // every pooled connection would otherwise get its own empty database
        options.max_connections(1).min_connections(1);
    }
    let db = Database::connect(options)
        .await
        .with_context(|| "Failed to connect to database")?;

    migration::Migrator::up(&db, None)
        .await
        .with_context(|| "Failed to run database migrations")?;
    Ok(db)
}

#[derive(Clone, Debug)]
pub struct SeaOrmProgressRepo {
    db: DatabaseConnection,
}

impl SeaOrmProgressRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl ProgressRepo for SeaOrmProgressRepo {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get(&self, user_id: &str, video_id: &str) -> anyhow::Result<Option<Progress>> {
        let row = video_progress::Entity::find()
            .filter(video_progress::Column::UserId.eq(user_id))
            .filter(video_progress::Column::VideoId.eq(video_id))
            .one(&self.db)
            .await
            .context("Error loading video progress")?;
        row.map(map_model_to_progress).transpose()
    }

    #[tracing::instrument(level = "debug", skip(self, progress), fields(user_id = %progress.user_id, video_id = %progress.video_id))]
    async fn save(&self, progress: &Progress) -> anyhow::Result<()> {
        let active = map_progress_to_active(progress)?;
        video_progress::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    video_progress::Column::UserId,
                    video_progress::Column::VideoId,
                ])
                .update_columns([
                    video_progress::Column::ResumeTime,
                    video_progress::Column::Percent,
                    video_progress::Column::VideoDuration,
                    video_progress::Column::TotalWatchedTime,
                    video_progress::Column::Intervals,
                    video_progress::Column::LastUpdated,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("Error saving video progress")?;
        tracing::debug!(percent = progress.percent, "saved video progress");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::intervals::Interval;

    async fn repo() -> (SeaOrmProgressRepo, DatabaseConnection) {
        let db = open_database("sqlite::memory:").await.unwrap();
        (SeaOrmProgressRepo::new(db.clone()), db)
    }

    #[tokio::test]
    async fn missing_pair_is_none() {
        let (repo, _db) = repo().await;
        assert!(repo.get("nobody", "nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_get_round_trips_intervals() {
        let (repo, _db) = repo().await;
        let now = Utc::now();
        let mut p = Progress::empty("ravi123", "lecture1", now);
        p.record(4, 10, now);
        p.record(5, 10, now);
        repo.save(&p).await.unwrap();

        let loaded = repo.get("ravi123", "lecture1").await.unwrap().unwrap();
        assert_eq!(loaded.id, p.id);
        assert_eq!(loaded.intervals, vec![Interval::new(4, 6)]);
        assert_eq!(loaded.percent, 20);
        assert_eq!(loaded.total_watched_time, 2);
        assert_eq!(loaded.video_duration, Some(10));
    }

    #[tokio::test]
    async fn saving_the_same_pair_twice_keeps_one_row() {
        let (repo, db) = repo().await;
        let now = Utc::now();
        let mut first = Progress::empty("ravi123", "lecture1", now);
        first.record(0, 10, now);
        repo.save(&first).await.unwrap();

        // a second unsaved record for the same pair carries a different id
        let mut second = Progress::empty("ravi123", "lecture1", now);
        second.record(9, 10, now);
        repo.save(&second).await.unwrap();

        let rows = video_progress::Entity::find().all(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, first.id);
        assert_eq!(rows[0].resume_time, 9);
    }

    #[tokio::test]
    async fn pairs_are_independent() {
        let (repo, _db) = repo().await;
        let now = Utc::now();
        let mut a = Progress::empty("ravi123", "lecture1", now);
        a.record(1, 10, now);
        let mut b = Progress::empty("ravi123", "lecture2", now);
        b.record(2, 10, now);
        repo.save(&a).await.unwrap();
        repo.save(&b).await.unwrap();

        let loaded = repo.get("ravi123", "lecture2").await.unwrap().unwrap();
        assert_eq!(loaded.resume_time, 2);
    }
}
