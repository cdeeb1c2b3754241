use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

const IDX_USER_VIDEO: &str = "idx_user_video";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VideoProgress::Table)
                    .if_not_exists()
                    .col(uuid(VideoProgress::Id).primary_key())
                    .col(string(VideoProgress::UserId))
                    .col(string(VideoProgress::VideoId))
                    .col(integer(VideoProgress::ResumeTime).default(0))
                    .col(integer(VideoProgress::Percent).default(0))
                    .col(integer_null(VideoProgress::VideoDuration))
                    .col(integer(VideoProgress::TotalWatchedTime).default(0))
                    .col(text(VideoProgress::Intervals))
                    .col(timestamp_with_time_zone(VideoProgress::LastUpdated))
                    .to_owned(),
            )
            .await?;

        // one row per (user, video); the update endpoint upserts against it
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(IDX_USER_VIDEO)
                    .table(VideoProgress::Table)
                    .col(VideoProgress::UserId)
                    .col(VideoProgress::VideoId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_USER_VIDEO)
                    .table(VideoProgress::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(VideoProgress::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum VideoProgress {
    Table,
    Id,
    UserId,
    VideoId,
    ResumeTime,
    Percent,
    VideoDuration,
    TotalWatchedTime,
    Intervals,
    LastUpdated,
}
