use sea_orm::entity::prelude::*;

/// Watch progress of one user on one video.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "video_progress")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub video_id: String,
    /// Last reported playback position in seconds
    pub resume_time: i32,
    pub percent: i32,
    /// Last reported video length in seconds
    pub video_duration: Option<i32>,
    pub total_watched_time: i32,
    /// JSON array of merged `[start, end)` second ranges
    #[sea_orm(column_type = "Text")]
    pub intervals: String,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
