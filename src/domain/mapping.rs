// Mapping between stored rows and domain models

use anyhow::Context;
use entities::video_progress;
use sea_orm::ActiveValue::Set;

use super::intervals::{intervals_to_json, parse_intervals};
use super::models::Progress;

pub fn map_model_to_progress(model: video_progress::Model) -> anyhow::Result<Progress> {
    let intervals = parse_intervals(&model.intervals).with_context(|| {
        format!(
            "Error parsing intervals JSON for user {} on video {}",
            model.user_id, model.video_id
        )
    })?;
    Ok(Progress {
        id: model.id,
        user_id: model.user_id,
        video_id: model.video_id,
        resume_time: model.resume_time,
        percent: model.percent,
        video_duration: model.video_duration,
        total_watched_time: model.total_watched_time,
        intervals,
        last_updated: model.last_updated,
    })
}

pub fn map_progress_to_active(progress: &Progress) -> anyhow::Result<video_progress::ActiveModel> {
    let intervals =
        intervals_to_json(&progress.intervals).context("Error serializing intervals JSON")?;
    Ok(video_progress::ActiveModel {
        id: Set(progress.id),
        user_id: Set(progress.user_id.clone()),
        video_id: Set(progress.video_id.clone()),
        resume_time: Set(progress.resume_time),
        percent: Set(progress.percent),
        video_duration: Set(progress.video_duration),
        total_watched_time: Set(progress.total_watched_time),
        intervals: Set(intervals),
        last_updated: Set(progress.last_updated),
    })
}
