// Storage-agnostic progress model shared by the API services and the repository

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::intervals::{self, Interval};

#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub id: Uuid,
    pub user_id: String,
    pub video_id: String,
    /// Last reported playback position in seconds
    pub resume_time: i32,
    /// 0 - 100
    pub percent: i32,
    pub video_duration: Option<i32>,
    pub total_watched_time: i32,
    /// Merged, sorted and non-overlapping
    pub intervals: Vec<Interval>,
    pub last_updated: DateTime<Utc>,
}

impl Progress {
    /// Fresh, unsaved progress for a pair that has never reported a position.
    pub fn empty(user_id: &str, video_id: &str, now: DateTime<Utc>) -> Self {
        Progress {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            video_id: video_id.to_string(),
            resume_time: 0,
            percent: 0,
            video_duration: None,
            total_watched_time: 0,
            intervals: Vec::new(),
            last_updated: now,
        }
    }

    /// Apply one playback sample: mark the second as watched and recompute the derived fields.
    pub fn record(&mut self, current_time: i32, duration: i32, now: DateTime<Utc>) {
        let watched = std::mem::take(&mut self.intervals);
        self.intervals = intervals::record_position(watched, current_time);
        self.resume_time = current_time;
        self.video_duration = Some(duration);
        self.percent = intervals::percent_watched(&self.intervals, duration);
        self.total_watched_time = intervals::total_watched(&self.intervals);
        self.last_updated = now;
    }

    /// Percent derived from the stored intervals, 0 until a duration has been reported.
    pub fn current_percent(&self) -> i32 {
        match self.video_duration {
            Some(duration) => intervals::percent_watched(&self.intervals, duration),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_progress_reports_zero() {
        let p = Progress::empty("u", "v", Utc::now());
        assert_eq!(p.percent, 0);
        assert_eq!(p.total_watched_time, 0);
        assert_eq!(p.current_percent(), 0);
        assert!(p.intervals.is_empty());
    }

    #[test]
    fn record_updates_derived_fields() {
        let now = Utc::now();
        let mut p = Progress::empty("u", "v", now);
        for t in 0..10 {
            p.record(t, 20, now);
        }
        p.record(15, 20, now);
        assert_eq!(p.resume_time, 15);
        assert_eq!(p.video_duration, Some(20));
        assert_eq!(p.total_watched_time, 11);
        assert_eq!(p.percent, 55);
        assert_eq!(p.current_percent(), 55);
        assert_eq!(p.intervals, vec![Interval::new(0, 10), Interval::new(15, 16)]);
    }

    #[test]
    fn current_percent_follows_latest_duration() {
        let now = Utc::now();
        let mut p = Progress::empty("u", "v", now);
        p.record(0, 4, now);
        assert_eq!(p.current_percent(), 25);
        p.video_duration = Some(0);
        assert_eq!(p.current_percent(), 0);
    }
}
