// Watched-interval arithmetic. Every reported position counts as one watched second,
// so skipping ahead never fills the gap.

use serde::{Deserialize, Serialize};

/// Half-open range of watched seconds, stored as a `[start, end]` JSON pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Interval {
    pub start: i32,
    pub end: i32,
}

impl Interval {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// The single second starting at `position`.
    pub fn second_at(position: i32) -> Self {
        Self::new(position, position.saturating_add(1))
    }

    pub fn seconds(&self) -> i32 {
        self.end - self.start
    }
}

impl From<[i32; 2]> for Interval {
    fn from([start, end]: [i32; 2]) -> Self {
        Self { start, end }
    }
}

impl From<Interval> for [i32; 2] {
    fn from(i: Interval) -> Self {
        [i.start, i.end]
    }
}

/// Sort by start and collapse overlapping or touching ranges.
pub fn merge_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_by_key(|i| i.start);

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if last.end >= interval.start => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Add the second at `current_time` to the watched set.
pub fn record_position(mut intervals: Vec<Interval>, current_time: i32) -> Vec<Interval> {
    intervals.push(Interval::second_at(current_time));
    merge_intervals(intervals)
}

pub fn total_watched(intervals: &[Interval]) -> i32 {
    intervals.iter().map(Interval::seconds).sum()
}

/// Whole percent of `duration` covered by `intervals`, capped at 100.
pub fn percent_watched(intervals: &[Interval], duration: i32) -> i32 {
    if duration <= 0 {
        return 0;
    }
    let watched = f64::from(total_watched(intervals));
    let percent = (watched / f64::from(duration) * 100.0) as i32;
    percent.min(100)
}

pub fn parse_intervals(json: &str) -> serde_json::Result<Vec<Interval>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(json)
}

pub fn intervals_to_json(intervals: &[Interval]) -> serde_json::Result<String> {
    serde_json::to_string(intervals)
}
