use chrono::{DateTime, Local, Utc};

/// `MM:SS`; zero, negative and non-finite inputs render as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{mins:02}:{secs:02}")
}

/// Local wall-clock rendering of a server timestamp; empty when absent.
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(date) => date
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => String::new(),
    }
}
