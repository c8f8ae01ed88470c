use std::fmt::Display;

use chrono::{DateTime, Datelike, TimeZone};

/// Formats like `Sunday, 18th October 2026 3:04pm`.
pub fn friendly_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    let day = time.day();
    format!(
        "{}, {day}{} {}",
        time.format("%A"),
        ordinal_suffix(day),
        time.format("%B %Y %-I:%M%P")
    )
}

fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
