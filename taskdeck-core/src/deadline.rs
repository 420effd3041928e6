//! Deadline parsing and display
//!
//! Accepts ISO dates ("2026-01-25"), "today"/"tomorrow", weekday names
//! ("friday", "next monday") and offsets ("in 3 days", "in 2 weeks").
//! Everything is resolved against an explicit `today` so callers and tests
//! control the clock.

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};

use crate::error::{AppError, Result};

/// Parse a deadline relative to the local date
pub fn parse_deadline(input: &str) -> Result<NaiveDate> {
    parse_deadline_from(input, Local::now().date_naive())
}

/// Parse a deadline relative to `today`
pub fn parse_deadline_from(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim().to_lowercase();

    let parsed = match input.as_str() {
        "today" => Some(today),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        other => weekday_after(other, today)
            .or_else(|| offset_from(other, today))
            .or_else(|| NaiveDate::parse_from_str(other, "%Y-%m-%d").ok()),
    };

    parsed.ok_or_else(|| {
        AppError::invalid_input(format!(
            "Could not parse deadline '{}'. Try 'tomorrow', 'friday', 'in 3 days' or '2026-01-25'",
            input
        ))
    })
}

fn weekday_after(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let name = input.strip_prefix("next ").unwrap_or(input);

    let target = match name {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };

    // Always the next occurrence, never today
    let ahead = (target.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    let ahead = if ahead == 0 { 7 } else { ahead };
    today.checked_add_days(Days::new(u64::from(ahead)))
}

fn offset_from(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let rest = input.strip_prefix("in ")?;
    let mut parts = rest.split_whitespace();
    let count: u64 = parts.next()?.parse().ok()?;
    let unit = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let days = match unit {
        "day" | "days" => count,
        "week" | "weeks" => count.checked_mul(7)?,
        _ => return None,
    };
    today.checked_add_days(Days::new(days))
}

/// Human-readable deadline relative to `today`
///
/// Returns strings like "Today", "Tomorrow", "Fri Jan 30" or "Overdue (3 days)".
pub fn describe_deadline(date: NaiveDate, today: NaiveDate) -> String {
    let diff = date.signed_duration_since(today).num_days();

    match diff {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        2..=6 => date.format("%a %b %d").to_string(),
        7..=365 => date.format("%b %d").to_string(),
        d if d < 0 => format!("Overdue ({} days)", -d),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}
