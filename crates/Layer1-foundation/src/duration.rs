//! Human-readable durations for log output
//!
//! Rounds to the largest sensible unit ("a few seconds", "3 minutes",
//! "an hour", "2 days", ...).

use std::time::Duration;

const SECONDS_PER_MINUTE: f64 = 60.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;
const SECONDS_PER_DAY: f64 = 86_400.0;
/// Average Gregorian month: 146097 days per 4800 months
const DAYS_PER_MONTH: f64 = 146_097.0 / 4_800.0;

/// Format a duration for humans
///
/// Thresholds: under 45 seconds is "a few seconds", under 45 minutes counts
/// minutes, under 22 hours counts hours, under 26 days counts days, under
/// 11 months counts months, years after that.
pub fn humanize(duration: Duration) -> String {
    let secs = duration.as_secs_f64();

    let seconds = secs.round();
    let minutes = (secs / SECONDS_PER_MINUTE).round();
    let hours = (secs / SECONDS_PER_HOUR).round();
    let days_exact = secs / SECONDS_PER_DAY;
    let days = days_exact.round();
    let months = (days_exact / DAYS_PER_MONTH).round();
    let years = (days_exact / DAYS_PER_MONTH / 12.0).round();

    if seconds < 45.0 {
        "a few seconds".to_string()
    } else if minutes <= 1.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        format!("{} minutes", minutes as u64)
    } else if hours <= 1.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        format!("{} hours", hours as u64)
    } else if days <= 1.0 {
        "a day".to_string()
    } else if days < 26.0 {
        format!("{} days", days as u64)
    } else if months <= 1.0 {
        "a month".to_string()
    } else if months < 11.0 {
        format!("{} months", months as u64)
    } else if years <= 1.0 {
        "a year".to_string()
    } else {
        format!("{} years", years as u64)
    }
}

/// `humanize` for a whole number of seconds
pub fn humanize_secs(secs: u64) -> String {
    humanize(Duration::from_secs(secs))
}
