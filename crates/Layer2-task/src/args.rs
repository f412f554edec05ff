//! Positional argument parsing
//!
//! The runner takes exactly three positional strings: task, config and
//! execution date. Task and config are decoded as JSON when possible and kept
//! as plain strings otherwise. The date never fails to parse; unparseable
//! input becomes [`ExecutionDate::Invalid`] and is handed to the handler as-is.

use aries_foundation::{Error, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Number of positional arguments the runner accepts
pub const ARG_COUNT: usize = 3;

/// Naive (offset-less) timestamp layouts, read as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
];

/// Date-only layouts besides ISO, read as UTC midnight
const NAIVE_DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%B %d, %Y", "%B %d %Y", "%d %B %Y"];

/// Decode `s` as JSON, or return it unchanged as a string
///
/// Nesting deeper than 128 levels hits `serde_json`'s recursion limit and
/// comes back as a string.
pub fn parse_json_or_string(s: &str) -> Value {
    serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.to_string()))
}

// ============================================================================
// ExecutionDate
// ============================================================================

/// Execution date argument
///
/// `Invalid` keeps the raw input so handlers can report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionDate {
    Valid(DateTime<Utc>),
    Invalid(String),
}

impl ExecutionDate {
    /// Parse a date string; never fails
    pub fn parse(raw: &str) -> Self {
        match parse_timestamp(raw.trim()) {
            Some(date) => ExecutionDate::Valid(date),
            None => ExecutionDate::Invalid(raw.to_string()),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ExecutionDate::Valid(_))
    }

    /// The parsed timestamp, if valid
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            ExecutionDate::Valid(date) => Some(date),
            ExecutionDate::Invalid(_) => None,
        }
    }

    /// ISO-8601 UTC with milliseconds, e.g. `2024-01-01T00:00:00.000Z`
    pub fn to_iso_string(&self) -> Option<String> {
        self.as_datetime()
            .map(|date| date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl fmt::Display for ExecutionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_iso_string() {
            Some(iso) => write!(f, "{}", iso),
            None => write!(f, "Invalid Date"),
        }
    }
}

impl Serialize for ExecutionDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.to_iso_string() {
            Some(iso) => serializer.serialize_str(&iso),
            None => serializer.serialize_none(),
        }
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    if let Some(date) = parse_partial_date(s) {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// `YYYY-MM-DD`, `YYYY-MM` or `YYYY`; month and day may drop the leading zero
///
/// Days 1 to 31 are accepted for every month and roll over into the next
/// one, so `2024-02-30` is March 1st.
fn parse_partial_date(s: &str) -> Option<NaiveDate> {
    let mut parts = s.split('-');
    let year = parse_digits(parts.next()?, 4, 4)?;
    let month = match parts.next() {
        Some(part) => parse_digits(part, 1, 2)?,
        None => 1,
    };
    let day = match parts.next() {
        Some(part) => parse_digits(part, 1, 2)?,
        None => 1,
    };
    if parts.next().is_some() || !(1..=31).contains(&day) {
        return None;
    }

    NaiveDate::from_ymd_opt(year as i32, month, 1)?.checked_add_days(Days::new(u64::from(day - 1)))
}

fn parse_digits(part: &str, min: usize, max: usize) -> Option<u32> {
    if !(min..=max).contains(&part.len()) || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

// ============================================================================
// TaskArgs
// ============================================================================

/// Parsed positional arguments
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskArgs {
    pub task: Value,
    pub config: Value,
    pub execution_date: ExecutionDate,
}

impl TaskArgs {
    /// Number of positional values handed to the handler
    pub fn len(&self) -> usize {
        ARG_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn into_parts(self) -> (Value, Value, ExecutionDate) {
        (self.task, self.config, self.execution_date)
    }
}

/// Parse `[task, config, executionDate]`
///
/// Fails only when the argument count is not exactly three.
pub fn parse_arguments<S: AsRef<str>>(args: &[S]) -> Result<TaskArgs> {
    let [task, config, execution_date] = args else {
        return Err(Error::InvalidArity {
            expected: ARG_COUNT,
            actual: args.len(),
        });
    };

    Ok(TaskArgs {
        task: parse_json_or_string(task.as_ref()),
        config: parse_json_or_string(config.as_ref()),
        execution_date: ExecutionDate::parse(execution_date.as_ref()),
    })
}
