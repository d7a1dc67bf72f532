//! Conversions from the booking page's human-readable labels into typed values

use crate::model::{ResourceId, SlotDuration};
use crate::{Error, Result};
use chrono::{DateTime, Local, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DURATION_PATTERN: Regex =
        Regex::new(r"(?i)(?:([0-9]+)\s*hours?)?\s*(?:([0-9]+)\s*minutes?)?").unwrap();
    static ref COURT_PATTERN: Regex = Regex::new(r"NYBC.*Court\s+([0-9]+)").unwrap();
}

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse an appointment length such as `"2 hours 30 minutes"`
///
/// Either component may be missing. Text with neither component yields zero,
/// since the page sometimes renders a bare label.
pub fn parse_duration(text: &str) -> SlotDuration {
    let Some(captures) = DURATION_PATTERN
        .captures_iter(text)
        .find(|c| c.get(1).is_some() || c.get(2).is_some())
    else {
        return SlotDuration::ZERO;
    };

    let component = |idx: usize| {
        captures
            .get(idx)
            .map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX))
            .unwrap_or(0)
    };

    SlotDuration::from_hours(component(1)) + SlotDuration::from_minutes(component(2))
}

/// Extract the court number from a calendar label like `"NYBC Badminton Court 7"`
///
/// A label that does not match means the page layout changed, so this is an
/// error rather than a skip.
pub fn parse_resource_id(text: &str) -> Result<ResourceId> {
    let captures = COURT_PATTERN
        .captures(text)
        .ok_or_else(|| Error::malformed(text, "expected a 'NYBC ... Court <N>' label"))?;

    let number = captures[1]
        .parse::<u32>()
        .map_err(|e| Error::malformed(text, format!("court number out of range: {}", e)))?;

    ResourceId::new(number).ok_or_else(|| Error::malformed(text, "court number must be positive"))
}

/// Parse the `value` attribute of a calendar time button
///
/// Offset-bearing values are converted to local wall-clock time so they
/// compare directly against the search window.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.with_timezone(&Local).naive_local());
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(text, format) {
            return Ok(parsed.with_timezone(&Local).naive_local());
        }
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .ok_or_else(|| Error::malformed(text, "unrecognised date-time format"))
}
