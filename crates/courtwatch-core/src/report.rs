use crate::criteria::SearchCriteria;
use crate::model::{ResultSet, TimeSlot};

/// Timestamp layout used in notifications and console output
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One notification line, e.g. `1:30,Court 7,2024-01-02 18:00`
pub fn format_slot(slot: &TimeSlot) -> String {
    format!(
        "{},{},{}",
        slot.duration,
        slot.resource,
        slot.timestamp.format(TIMESTAMP_FORMAT)
    )
}

/// Notification body with one line per slot, in discovery order
pub fn format_body(results: &ResultSet) -> String {
    results
        .iter()
        .map(|slot| format!("{}\n", format_slot(slot)))
        .collect()
}

/// Notification subject describing the search that produced the results
pub fn format_subject(criteria: &SearchCriteria) -> String {
    format!(
        "Badminton Scraping Results MinDuration={} Start={} End={} CourtsExcluded={}",
        criteria.min_duration(),
        criteria.start().format(TIMESTAMP_FORMAT),
        criteria.end().format(TIMESTAMP_FORMAT),
        criteria.excluded_list()
    )
}
