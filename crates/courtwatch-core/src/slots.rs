use crate::criteria::SearchCriteria;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

/// Merge the two calendar screens into one ascending, duplicate-free list
///
/// Screens overlap at their boundary, so equal instants collapse to one entry.
pub fn merge_pages<A, B>(first: A, second: B) -> Vec<NaiveDateTime>
where
    A: IntoIterator<Item = NaiveDateTime>,
    B: IntoIterator<Item = NaiveDateTime>,
{
    first
        .into_iter()
        .chain(second)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Keep only the timestamps inside the search window, preserving order
pub fn within_window(times: &[NaiveDateTime], criteria: &SearchCriteria) -> Vec<NaiveDateTime> {
    times
        .iter()
        .filter(|t| criteria.accepts_timestamp(t))
        .copied()
        .collect()
}
