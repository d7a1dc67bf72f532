use crate::model::{ResourceId, SlotDuration, TimeSlot};
use crate::{Error, Result};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

/// Constraints a slot must satisfy to be reported
///
/// All conditions are combined with AND logic - a slot must match
/// ALL of them to end up in the result set. Fields are only set through the
/// builder, so `start <= end` holds for every value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    min_duration: SlotDuration,
    start: NaiveDateTime,
    end: NaiveDateTime,
    excluded: BTreeSet<ResourceId>,
}

impl SearchCriteria {
    /// Create criteria for a window with no duration floor and no exclusions
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidCriteria(format!(
                "start {} is after end {}",
                start, end
            )));
        }

        Ok(Self {
            min_duration: SlotDuration::ZERO,
            start,
            end,
            excluded: BTreeSet::new(),
        })
    }

    pub fn with_min_duration(mut self, min_duration: SlotDuration) -> Self {
        self.min_duration = min_duration;
        self
    }

    /// Exclude courts by number
    pub fn with_excluded<I>(mut self, courts: I) -> Result<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        for court in courts {
            let id = ResourceId::new(court).ok_or_else(|| {
                Error::InvalidCriteria(format!("court {} is not a valid court number", court))
            })?;
            self.excluded.insert(id);
        }
        Ok(self)
    }

    /// Shortest appointment length worth booking
    pub fn min_duration(&self) -> SlotDuration {
        self.min_duration
    }

    /// Earliest acceptable start time (inclusive)
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Latest acceptable start time (inclusive)
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Courts that are never reported
    pub fn excluded(&self) -> &BTreeSet<ResourceId> {
        &self.excluded
    }

    pub fn accepts_duration(&self, duration: SlotDuration) -> bool {
        duration >= self.min_duration
    }

    pub fn accepts_resource(&self, resource: ResourceId) -> bool {
        !self.excluded.contains(&resource)
    }

    pub fn accepts_timestamp(&self, timestamp: &NaiveDateTime) -> bool {
        *timestamp >= self.start && *timestamp <= self.end
    }

    /// Check a finished slot against every constraint
    pub fn matches(&self, slot: &TimeSlot) -> bool {
        self.accepts_duration(slot.duration)
            && self.accepts_resource(slot.resource)
            && self.accepts_timestamp(&slot.timestamp)
    }

    /// Comma separated excluded court numbers, empty when none
    pub fn excluded_list(&self) -> String {
        self.excluded
            .iter()
            .map(|id| id.number().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
