use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Length of a bookable appointment, with minute resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotDuration(u32);

impl SlotDuration {
    pub const ZERO: SlotDuration = SlotDuration(0);

    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    pub fn from_hours(hours: u32) -> Self {
        Self(hours.saturating_mul(60))
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Add for SlotDuration {
    type Output = SlotDuration;

    fn add(self, rhs: SlotDuration) -> SlotDuration {
        SlotDuration(self.0.saturating_add(rhs.0))
    }
}

impl Sum for SlotDuration {
    fn sum<I: Iterator<Item = SlotDuration>>(iter: I) -> Self {
        iter.fold(SlotDuration::ZERO, Add::add)
    }
}

/// Renders as `H:MM`, e.g. `1:30`
impl fmt::Display for SlotDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Court number as printed on the calendar label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(u32);

impl ResourceId {
    /// Returns `None` for zero; court numbers start at one.
    pub fn new(number: u32) -> Option<Self> {
        (number > 0).then_some(Self(number))
    }

    pub fn number(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Court {}", self.0)
    }
}

/// A bookable start time for one court and one appointment length
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub duration: SlotDuration,
    pub resource: ResourceId,
    pub timestamp: NaiveDateTime,
}

impl TimeSlot {
    pub fn new(duration: SlotDuration, resource: ResourceId, timestamp: NaiveDateTime) -> Self {
        Self {
            duration,
            resource,
            timestamp,
        }
    }
}

/// All slots found during one search run, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    slots: Vec<TimeSlot>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, slot: TimeSlot) {
        self.slots.push(slot);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeSlot> {
        self.slots.iter()
    }

    pub fn as_slice(&self) -> &[TimeSlot] {
        &self.slots
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a TimeSlot;
    type IntoIter = std::slice::Iter<'a, TimeSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = TimeSlot;
    type IntoIter = std::vec::IntoIter<TimeSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter()
    }
}

impl FromIterator<TimeSlot> for ResultSet {
    fn from_iter<I: IntoIterator<Item = TimeSlot>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

/// Per-calendar counts reported while traversing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarSummary {
    pub duration: SlotDuration,
    pub resource: ResourceId,
    pub eligible: usize,
    pub total: usize,
}

impl fmt::Display for CalendarSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duration={} court={} eligibleTimeSlots={} allTimeSlots={}",
            self.duration,
            self.resource.number(),
            self.eligible,
            self.total
        )
    }
}
