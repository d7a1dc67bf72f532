//! Traversal state machine for the appointment → calendar → time screens
//!
//! The machine never touches a page. A driver asks it what to do next
//! ([`Navigator::start`]), performs the returned [`Effect`]s in order, and
//! reports what it saw back as an [`Event`] via [`Navigator::handle`]. Each
//! step requests at most one effect that yields an event, and that effect is
//! always the last one of the step.

use crate::criteria::SearchCriteria;
use crate::model::{CalendarSummary, ResourceId, SlotDuration, TimeSlot};
use crate::parse::{parse_duration, parse_resource_id};
use crate::slots::within_window;
use crate::{Error, Result};
use chrono::NaiveDateTime;
use std::collections::VecDeque;
use std::fmt;

/// Calendar label that stands for "whichever court is free"
pub const ANY_AVAILABLE: &str = "Any available";

/// Which screen the booking page is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    AtAppointmentList,
    AtResourceList(SlotDuration),
    AtCalendar(SlotDuration, ResourceId),
    Finished,
}

impl fmt::Display for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavState::AtAppointmentList => write!(f, "at the appointment list"),
            NavState::AtResourceList(d) => write!(f, "at the calendar list for {}", d),
            NavState::AtCalendar(d, r) => write!(f, "at the {} calendar for {}", r, d),
            NavState::Finished => write!(f, "finished"),
        }
    }
}

/// Observations reported by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Duration labels of every appointment option, in page order
    AppointmentsListed(Vec<String>),
    /// Labels of every calendar option, in page order
    ResourcesListed(Vec<String>),
    /// Merged timestamps of the open calendar
    SlotsExtracted(Vec<NaiveDateTime>),
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::AppointmentsListed(_) => "appointment listing",
            Event::ResourcesListed(_) => "calendar listing",
            Event::SlotsExtracted(_) => "slot extraction",
        }
    }
}

/// Work the driver must perform, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Read the appointment options; answer with [`Event::AppointmentsListed`]
    ListAppointments,
    /// Click the appointment option at this page index
    SelectAppointment(usize),
    /// Read the calendar options; answer with [`Event::ResourcesListed`]
    ListResources,
    /// Click the calendar option at this page index
    SelectResource(usize),
    /// Read both calendar screens; answer with [`Event::SlotsExtracted`]
    ExtractSlots,
    /// Append a matching slot to the results
    Record(TimeSlot),
    /// Report counts for the calendar just read
    Summarize(CalendarSummary),
    /// Return from a calendar to the calendar list
    BackToCalendars,
    /// Return from the calendar list to the appointment list
    BackToAppointments,
}

impl Effect {
    /// Whether the driver must answer this effect with an event
    pub fn yields_event(&self) -> bool {
        matches!(
            self,
            Effect::ListAppointments | Effect::ListResources | Effect::ExtractSlots
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Choice<T> {
    index: usize,
    value: T,
}

/// Decides the traversal order and which options are worth visiting
#[derive(Debug)]
pub struct Navigator {
    criteria: SearchCriteria,
    state: NavState,
    listed: bool,
    durations: VecDeque<Choice<SlotDuration>>,
    resources: VecDeque<Choice<ResourceId>>,
}

impl Navigator {
    pub fn new(criteria: SearchCriteria) -> Self {
        Self {
            criteria,
            state: NavState::AtAppointmentList,
            listed: false,
            durations: VecDeque::new(),
            resources: VecDeque::new(),
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn is_finished(&self) -> bool {
        self.state == NavState::Finished
    }

    /// First step of a traversal
    pub fn start(&self) -> Vec<Effect> {
        vec![Effect::ListAppointments]
    }

    /// Advance on an observation, returning the next effects to perform
    pub fn handle(&mut self, event: Event) -> Result<Vec<Effect>> {
        match (self.state, event) {
            (NavState::AtAppointmentList, Event::AppointmentsListed(labels)) if !self.listed => {
                self.listed = true;
                self.durations = self.eligible_durations(&labels);
                tracing::debug!(
                    "{} of {} appointment options qualify",
                    self.durations.len(),
                    labels.len()
                );

                let mut effects = Vec::new();
                self.next_duration(&mut effects);
                Ok(effects)
            }
            (NavState::AtResourceList(duration), Event::ResourcesListed(labels)) => {
                self.resources = self.eligible_resources(&labels)?;
                tracing::debug!(
                    "{} of {} calendars qualify for duration={}",
                    self.resources.len(),
                    labels.len(),
                    duration
                );

                let mut effects = Vec::new();
                self.next_resource(duration, &mut effects);
                Ok(effects)
            }
            (NavState::AtCalendar(duration, resource), Event::SlotsExtracted(times)) => {
                let eligible = within_window(&times, &self.criteria);

                let mut effects: Vec<Effect> = eligible
                    .iter()
                    .map(|t| Effect::Record(TimeSlot::new(duration, resource, *t)))
                    .collect();
                effects.push(Effect::Summarize(CalendarSummary {
                    duration,
                    resource,
                    eligible: eligible.len(),
                    total: times.len(),
                }));
                effects.push(Effect::BackToCalendars);
                self.state = NavState::AtResourceList(duration);

                self.next_resource(duration, &mut effects);
                Ok(effects)
            }
            (state, event) => Err(Error::UnexpectedEvent {
                event: event.name().to_string(),
                state: state.to_string(),
            }),
        }
    }

    fn eligible_durations(&self, labels: &[String]) -> VecDeque<Choice<SlotDuration>> {
        labels
            .iter()
            .enumerate()
            .map(|(index, label)| Choice {
                index,
                value: parse_duration(label),
            })
            .filter(|choice| self.criteria.accepts_duration(choice.value))
            .collect()
    }

    fn eligible_resources(&self, labels: &[String]) -> Result<VecDeque<Choice<ResourceId>>> {
        let mut eligible = VecDeque::new();
        for (index, label) in labels.iter().enumerate() {
            if label.trim() == ANY_AVAILABLE {
                continue;
            }
            let resource = parse_resource_id(label)?;
            if self.criteria.accepts_resource(resource) {
                eligible.push_back(Choice {
                    index,
                    value: resource,
                });
            }
        }
        Ok(eligible)
    }

    /// From the calendar list: open the next calendar, or go back up a level
    fn next_resource(&mut self, duration: SlotDuration, effects: &mut Vec<Effect>) {
        match self.resources.pop_front() {
            Some(choice) => {
                tracing::info!(
                    "Searching for all timeslots with duration={} court={}",
                    duration,
                    choice.value.number()
                );
                self.state = NavState::AtCalendar(duration, choice.value);
                effects.push(Effect::SelectResource(choice.index));
                effects.push(Effect::ExtractSlots);
            }
            None => {
                effects.push(Effect::BackToAppointments);
                self.state = NavState::AtAppointmentList;
                self.next_duration(effects);
            }
        }
    }

    /// From the appointment list: open the next duration, or finish
    fn next_duration(&mut self, effects: &mut Vec<Effect>) {
        match self.durations.pop_front() {
            Some(choice) => {
                tracing::info!(
                    "Searching for all eligible courts with duration={}",
                    choice.value
                );
                self.state = NavState::AtResourceList(choice.value);
                effects.push(Effect::SelectAppointment(choice.index));
                effects.push(Effect::ListResources);
            }
            None => self.state = NavState::Finished,
        }
    }
}
