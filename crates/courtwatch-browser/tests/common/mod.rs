//! Scripted stand-in for the booking site, shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use courtwatch_browser::selectors::*;
use courtwatch_browser::{
    BookingPage, Error, Notifier, PageLauncher, PageSession, Result, WaitConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn quick_wait() -> WaitConfig {
    WaitConfig::new(Duration::from_millis(200), Duration::from_millis(1))
}

pub fn short_wait() -> WaitConfig {
    WaitConfig::new(Duration::from_millis(20), Duration::from_millis(1))
}

#[derive(Debug, Clone)]
pub struct MockCalendar {
    pub label: String,
    pub pages: [Vec<String>; 2],
}

#[derive(Debug, Clone)]
pub struct MockAppointment {
    pub label: String,
    pub calendars: Vec<MockCalendar>,
}

pub fn calendar(label: &str, first: &[&str], second: &[&str]) -> MockCalendar {
    MockCalendar {
        label: label.to_string(),
        pages: [
            first.iter().map(|s| s.to_string()).collect(),
            second.iter().map(|s| s.to_string()).collect(),
        ],
    }
}

pub fn appointment(label: &str, calendars: Vec<MockCalendar>) -> MockAppointment {
    MockAppointment {
        label: label.to_string(),
        calendars,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Blank,
    Appointments,
    Calendars(usize),
    Calendar {
        appointment: usize,
        calendar: usize,
        page: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockElement {
    AppointmentOption(usize),
    AppointmentDuration(usize),
    AppointmentButton(usize),
    CalendarOption(usize),
    CalendarLabel(usize),
    CalendarButton(usize),
    Panel,
    TimeButton(String),
    Next,
    Back(String),
}

struct State {
    screen: Screen,
    loading_left: usize,
    loaded_screens: usize,
    log: Vec<String>,
}

/// In-memory booking site
///
/// Calendar screens report the loading sentinel for `loading_polls` reads
/// after they are opened or paged.
pub struct MockSite {
    appointments: Vec<MockAppointment>,
    loading_polls: usize,
    stuck_loading: bool,
    duplicate_calendar_back: bool,
    missing_appointment_back: bool,
    state: Mutex<State>,
}

impl MockSite {
    pub fn new(appointments: Vec<MockAppointment>) -> Self {
        Self {
            appointments,
            loading_polls: 2,
            stuck_loading: false,
            duplicate_calendar_back: false,
            missing_appointment_back: false,
            state: Mutex::new(State {
                screen: Screen::Blank,
                loading_left: 0,
                loaded_screens: 0,
                log: Vec::new(),
            }),
        }
    }

    /// Calendars never finish loading
    pub fn stuck_loading(mut self) -> Self {
        self.stuck_loading = true;
        self
    }

    /// Calendar screens render two "View all calendars" controls
    pub fn duplicate_calendar_back(mut self) -> Self {
        self.duplicate_calendar_back = true;
        self
    }

    /// Calendar lists render without their "View all appointments" control
    pub fn missing_appointment_back(mut self) -> Self {
        self.missing_appointment_back = true;
        self
    }

    /// Actions performed so far, e.g. `"open 1 hour"`
    pub fn log(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    /// Number of calendar screens that finished loading
    pub fn loaded_screens(&self) -> usize {
        self.state.lock().unwrap().loaded_screens
    }

    pub fn on_appointment_list(&self) -> bool {
        self.state.lock().unwrap().screen == Screen::Appointments
    }

    fn open_calendar_screen(state: &mut State, screen: Screen, loading_polls: usize) {
        state.screen = screen;
        state.loading_left = loading_polls;
    }

    fn query(&self, selector: &str) -> Vec<MockElement> {
        let state = self.state.lock().unwrap();
        match (state.screen, selector) {
            (Screen::Appointments, APPOINTMENT_OPTION) => (0..self.appointments.len())
                .map(MockElement::AppointmentOption)
                .collect(),
            (Screen::Calendars(a), CALENDAR_OPTION) => (0..self.appointments[a].calendars.len())
                .map(MockElement::CalendarOption)
                .collect(),
            (Screen::Calendars(_), BACK_BUTTON) if !self.missing_appointment_back => {
                vec![MockElement::Back("View all appointments".to_string())]
            }
            (Screen::Calendar { .. }, DATE_TIME_PANEL) => vec![MockElement::Panel],
            (Screen::Calendar { .. }, CALENDAR_NEXT) => vec![MockElement::Next],
            (Screen::Calendar { .. }, BACK_BUTTON) => {
                let mut controls = vec![
                    MockElement::Back(" View all calendars ".to_string()),
                    MockElement::Back("View all appointments".to_string()),
                ];
                if self.duplicate_calendar_back {
                    controls.push(MockElement::Back("VIEW ALL CALENDARS".to_string()));
                }
                controls
            }
            _ => Vec::new(),
        }
    }

    fn query_within(&self, element: &MockElement, selector: &str) -> Vec<MockElement> {
        let state = self.state.lock().unwrap();
        match (element, selector) {
            (MockElement::AppointmentOption(i), APPOINTMENT_DURATION) => {
                vec![MockElement::AppointmentDuration(*i)]
            }
            (MockElement::AppointmentOption(i), OPTION_BUTTON) => {
                vec![MockElement::AppointmentButton(*i)]
            }
            (MockElement::CalendarOption(i), CALENDAR_LABEL) => vec![MockElement::CalendarLabel(*i)],
            (MockElement::CalendarOption(i), OPTION_BUTTON) => vec![MockElement::CalendarButton(*i)],
            (MockElement::Panel, TIME_SELECTION) => match state.screen {
                Screen::Calendar {
                    appointment,
                    calendar,
                    page,
                } => self.appointments[appointment].calendars[calendar]
                    .pages
                    .get(page)
                    .cloned()
                    .unwrap_or_default()
                    .into_iter()
                    .map(MockElement::TimeButton)
                    .collect(),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn text(&self, element: &MockElement) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        let text = match element {
            MockElement::AppointmentDuration(i) => self.appointments[*i].label.clone(),
            MockElement::CalendarLabel(i) => match state.screen {
                Screen::Calendars(a) => self.appointments[a].calendars[*i].label.clone(),
                _ => return Err(Error::ElementNotFound(CALENDAR_LABEL.to_string())),
            },
            MockElement::Panel => {
                if self.stuck_loading || state.loading_left > 0 {
                    state.loading_left = state.loading_left.saturating_sub(1);
                    format!("  {}  ", LOADING_SENTINEL)
                } else {
                    state.loaded_screens += 1;
                    "Select a date and time".to_string()
                }
            }
            MockElement::Back(text) => text.clone(),
            _ => String::new(),
        };
        Ok(text)
    }

    fn click(&self, element: &MockElement) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let loading_polls = self.loading_polls;
        match (element, state.screen) {
            (MockElement::AppointmentButton(i), Screen::Appointments) => {
                let entry = format!("open {}", self.appointments[*i].label);
                state.log.push(entry);
                state.screen = Screen::Calendars(*i);
            }
            (MockElement::CalendarButton(i), Screen::Calendars(a)) => {
                let entry = format!("open {}", self.appointments[a].calendars[*i].label);
                state.log.push(entry);
                Self::open_calendar_screen(
                    &mut state,
                    Screen::Calendar {
                        appointment: a,
                        calendar: *i,
                        page: 0,
                    },
                    loading_polls,
                );
            }
            (
                MockElement::Next,
                Screen::Calendar {
                    appointment,
                    calendar,
                    page,
                },
            ) => {
                state.log.push("next".to_string());
                Self::open_calendar_screen(
                    &mut state,
                    Screen::Calendar {
                        appointment,
                        calendar,
                        page: page + 1,
                    },
                    loading_polls,
                );
            }
            (MockElement::Back(text), screen) => {
                let control = text.trim().to_lowercase();
                state.log.push(format!("back {}", control));
                state.screen = match (control.as_str(), screen) {
                    ("view all calendars", Screen::Calendar { appointment, .. }) => {
                        Screen::Calendars(appointment)
                    }
                    ("view all appointments", _) => Screen::Appointments,
                    _ => return Err(Error::Browser(format!("dead control {}", text))),
                };
            }
            (other, screen) => {
                return Err(Error::Browser(format!(
                    "stale element {:?} on {:?}",
                    other, screen
                )));
            }
        }
        Ok(())
    }
}

/// Page session over a shared [`MockSite`]
pub struct MockSession {
    site: Arc<MockSite>,
    closes: Arc<AtomicUsize>,
}

impl MockSession {
    pub fn new(site: Arc<MockSite>) -> Self {
        Self {
            site,
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl BookingPage for MockSession {
    type Element = MockElement;

    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.site.state.lock().unwrap();
        state.log.push(format!("goto {}", url));
        state.screen = Screen::Appointments;
        Ok(())
    }

    async fn query(&self, selector: &str) -> Result<Vec<MockElement>> {
        Ok(self.site.query(selector))
    }

    async fn query_within(&self, element: &MockElement, selector: &str) -> Result<Vec<MockElement>> {
        Ok(self.site.query_within(element, selector))
    }

    async fn text(&self, element: &MockElement) -> Result<String> {
        self.site.text(element)
    }

    async fn attribute(&self, element: &MockElement, name: &str) -> Result<Option<String>> {
        Ok(match (element, name) {
            (MockElement::TimeButton(value), TIME_VALUE_ATTRIBUTE) => Some(value.clone()),
            _ => None,
        })
    }

    async fn click(&self, element: &MockElement) -> Result<()> {
        self.site.click(element)
    }
}

#[async_trait]
impl PageSession for MockSession {
    async fn close(self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out sessions over one site and counts opens and closes
pub struct MockLauncher {
    pub site: Arc<MockSite>,
    opens: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl MockLauncher {
    pub fn new(site: MockSite) -> Self {
        Self {
            site: Arc::new(site),
            opens: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageLauncher for MockLauncher {
    type Session = MockSession;

    async fn open(&self) -> Result<MockSession> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(MockSession {
            site: self.site.clone(),
            closes: self.closes.clone(),
        })
    }
}

/// Notifier that remembers every call
#[derive(Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// The booking site used by the end-to-end scenarios
///
/// Durations of 30, 60 and 90 minutes, each with "Any available" plus
/// courts 1, 2 and 3. Timestamps fall on both sides of
/// 2024-01-01 08:00 .. 2024-01-03 08:00.
pub fn sample_site() -> MockSite {
    let courts = || {
        vec![
            calendar("Any available", &["2024-01-01T09:00:00"], &[]),
            calendar(
                "NYBC Badminton Court 1",
                &["2024-01-01T09:00:00", "2024-01-01T10:00:00"],
                &["2024-01-02T09:00:00"],
            ),
            calendar(
                "NYBC Badminton Court 2 (upstairs)",
                &["2024-01-01T07:00:00", "2024-01-01T18:00:00"],
                &["2024-01-01T18:00:00", "2024-01-02T20:00:00"],
            ),
            calendar(
                "NYBC Badminton Court 3",
                &["2024-01-02T12:00:00"],
                &["2024-01-03T08:00:00", "2024-01-03T09:00:00"],
            ),
        ]
    };

    MockSite::new(vec![
        appointment("30 minutes", courts()),
        appointment("1 hour", courts()),
        appointment("1 hour 30 minutes", courts()),
    ])
}
