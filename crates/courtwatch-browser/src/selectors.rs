//! CSS selectors and marker texts of the booking site

/// One appointment type (duration) on the first screen
pub const APPOINTMENT_OPTION: &str = ".select-item-box";
/// Duration label inside an appointment option
pub const APPOINTMENT_DURATION: &str = ".duration";
/// One calendar (court) on the second screen
pub const CALENDAR_OPTION: &str = ".calendar-select-box";
/// Court label inside a calendar option
pub const CALENDAR_LABEL: &str = "label";
/// Select button inside either kind of option
pub const OPTION_BUTTON: &str = "button";

/// Container of the time buttons of a calendar screen
pub const DATE_TIME_PANEL: &str = ".choose-date-time";
/// A selectable start time; its `value` attribute holds the timestamp
pub const TIME_SELECTION: &str = ".time-selection";
pub const TIME_VALUE_ATTRIBUTE: &str = "value";
/// Pager to the second calendar screen
pub const CALENDAR_NEXT: &str = ".calendar-next";
/// Panel text while the calendar is still loading
pub const LOADING_SENTINEL: &str = "LOADING...";

pub const BACK_BUTTON: &str = ".back-button";
pub const VIEW_ALL_CALENDARS: &str = "view all calendars";
pub const VIEW_ALL_APPOINTMENTS: &str = "view all appointments";
