pub mod criteria;
pub mod error;
pub mod model;
pub mod navigation;
pub mod parse;
pub mod report;
pub mod slots;

pub use criteria::SearchCriteria;
pub use error::{Error, Result};
pub use model::{CalendarSummary, ResourceId, ResultSet, SlotDuration, TimeSlot};
pub use navigation::{Effect, Event, NavState, Navigator};
