// Browser side of the search: page access, waits, traversal and orchestration

mod chrome_finder;
mod error;
mod launcher;
mod session;

pub mod engine;
pub mod extractor;
pub mod page;
pub mod search;
pub mod selectors;
pub mod wait;

pub use chrome_finder::ChromeFinder;
pub use engine::NavigationEngine;
pub use error::{Error, Result};
pub use extractor::SlotExtractor;
pub use launcher::ChromeLauncher;
pub use page::{BookingPage, PageLauncher, PageSession};
pub use search::{Notifier, SearchOrchestrator, SearchOutcome, SiteConfig};
pub use session::ChromeSession;
pub use wait::{WaitConfig, Waiter};
