use crate::extractor::SlotExtractor;
use crate::page::BookingPage;
use crate::selectors::{
    APPOINTMENT_DURATION, APPOINTMENT_OPTION, BACK_BUTTON, CALENDAR_LABEL, CALENDAR_OPTION,
    OPTION_BUTTON, VIEW_ALL_APPOINTMENTS, VIEW_ALL_CALENDARS,
};
use crate::wait::Waiter;
use crate::{Error, Result};
use courtwatch_core::report::format_slot;
use courtwatch_core::{Effect, Event, Navigator, ResultSet, SearchCriteria};

/// Drives a [`Navigator`] against a live booking page
pub struct NavigationEngine<'a, P: BookingPage> {
    page: &'a P,
    waiter: Waiter,
}

impl<'a, P: BookingPage> NavigationEngine<'a, P> {
    pub fn new(page: &'a P, waiter: Waiter) -> Self {
        Self { page, waiter }
    }

    /// Visit every qualifying duration and court, starting from the
    /// appointment list, and return the matching slots in discovery order
    pub async fn run(&self, criteria: SearchCriteria) -> Result<ResultSet> {
        let mut navigator = Navigator::new(criteria);
        let mut results = ResultSet::new();
        let mut effects = navigator.start();

        loop {
            let mut observed = None;
            for effect in effects {
                if let Some(event) = self.apply(effect, &mut results).await? {
                    observed = Some(event);
                }
            }

            match observed {
                Some(event) => effects = navigator.handle(event)?,
                None => break,
            }
        }

        tracing::debug!("Traversal {}", navigator.state());
        Ok(results)
    }

    async fn apply(&self, effect: Effect, results: &mut ResultSet) -> Result<Option<Event>> {
        match effect {
            Effect::ListAppointments => {
                let labels = self
                    .list_labels(APPOINTMENT_OPTION, APPOINTMENT_DURATION, "appointment options")
                    .await?;
                Ok(Some(Event::AppointmentsListed(labels)))
            }
            Effect::SelectAppointment(index) => {
                self.select(APPOINTMENT_OPTION, index, "appointment option")
                    .await?;
                Ok(None)
            }
            Effect::ListResources => {
                let labels = self
                    .list_labels(CALENDAR_OPTION, CALENDAR_LABEL, "calendar options")
                    .await?;
                Ok(Some(Event::ResourcesListed(labels)))
            }
            Effect::SelectResource(index) => {
                self.select(CALENDAR_OPTION, index, "calendar option").await?;
                Ok(None)
            }
            Effect::ExtractSlots => {
                let times = SlotExtractor::new(self.page, self.waiter).extract().await?;
                Ok(Some(Event::SlotsExtracted(times)))
            }
            Effect::Record(slot) => {
                tracing::info!("{}", format_slot(&slot));
                results.push(slot);
                Ok(None)
            }
            Effect::Summarize(summary) => {
                tracing::info!("{}", summary);
                Ok(None)
            }
            Effect::BackToCalendars => {
                self.back(VIEW_ALL_CALENDARS).await?;
                Ok(None)
            }
            Effect::BackToAppointments => {
                self.back(VIEW_ALL_APPOINTMENTS).await?;
                Ok(None)
            }
        }
    }

    /// Trimmed label text of every option, waiting for the list to render
    ///
    /// A list that stays empty for the whole wait is reported as empty.
    async fn list_labels(
        &self,
        option_selector: &str,
        label_selector: &str,
        what: &str,
    ) -> Result<Vec<String>> {
        let page = self.page;
        match self
            .waiter
            .until(what, || option_labels(page, option_selector, label_selector))
            .await
        {
            Ok(labels) => Ok(labels),
            Err(Error::ExtractionTimeout { .. }) => {
                tracing::debug!("No {} rendered", what);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Click the select button of the option at `index`
    async fn select(&self, option_selector: &str, index: usize, what: &str) -> Result<()> {
        let page = self.page;
        let button = self
            .waiter
            .until(what, || option_button(page, option_selector, index))
            .await?;
        page.click(&button).await
    }

    /// Follow the back control whose text is `control`
    ///
    /// Exactly one such control must exist; anything else means the page no
    /// longer has the expected structure.
    async fn back(&self, control: &str) -> Result<()> {
        let page = self.page;
        let mut matches = match self
            .waiter
            .until(control, || back_controls(page, control))
            .await
        {
            Ok(matches) => matches,
            Err(Error::ExtractionTimeout { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };

        let found = matches.len();
        match (matches.pop(), found) {
            (Some(button), 1) => {
                tracing::debug!("Navigating back via '{}'", control);
                page.click(&button).await
            }
            _ => Err(Error::NavigationAmbiguity {
                control: control.to_string(),
                found,
            }),
        }
    }
}

async fn option_labels<P: BookingPage>(
    page: &P,
    option_selector: &str,
    label_selector: &str,
) -> Result<Option<Vec<String>>> {
    let options = page.query(option_selector).await?;
    if options.is_empty() {
        return Ok(None);
    }

    let mut labels = Vec::with_capacity(options.len());
    for option in &options {
        let label = page.find_within(option, label_selector).await?;
        labels.push(page.text(&label).await?.trim().to_string());
    }
    Ok(Some(labels))
}

async fn option_button<P: BookingPage>(
    page: &P,
    option_selector: &str,
    index: usize,
) -> Result<Option<P::Element>> {
    let Some(option) = page.query(option_selector).await?.into_iter().nth(index) else {
        return Ok(None);
    };
    page.find_within(&option, OPTION_BUTTON).await.map(Some)
}

async fn back_controls<P: BookingPage>(page: &P, control: &str) -> Result<Option<Vec<P::Element>>> {
    let mut matches = Vec::new();
    for button in page.query(BACK_BUTTON).await? {
        if page.text(&button).await?.trim().to_lowercase() == control {
            matches.push(button);
        }
    }
    Ok((!matches.is_empty()).then_some(matches))
}
