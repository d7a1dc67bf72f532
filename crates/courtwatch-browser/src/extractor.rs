use crate::page::BookingPage;
use crate::selectors::{
    CALENDAR_NEXT, DATE_TIME_PANEL, LOADING_SENTINEL, TIME_SELECTION, TIME_VALUE_ATTRIBUTE,
};
use crate::wait::Waiter;
use crate::Result;
use chrono::NaiveDateTime;
use courtwatch_core::parse::parse_timestamp;
use courtwatch_core::slots::merge_pages;

/// Reads every start time an open calendar offers
///
/// The site shows a calendar as exactly two screens; the second is reached
/// through the pager and nothing past it is read.
pub struct SlotExtractor<'a, P: BookingPage> {
    page: &'a P,
    waiter: Waiter,
}

impl<'a, P: BookingPage> SlotExtractor<'a, P> {
    pub fn new(page: &'a P, waiter: Waiter) -> Self {
        Self { page, waiter }
    }

    /// Both screens merged, ascending, without duplicates
    pub async fn extract(&self) -> Result<Vec<NaiveDateTime>> {
        let first = self.read_screen().await?;
        tracing::debug!("First calendar screen offers {} times", first.len());

        let page = self.page;
        let next = self
            .waiter
            .until("calendar pager", || page.query_first(CALENDAR_NEXT))
            .await?;
        page.click(&next).await?;

        let second = self.read_screen().await?;
        tracing::debug!("Second calendar screen offers {} times", second.len());

        Ok(merge_pages(first, second))
    }

    async fn read_screen(&self) -> Result<Vec<NaiveDateTime>> {
        let page = self.page;
        let panel = self
            .waiter
            .until("calendar to finish loading", || loaded_panel(page))
            .await?;

        let mut times = Vec::new();
        for button in page.query_within(&panel, TIME_SELECTION).await? {
            let value = page
                .attribute(&button, TIME_VALUE_ATTRIBUTE)
                .await?
                .ok_or_else(|| courtwatch_core::Error::MalformedLabel {
                    label: String::new(),
                    reason: "time button without a value attribute".to_string(),
                })?;
            times.push(parse_timestamp(&value)?);
        }

        Ok(times)
    }
}

/// The time panel, once it no longer shows the loading sentinel
async fn loaded_panel<P: BookingPage>(page: &P) -> Result<Option<P::Element>> {
    let Some(panel) = page.query_first(DATE_TIME_PANEL).await? else {
        return Ok(None);
    };
    let text = page.text(&panel).await?;
    Ok((text.trim() != LOADING_SENTINEL).then_some(panel))
}
