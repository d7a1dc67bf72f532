use crate::page::{BookingPage, PageSession};
use crate::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// A headless Chrome instance with the single page a search drives
///
/// Dropping the session stops the CDP handler task and the browser process;
/// [`PageSession::close`] additionally shuts Chrome down gracefully.
pub struct ChromeSession {
    browser: Mutex<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromeSession {
    pub(crate) fn new(browser: Browser, page: Page, handler_task: JoinHandle<()>) -> Self {
        Self {
            browser: Mutex::new(browser),
            page,
            handler_task,
        }
    }
}

/// Lookups on a re-rendering page fail while nodes are replaced; report those
/// as "not found" so polling waits retry them.
fn lookup_error(selector: &str, err: CdpError) -> Error {
    match err {
        CdpError::NotFound => Error::ElementNotFound(selector.to_string()),
        other => {
            let message = other.to_string();
            if message.contains("Could not find node") || message.contains("No node with given id")
            {
                Error::ElementNotFound(selector.to_string())
            } else {
                Error::Cdp(message)
            }
        }
    }
}

#[async_trait]
impl BookingPage for ChromeSession {
    type Element = Element;

    async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn query(&self, selector: &str) -> Result<Vec<Element>> {
        self.page
            .find_elements(selector)
            .await
            .map_err(|e| lookup_error(selector, e))
    }

    async fn query_within(&self, element: &Element, selector: &str) -> Result<Vec<Element>> {
        element
            .find_elements(selector)
            .await
            .map_err(|e| lookup_error(selector, e))
    }

    async fn text(&self, element: &Element) -> Result<String> {
        let text = element
            .inner_text()
            .await
            .map_err(|e| lookup_error("text", e))?;
        Ok(text.unwrap_or_default())
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        element
            .attribute(name)
            .await
            .map_err(|e| lookup_error(name, e))
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.click().await?;
        Ok(())
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn close(mut self) -> Result<()> {
        tracing::debug!("Closing Chrome");
        let browser = self.browser.get_mut();
        browser.close().await?;
        browser.wait().await?;
        self.handler_task.abort();
        Ok(())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
