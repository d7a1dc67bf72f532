use crate::Result;
use async_trait::async_trait;

/// The handful of page operations the search needs from a browser
///
/// Implementations report a missing child element as
/// [`Error::ElementNotFound`](crate::Error::ElementNotFound); bounded waits
/// treat that error as "not rendered yet" and keep polling.
#[async_trait]
pub trait BookingPage: Send + Sync {
    type Element: Send + Sync;

    /// Load a URL in the page
    async fn goto(&self, url: &str) -> Result<()>;

    /// All elements matching a CSS selector, possibly none
    async fn query(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// All descendants of `element` matching a CSS selector, possibly none
    async fn query_within(
        &self,
        element: &Self::Element,
        selector: &str,
    ) -> Result<Vec<Self::Element>>;

    /// Rendered text of an element
    async fn text(&self, element: &Self::Element) -> Result<String>;

    /// Attribute value, `None` when the attribute is absent
    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Click-equivalent action
    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// First element matching `selector`, `None` when nothing matches yet
    async fn query_first(&self, selector: &str) -> Result<Option<Self::Element>> {
        Ok(self.query(selector).await?.into_iter().next())
    }

    /// First descendant matching `selector`, or `ElementNotFound`
    async fn find_within(&self, element: &Self::Element, selector: &str) -> Result<Self::Element> {
        self.query_within(element, selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| crate::Error::ElementNotFound(selector.to_string()))
    }
}

/// A page owned exclusively by one search run
#[async_trait]
pub trait PageSession: BookingPage {
    /// Release the browser behind the page
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Opens fresh page sessions
#[async_trait]
pub trait PageLauncher: Send + Sync {
    type Session: PageSession;

    async fn open(&self) -> Result<Self::Session>;
}
