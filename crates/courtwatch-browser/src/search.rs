use crate::engine::NavigationEngine;
use crate::page::{BookingPage, PageLauncher, PageSession};
use crate::wait::{WaitConfig, Waiter};
use crate::{Error, Result};
use async_trait::async_trait;
use courtwatch_core::report::{format_body, format_subject, TIMESTAMP_FORMAT};
use courtwatch_core::{ResultSet, SearchCriteria};
use url::Url;

/// Where the booking site lives and how patiently to wait on it
#[derive(Debug, Clone, Default)]
pub struct SiteConfig {
    pub url: Option<String>,
    pub wait: WaitConfig,
}

impl SiteConfig {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url,
            wait: WaitConfig::default(),
        }
    }

    pub fn with_wait(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// The validated target URL
    pub fn target_url(&self) -> Result<Url> {
        let raw = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                Error::Configuration(
                    "BADMINTON_URL is not specified or empty. Need URL for scraping.".to_string(),
                )
            })?;

        Url::parse(raw)
            .map_err(|e| Error::Configuration(format!("Invalid booking URL '{}': {}", raw, e)))
    }
}

/// Receives the results of a successful search
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<()>;
}

/// Result of one search run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub results: ResultSet,
    pub found: bool,
}

/// Runs complete searches: open a session, traverse, release, notify
pub struct SearchOrchestrator<'a, L: PageLauncher, N: Notifier + ?Sized> {
    config: &'a SiteConfig,
    launcher: &'a L,
    notifier: &'a N,
}

impl<'a, L: PageLauncher, N: Notifier + ?Sized> SearchOrchestrator<'a, L, N> {
    pub fn new(config: &'a SiteConfig, launcher: &'a L, notifier: &'a N) -> Self {
        Self {
            config,
            launcher,
            notifier,
        }
    }

    /// One full search
    ///
    /// The session is closed whether or not the traversal succeeds. A failed
    /// run never notifies and never returns partial results.
    pub async fn run_once(&self, criteria: &SearchCriteria) -> Result<SearchOutcome> {
        let url = self.config.target_url()?;

        tracing::info!(
            "Running search with minDuration={} startDateTime={} endDateTime={} courtsToExclude={}",
            criteria.min_duration(),
            criteria.start().format(TIMESTAMP_FORMAT),
            criteria.end().format(TIMESTAMP_FORMAT),
            criteria.excluded_list()
        );

        let session = self.launcher.open().await?;
        let traversal = search_page(&session, &url, self.config.wait, criteria).await;
        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close browser session: {}", e);
        }
        let results = traversal?;

        if results.is_empty() {
            tracing::info!("No available times found");
        } else {
            tracing::info!("Found {} available time slots", results.len());
            self.notifier
                .notify(&format_subject(criteria), &format_body(&results))
                .await?;
        }

        Ok(SearchOutcome {
            found: !results.is_empty(),
            results,
        })
    }
}

/// Load the booking site in `page` and collect every matching slot
pub async fn search_page<P: BookingPage>(
    page: &P,
    url: &Url,
    wait: WaitConfig,
    criteria: &SearchCriteria,
) -> Result<ResultSet> {
    tracing::debug!("Opening {}", url);
    page.goto(url.as_str()).await?;

    NavigationEngine::new(page, Waiter::new(wait))
        .run(criteria.clone())
        .await
}
