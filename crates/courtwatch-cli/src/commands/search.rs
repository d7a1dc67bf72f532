use crate::OutputFormat;
use crate::notify::MailSettings;
use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime};
use courtwatch_browser::{
    ChromeFinder, ChromeLauncher, Notifier, PageLauncher, SearchOrchestrator, SearchOutcome,
    SiteConfig, WaitConfig,
};
use courtwatch_core::parse::parse_timestamp;
use courtwatch_core::report::format_slot;
use courtwatch_core::{SearchCriteria, SlotDuration};
use std::path::PathBuf;
use std::time::Duration;

/// Days searched when no end is given
const DEFAULT_WINDOW_DAYS: i64 = 2;

/// Everything `courtwatch search` was invoked with
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub min_minutes: u32,
    pub start: Option<String>,
    pub end: Option<String>,
    pub excluded_courts: Vec<u32>,
    pub repeat: bool,
    pub interval_minutes: u64,
    pub chrome_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub url: Option<String>,
    pub mail: MailSettings,
}

impl SearchOptions {
    /// Criteria for a run starting at `now`
    ///
    /// Omitted bounds are relative to `now`, so each repeat searches a window
    /// that moves forward with time.
    pub fn criteria(&self, now: NaiveDateTime) -> Result<SearchCriteria> {
        let start = match &self.start {
            Some(text) => parse_bound("--start", text)?,
            None => now,
        };
        let end = match &self.end {
            Some(text) => parse_bound("--end", text)?,
            None => now + ChronoDuration::days(DEFAULT_WINDOW_DAYS),
        };

        let criteria = SearchCriteria::new(start, end)?
            .with_min_duration(SlotDuration::from_minutes(self.min_minutes))
            .with_excluded(self.excluded_courts.iter().copied())?;
        Ok(criteria)
    }

    fn site_config(&self) -> SiteConfig {
        let mut wait = WaitConfig::default();
        if let Some(secs) = self.timeout_secs {
            wait.timeout = Duration::from_secs(secs);
        }
        SiteConfig::new(self.url.clone()).with_wait(wait)
    }
}

fn parse_bound(flag: &str, text: &str) -> Result<NaiveDateTime> {
    parse_timestamp(text.trim())
        .with_context(|| format!("{} expects a datetime like `2024-01-02 18:00`", flag))
}

pub fn execute(options: SearchOptions, format: OutputFormat) -> Result<()> {
    tracing::debug!("Output format: {:?}", format);

    // Fail on bad arguments before any browser work
    options.criteria(Local::now().naive_local())?;
    let config = options.site_config();
    config.target_url()?;

    let chrome_path = ChromeFinder::new(options.chrome_path.clone()).find()?;
    let launcher = ChromeLauncher::new(chrome_path);
    let notifier = options.mail.notifier()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let orchestrator = SearchOrchestrator::new(&config, &launcher, notifier.as_ref());
        let outcome = if options.repeat {
            tracing::info!(
                "Repeating search every {} minutes until a result is found",
                options.interval_minutes
            );
            let interval = Duration::from_secs(options.interval_minutes * 60);
            repeat_until_found(&orchestrator, &options, interval).await?
        } else {
            let criteria = options.criteria(Local::now().naive_local())?;
            orchestrator.run_once(&criteria).await?
        };
        print_outcome(&outcome, format)
    })
}

/// Run searches until one finds a slot
///
/// Only a run that completes without matches is repeated; the first failed
/// run ends the loop with its error.
pub async fn repeat_until_found<L, N>(
    orchestrator: &SearchOrchestrator<'_, L, N>,
    options: &SearchOptions,
    interval: Duration,
) -> Result<SearchOutcome>
where
    L: PageLauncher,
    N: Notifier + ?Sized,
{
    loop {
        let criteria = options.criteria(Local::now().naive_local())?;
        let outcome = orchestrator.run_once(&criteria).await?;
        if outcome.found {
            return Ok(outcome);
        }

        tracing::info!("Waiting {} minutes", interval.as_secs() / 60);
        tokio::time::sleep(interval).await;
    }
}

fn print_outcome(outcome: &SearchOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome.results)?);
        }
        OutputFormat::Pretty => {
            if outcome.found {
                println!("Found {} available time slots:", outcome.results.len());
                for slot in &outcome.results {
                    println!("  {}", format_slot(slot));
                }
            } else {
                println!("No available times found");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ConsoleNotifier;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use courtwatch_browser::{ChromeSession, Error as BrowserError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Launcher whose browser never starts
    #[derive(Default)]
    struct BrokenLauncher {
        opens: AtomicUsize,
    }

    #[async_trait]
    impl PageLauncher for BrokenLauncher {
        type Session = ChromeSession;

        async fn open(&self) -> courtwatch_browser::Result<ChromeSession> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            Err(BrowserError::Browser("Failed to launch Chrome".to_string()))
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_default_window_is_two_days_from_now() {
        let criteria = SearchOptions::default().criteria(now()).unwrap();

        assert_eq!(criteria.start(), now());
        assert_eq!(criteria.end(), now() + ChronoDuration::days(2));
        assert!(criteria.min_duration().is_zero());
        assert!(criteria.excluded().is_empty());
    }

    #[test]
    fn test_explicit_bounds_and_exclusions() {
        let options = SearchOptions {
            min_minutes: 90,
            start: Some("2024-01-02 18:00".to_string()),
            end: Some("2024-01-02 22:00".to_string()),
            excluded_courts: vec![7, 1],
            ..Default::default()
        };

        let criteria = options.criteria(now()).unwrap();
        assert_eq!(criteria.min_duration(), SlotDuration::from_minutes(90));
        assert_eq!(criteria.start().to_string(), "2024-01-02 18:00:00");
        assert_eq!(criteria.end().to_string(), "2024-01-02 22:00:00");
        assert_eq!(criteria.excluded_list(), "1, 7");
    }

    #[test]
    fn test_unparseable_bound_names_the_flag() {
        let options = SearchOptions {
            start: Some("next tuesday".to_string()),
            ..Default::default()
        };

        let err = options.criteria(now()).unwrap_err();
        assert!(err.to_string().contains("--start"));
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let options = SearchOptions {
            start: Some("2024-01-03 08:00".to_string()),
            end: Some("2024-01-01 08:00".to_string()),
            ..Default::default()
        };

        assert!(options.criteria(now()).is_err());
    }

    #[test]
    fn test_court_zero_is_rejected() {
        let options = SearchOptions {
            excluded_courts: vec![0],
            ..Default::default()
        };

        assert!(options.criteria(now()).is_err());
    }

    #[test]
    fn test_timeout_overrides_wait() {
        let options = SearchOptions {
            timeout_secs: Some(3),
            url: Some("https://example.com".to_string()),
            ..Default::default()
        };

        let config = options.site_config();
        assert_eq!(config.wait.timeout, Duration::from_secs(3));
        assert!(config.target_url().is_ok());
    }

    #[tokio::test]
    async fn test_repeat_stops_on_first_failed_run() {
        let options = SearchOptions {
            url: Some("https://booking.test/".to_string()),
            repeat: true,
            ..Default::default()
        };
        let config = options.site_config();
        let launcher = BrokenLauncher::default();
        let orchestrator = SearchOrchestrator::new(&config, &launcher, &ConsoleNotifier);

        let err = repeat_until_found(&orchestrator, &options, Duration::from_millis(1))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to launch Chrome"));
        assert_eq!(launcher.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeat_stops_on_configuration_error() {
        let options = SearchOptions {
            repeat: true,
            ..Default::default()
        };
        let config = options.site_config();
        let launcher = BrokenLauncher::default();
        let orchestrator = SearchOrchestrator::new(&config, &launcher, &ConsoleNotifier);

        let err = repeat_until_found(&orchestrator, &options, Duration::from_millis(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BrowserError>(),
            Some(BrowserError::Configuration(_))
        ));
        assert_eq!(launcher.opens.load(Ordering::SeqCst), 0);
    }
}
