use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Bounds for polling waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Fixed-interval poller with a hard timeout
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    config: WaitConfig,
}

impl Waiter {
    pub fn new(config: WaitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> WaitConfig {
        self.config
    }

    /// Poll `probe` until it yields a value
    ///
    /// `Ok(None)` and [`Error::ElementNotFound`] mean "not yet" and are retried
    /// every poll interval; any other error ends the wait immediately. The
    /// probe always runs at least once.
    pub async fn until<T, F, Fut>(&self, what: &str, mut probe: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let started = Instant::now();

        loop {
            match probe().await {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(Error::ElementNotFound(selector)) => {
                    tracing::trace!("Still waiting for {} ({} not rendered)", what, selector);
                }
                Err(e) => return Err(e),
            }

            if started.elapsed() >= self.config.timeout {
                return Err(Error::ExtractionTimeout {
                    what: what.to_string(),
                    after: self.config.timeout,
                });
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}
