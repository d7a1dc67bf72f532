use crate::page::PageLauncher;
use crate::session::ChromeSession;
use crate::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;

/// Starts a headless Chrome for each search run
pub struct ChromeLauncher {
    chrome_path: Option<PathBuf>,
    request_timeout: Duration,
}

impl ChromeLauncher {
    /// Create a new ChromeLauncher; `None` lets chromiumoxide locate Chrome
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self {
            chrome_path,
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Extra Chrome command-line arguments on top of headless + no-sandbox
    fn build_args(&self) -> Vec<String> {
        vec![
            "--disable-gpu".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-extensions".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
        ]
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(self.request_timeout)
            .window_size(1280, 900);

        for arg in self.build_args() {
            builder = builder.arg(arg);
        }

        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(|e| Error::Browser(format!("Failed to build browser config: {}", e)))
    }
}

#[async_trait]
impl PageLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn open(&self) -> Result<ChromeSession> {
        let config = self.browser_config()?;

        tracing::info!("Launching headless Chrome");
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))?;

        // The handler must be polled for any browser command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(e.into());
            }
        };

        tracing::debug!("Chrome ready");
        Ok(ChromeSession::new(browser, page, handler_task))
    }
}
