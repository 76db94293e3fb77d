//! Headless Chromium rendering
//!
//! Only available with the `browser` feature. The browser's CDP event handler
//! runs on its own task for the lifetime of the session.

use crate::config::BrowserConfig as CloneBrowserConfig;
use crate::crawler::renderer::{BrowserLauncher, BrowserSession, NavigationError, WaitUntil};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

/// Interval between `document.readyState` checks
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Launches headless Chromium
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    config: CloneBrowserConfig,
}

impl ChromeLauncher {
    pub fn new(config: CloneBrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, NavigationError> {
        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");

        if self.config.no_sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref chrome_path) = self.config.chrome_path {
            builder = builder.chrome_executable(chrome_path);
        }

        let browser_config = builder.build().map_err(NavigationError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| NavigationError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {e}");
                }
            }
        });

        info!("Headless browser launched");
        Ok(Box::new(ChromeSession {
            browser: Some(browser),
            handler_task,
        }))
    }
}

/// One Chromium process; every navigation opens its own tab
struct ChromeSession {
    browser: Option<Browser>,
    handler_task: JoinHandle<()>,
}

impl ChromeSession {
    async fn load(page: &Page, url: &Url, wait: WaitUntil) -> Result<String, NavigationError> {
        let navigated = page
            .execute(NavigateParams::new(url.as_str()))
            .await
            .map_err(|e| failed(url, e))?;

        if let Some(error_text) = navigated.result.error_text.as_ref() {
            return Err(NavigationError::Failed {
                url: url.to_string(),
                message: error_text.clone(),
            });
        }

        loop {
            let evaluated = page
                .evaluate("document.readyState")
                .await
                .map_err(|e| failed(url, e))?
                .into_value::<String>();

            if is_ready(read_ready_state(url, evaluated).as_deref(), wait) {
                break;
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }

        page.content().await.map_err(|e| failed(url, e))
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(
        &self,
        url: &Url,
        wait: WaitUntil,
        timeout: Duration,
    ) -> Result<String, NavigationError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| NavigationError::Launch("browser already closed".to_string()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| failed(url, e))?;

        let result = match tokio::time::timeout(timeout, Self::load(&page, url, wait)).await {
            Ok(result) => result,
            Err(_) => Err(NavigationError::Timeout {
                url: url.to_string(),
                timeout,
            }),
        };

        if let Err(e) = page.close().await {
            warn!("Failed to close page: {e}");
        }

        result
    }

    async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser: {e}");
            }
            if let Err(e) = browser.wait().await {
                warn!("Failed to wait for browser exit: {e}");
            }
        }
        self.handler_task.abort();
        info!("Headless browser closed");
    }
}

/// `document.readyState` from an evaluation result; an unreadable value is
/// logged and treated as not ready yet
fn read_ready_state<E: std::fmt::Display>(url: &Url, evaluated: Result<String, E>) -> Option<String> {
    match evaluated {
        Ok(state) => Some(state),
        Err(e) => {
            warn!(url = %url, "Unreadable document.readyState: {e}");
            None
        }
    }
}

fn is_ready(state: Option<&str>, wait: WaitUntil) -> bool {
    match (state, wait) {
        (Some("interactive" | "complete"), WaitUntil::DomContentLoaded) => true,
        (Some("complete"), WaitUntil::Load) => true,
        _ => false,
    }
}

fn failed(url: &Url, error: impl std::fmt::Display) -> NavigationError {
    NavigationError::Failed {
        url: url.to_string(),
        message: error.to_string(),
    }
}
