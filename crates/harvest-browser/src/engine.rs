use crate::actions::{extract_domain, scroll_script, BrowserActions};
use crate::error::{BrowserError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use harvest_core::BrowserConfig;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Browser automation engine.
///
/// Owns one Chromium process and one page. Call [`BrowserEngine::close`] when
/// done; if the engine is dropped instead (early return, panic), the CDP
/// handler task is aborted and chromiumoxide kills the child process.
pub struct BrowserEngine {
    browser: Browser,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    navigation_timeout: Duration,
}

impl BrowserEngine {
    /// Launch Chromium with the given settings and open a blank page.
    pub async fn launch(settings: &BrowserConfig) -> Result<Self> {
        let config = chromium_config(settings)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("CDP handler event error: {}", e);
                }
            }
        });

        let mut engine = Self {
            browser,
            page: None,
            handler: Some(handler),
            navigation_timeout: Duration::from_secs(settings.navigation_timeout_secs),
        };

        match engine.browser.new_page("about:blank").await {
            Ok(page) => {
                engine.page = Some(page);
                tracing::debug!("Browser session started");
                Ok(engine)
            }
            Err(e) => {
                engine.close().await;
                Err(BrowserError::ChromiumError(e.to_string()))
            }
        }
    }

    /// Close the page and the browser, then reap the process.
    ///
    /// Failures while closing are logged, never returned: by the time a
    /// session is being torn down there is nothing left for the caller to do.
    pub async fn close(mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::warn!("Failed to close page: {}", e);
            }
        }
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Failed to wait for browser exit: {}", e);
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        tracing::debug!("Browser session closed");
    }

    fn page(&self) -> Result<&Page> {
        self.page.as_ref().ok_or(BrowserError::Closed)
    }
}

impl Drop for BrowserEngine {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            tracing::debug!("Browser session dropped without close, aborting handler");
            handler.abort();
        }
    }
}

#[async_trait::async_trait]
impl BrowserActions for BrowserEngine {
    async fn navigate(&self, url: &str) -> Result<()> {
        let domain = extract_domain(url)?;
        tracing::info!("Navigating to {}", domain);

        let page = self.page()?;
        tokio::time::timeout(self.navigation_timeout, async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .await
        .map_err(|_| {
            BrowserError::Timeout(format!(
                "navigation to {} exceeded {:?}",
                domain, self.navigation_timeout
            ))
        })?
        .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))
    }

    async fn scroll_by(&self, pixels: u32) -> Result<()> {
        self.page()?
            .evaluate(scroll_script(pixels))
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?;
        Ok(())
    }

    async fn has_element(&self, selector: &str) -> Result<bool> {
        let elements = self
            .page()?
            .find_elements(selector)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(!elements.is_empty())
    }

    async fn page_source(&self) -> Result<String> {
        self.page()?
            .content()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }
}

fn chromium_config(settings: &BrowserConfig) -> Result<ChromiumConfig> {
    let mut builder = ChromiumConfig::builder()
        .no_sandbox()
        .window_size(settings.window_width, settings.window_height)
        .request_timeout(Duration::from_secs(settings.navigation_timeout_secs));

    if !settings.headless {
        builder = builder.with_head();
    }
    if let Some(path) = &settings.chrome_executable {
        builder = builder.chrome_executable(path);
    }

    builder.build().map_err(BrowserError::ChromiumError)
}
