//! Render capture stage: load the dynamic results page until it is complete.
//!
//! The results list grows as the viewport scrolls. It is considered complete
//! once the sentinel element (the "nothing more to load" marker) is in the
//! DOM; only then is the markup captured.

use crate::error::{Result, StageError};
use crate::stage::Stage;
use harvest_browser::{BrowserActions, BrowserEngine};
use harvest_core::{artifact, AppConfig, BrowserConfig, RenderConfig};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Drives a browser session over the target page and writes its markup.
pub struct RenderCapture {
    target_url: String,
    browser: BrowserConfig,
    render: RenderConfig,
    sentinel: String,
    output: PathBuf,
}

impl RenderCapture {
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self {
            target_url: config.target.url.clone(),
            browser: config.browser.clone(),
            render: config.render.clone(),
            sentinel: config.selectors.sentinel.clone(),
            output: config.output.capture_path(),
        }
    }

    /// Launch a session, capture, and close the session whatever happened.
    pub async fn run(&self) -> Result<()> {
        let engine = BrowserEngine::launch(&self.browser).await?;
        let result = self.capture(&engine).await;
        engine.close().await;
        result
    }

    /// Capture using an already-open session.
    pub async fn capture<B>(&self, browser: &B) -> Result<()>
    where
        B: BrowserActions + ?Sized,
    {
        browser.navigate(&self.target_url).await?;
        let html = scroll_until_sentinel(browser, &self.sentinel, &self.render).await?;

        artifact::write_text(&self.output, &html)?;
        tracing::info!("Captured results page into {}", self.output.display());
        Ok(())
    }
}

#[async_trait::async_trait]
impl Stage for RenderCapture {
    async fn execute(&self) {
        if let Err(e) = self.run().await {
            tracing::error!("Render capture failed: {}", e);
        }
    }
}

/// Scroll, check for the sentinel, wait, repeat. Returns the page markup
/// once the sentinel is present.
///
/// With `max_scroll_attempts` unset this never gives up.
pub async fn scroll_until_sentinel<B>(
    browser: &B,
    sentinel: &str,
    render: &RenderConfig,
) -> Result<String>
where
    B: BrowserActions + ?Sized,
{
    let started = Instant::now();
    let poll = Duration::from_millis(render.poll_interval_ms);
    let mut attempts: u32 = 0;

    loop {
        browser.scroll_by(render.scroll_step_px).await?;
        attempts += 1;

        if browser.has_element(sentinel).await? {
            tracing::debug!(
                "Sentinel '{}' found after {} scrolls ({:?})",
                sentinel,
                attempts,
                started.elapsed()
            );
            return Ok(browser.page_source().await?);
        }

        if render.max_scroll_attempts.is_some_and(|max| attempts >= max) {
            return Err(StageError::SentinelNotFound {
                selector: sentinel.to_string(),
                attempts,
                elapsed: started.elapsed(),
            });
        }

        if attempts % 25 == 0 {
            tracing::debug!("Still scrolling, {} attempts so far", attempts);
        }
        tokio::time::sleep(poll).await;
    }
}
