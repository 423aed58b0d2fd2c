use crate::error::{BrowserError, Result};

/// Browser actions the capture stage needs.
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Scroll the viewport down by `pixels`
    async fn scroll_by(&self, pixels: u32) -> Result<()>;

    /// Whether at least one element matches the selector right now
    async fn has_element(&self, selector: &str) -> Result<bool>;

    /// Full rendered markup of the current page
    async fn page_source(&self) -> Result<String>;
}

/// JavaScript that scrolls the window down by a fixed amount.
pub fn scroll_script(pixels: u32) -> String {
    format!("window.scrollTo(0, window.scrollY + {pixels})")
}

/// Helper to extract domain from URL
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {}", e)))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(|s| s.to_string())
}
