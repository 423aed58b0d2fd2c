//! Link extraction stage: captured markup -> URL index.

use crate::error::{Result, StageError};
use crate::parser::parse_selector;
use crate::stage::Stage;
use harvest_core::{artifact, AppConfig, UrlIndex};
use scraper::Html;
use std::path::PathBuf;
use url::Url;

/// Reads the captured results page and writes the ordinal -> URL index.
///
/// Unlike enrichment there is no per-item isolation: a listing title with
/// no link fails the whole stage.
pub struct LinkExtraction {
    input: PathBuf,
    output: PathBuf,
    base_url: String,
    title_selector: String,
    link_selector: String,
}

impl LinkExtraction {
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self {
            input: config.output.capture_path(),
            output: config.output.url_index_path(),
            base_url: config.target.url.clone(),
            title_selector: config.selectors.listing_title.clone(),
            link_selector: config.selectors.listing_link.clone(),
        }
    }

    /// Extract and persist the index, returning how many URLs were found.
    pub async fn run(&self) -> Result<usize> {
        let html = artifact::read_text(&self.input)?;
        let index = extract_links(
            &html,
            &self.title_selector,
            &self.link_selector,
            &self.base_url,
        )?;

        artifact::write_json(&self.output, &index)?;
        tracing::info!(
            "Collected {} item URLs into {}",
            index.len(),
            self.output.display()
        );
        Ok(index.len())
    }
}

#[async_trait::async_trait]
impl Stage for LinkExtraction {
    async fn execute(&self) {
        if let Err(e) = self.run().await {
            tracing::error!("Link extraction failed: {}", e);
        }
    }
}

/// Build the URL index from results-page markup, in document order.
///
/// Absolute hrefs are kept verbatim; relative ones are resolved against
/// `base_url`.
pub fn extract_links(
    html: &str,
    title_selector: &str,
    link_selector: &str,
    base_url: &str,
) -> Result<UrlIndex> {
    let titles = parse_selector(title_selector)?;
    let link = parse_selector(link_selector)?;
    let document = Html::parse_document(html);

    let mut index = UrlIndex::new();
    for (i, title) in document.select(&titles).enumerate() {
        let ordinal = i + 1;
        let href = title
            .select(&link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| StageError::MissingLink {
                ordinal,
                selector: link_selector.to_string(),
            })?;
        index.push(resolve(base_url, href)?);
    }

    Ok(index)
}

fn resolve(base_url: &str, href: &str) -> Result<String> {
    if Url::parse(href).is_ok() {
        return Ok(href.to_string());
    }

    let invalid = |reason: String| StageError::InvalidUrl {
        url: href.to_string(),
        reason,
    };
    let base = Url::parse(base_url).map_err(|e| invalid(format!("bad base URL: {e}")))?;
    base.join(href)
        .map(String::from)
        .map_err(|e| invalid(e.to_string()))
}
