//! Item enrichment stage: URL index -> item records.
//!
//! Item pages are fetched one at a time over plain HTTP with a browser-like
//! header set, parsed field by field, and paced with randomized sleeps.
//! A page that still fails after the configured attempts becomes a record
//! holding only its URL, so one bad item never costs the rest of the batch.
//! Records are written once, after the last item.

use crate::error::Result;
use crate::pacing::Pacer;
use crate::parser::ItemPageParser;
use crate::stage::Stage;
use harvest_core::{artifact, AppConfig, ItemRecord, UrlIndex};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

/// Visits every indexed URL and writes the result set.
pub struct ItemEnrichment {
    input: PathBuf,
    output: PathBuf,
    client: Client,
    parser: ItemPageParser,
    pacer: Pacer,
    max_retries: u32,
    retry_delay: Duration,
}

impl ItemEnrichment {
    /// Build the HTTP client and compile the item-page selectors.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&config.http.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_str(&config.http.accept)?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()?;

        Ok(Self {
            input: config.output.url_index_path(),
            output: config.output.result_path(),
            client,
            parser: ItemPageParser::new(&config.selectors)?,
            pacer: Pacer::new(&config.pacing),
            max_retries: config.http.max_retries,
            retry_delay: Duration::from_millis(config.http.retry_delay_ms),
        })
    }

    /// Enrich every indexed URL and persist the records, returning how many
    /// were written.
    pub async fn run(&self) -> Result<usize> {
        let index: UrlIndex = artifact::read_json(&self.input)?;
        let total = index.len();
        let mut records = Vec::with_capacity(total);

        for (ordinal, url) in index.iter() {
            let record = match self.fetch_with_retry(url).await {
                Ok(html) => self.parser.parse(url, &html),
                Err(e) => {
                    tracing::warn!("Giving up on item {} ({}): {}", ordinal, url, e);
                    ItemRecord::unfetched(url)
                }
            };
            records.push(record);

            self.pacer.pause(ordinal).await;
            tracing::info!("Processed: {}/{}", ordinal, total);
        }

        artifact::write_json(&self.output, &records)?;
        tracing::info!(
            "Wrote {} item records to {}",
            records.len(),
            self.output.display()
        );
        Ok(records.len())
    }

    /// Fetch a page, retrying failures with linear backoff.
    async fn fetch_with_retry(&self, url: &str) -> Result<String> {
        let mut attempt: u32 = 1;
        loop {
            match self.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt >= self.max_retries => return Err(e),
                Err(e) => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        "Fetch failed for {} (attempt {}/{}), retrying in {:?}: {}",
                        url,
                        attempt,
                        self.max_retries,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Linear backoff before the attempt after `attempt`.
    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay.saturating_mul(attempt)
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait::async_trait]
impl Stage for ItemEnrichment {
    async fn execute(&self) {
        if let Err(e) = self.run().await {
            tracing::error!("Item enrichment failed: {}", e);
        }
    }
}
