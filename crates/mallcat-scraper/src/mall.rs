//! Per-mall scrape loop: category pages in order, then listing pages.

use std::collections::HashSet;
use std::time::Duration;

use mallcat_core::{normalize_name, MallConfig};

use crate::client::MallClient;
use crate::error::ScraperError;
use crate::extract::{extract_products, CompiledSelectors};
use crate::pagination::page_url;
use crate::types::{PageFailure, RawProduct, ScrapeReport};

const DEFAULT_PAGE_PARAM: &str = "page";

/// Scrapes one mall according to its configuration.
///
/// Requests are strictly sequential; every request after the first waits the
/// mall's request delay.
pub struct MallScraper<'a> {
    client: &'a MallClient,
    mall: &'a MallConfig,
    selectors: CompiledSelectors,
    request_delay: Duration,
}

impl<'a> MallScraper<'a> {
    /// Compiles the mall's selectors. `default_delay_ms` applies unless the
    /// mall sets its own `request_delay_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if a configured selector is
    /// not valid CSS.
    pub fn new(
        client: &'a MallClient,
        mall: &'a MallConfig,
        default_delay_ms: u64,
    ) -> Result<Self, ScraperError> {
        let selectors = CompiledSelectors::compile(&mall.selectors)?;
        let delay_ms = mall.request_delay_ms.unwrap_or(default_delay_ms);
        Ok(Self {
            client,
            mall,
            selectors,
            request_delay: Duration::from_millis(delay_ms),
        })
    }

    /// Walks every configured category (or the base URL when none are
    /// configured) and returns the de-duplicated items found.
    ///
    /// A category stops at the first page that is empty, yields only items
    /// already seen, or fails to fetch. Fetch failures are recorded in the
    /// report rather than returned.
    pub async fn scrape(&self) -> ScrapeReport {
        let mall_id = self.mall.id.as_str();
        let targets: Vec<(Option<&str>, &str)> = if self.mall.category_pages.is_empty() {
            vec![(None, self.mall.base_url.as_str())]
        } else {
            self.mall
                .category_pages
                .iter()
                .map(|c| (Some(c.name.as_str()), c.url.as_str()))
                .collect()
        };
        let param = self
            .mall
            .pagination
            .as_ref()
            .map_or(DEFAULT_PAGE_PARAM, |p| p.param.as_str());
        let max_pages = self.mall.max_pages();

        let mut report = ScrapeReport {
            mall_id: mall_id.to_owned(),
            ..ScrapeReport::default()
        };
        let mut seen: HashSet<String> = HashSet::new();
        let mut requests_sent = 0usize;

        for (label, category_url) in targets {
            tracing::info!(mall = %mall_id, category = label.unwrap_or("-"), "scraping category");

            for page in 1..=max_pages {
                let url = match page_url(category_url, param, page) {
                    Ok(url) => url,
                    Err(e) => {
                        tracing::warn!(mall = %mall_id, url = category_url, error = %e, "skipping category");
                        report.failures.push(PageFailure {
                            url: category_url.to_owned(),
                            error: e.to_string(),
                        });
                        break;
                    }
                };

                if requests_sent > 0 && !self.request_delay.is_zero() {
                    tokio::time::sleep(self.request_delay).await;
                }
                requests_sent += 1;

                let html = match self.client.fetch_html(&url).await {
                    Ok(html) => html,
                    Err(e) => {
                        tracing::warn!(mall = %mall_id, url = %url, error = %e, "page fetch failed");
                        report.failures.push(PageFailure {
                            url,
                            error: e.to_string(),
                        });
                        break;
                    }
                };
                report.pages_fetched += 1;

                let items = extract_products(&html, &self.selectors, &self.mall.base_url, label);
                if items.is_empty() {
                    tracing::debug!(mall = %mall_id, url = %url, "no items; end of category");
                    break;
                }

                let found = items.len();
                let mut added = 0usize;
                for item in items {
                    if seen.insert(dedup_key(&item)) {
                        report.products.push(item);
                        added += 1;
                    }
                }
                tracing::debug!(mall = %mall_id, url = %url, found, added, "page extracted");

                if added == 0 {
                    break;
                }
            }
        }

        tracing::info!(
            mall = %mall_id,
            products = report.products.len(),
            pages = report.pages_fetched,
            failures = report.failures.len(),
            "scrape finished"
        );
        report
    }

    /// Fetches the mall's front page for offline selector debugging.
    ///
    /// # Errors
    ///
    /// Propagates any fetch error from [`MallClient::fetch_html`].
    pub async fn fetch_homepage(&self) -> Result<String, ScraperError> {
        self.client.fetch_html(&self.mall.base_url).await
    }
}

/// Within-run identity of a raw item: its product URL, else its normalized name.
fn dedup_key(item: &RawProduct) -> String {
    if item.link_href.is_empty() {
        format!("name:{}", normalize_name(&item.name))
    } else {
        item.link_href.clone()
    }
}
