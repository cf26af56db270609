//! `scrape` and `snapshot` command handlers.
//!
//! Malls are scraped one after another. A mall that fails is logged and
//! skipped so the remaining malls still run.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use mallcat_catalog::{category_histogram, write_json};
use mallcat_core::{AppConfig, MallConfig};
use mallcat_scraper::{MallClient, MallScraper, PageFailure, RetryPolicy, ScrapeReport};
use serde::Serialize;

use crate::output;

/// Label used in histograms for items scraped without a category page.
const UNCATEGORIZED: &str = "(none)";

/// The `<mall>-scrape-summary.json` artifact.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScrapeSummary {
    pub timestamp: DateTime<Utc>,
    pub mall: String,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub failures: Vec<PageFailure>,
    pub raw_items: usize,
    pub categories: BTreeMap<String, usize>,
}

impl ScrapeSummary {
    pub(crate) fn from_report(report: &ScrapeReport, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            mall: report.mall_id.clone(),
            pages_fetched: report.pages_fetched,
            pages_failed: report.failures.len(),
            failures: report.failures.clone(),
            raw_items: report.products.len(),
            categories: category_histogram(
                report
                    .products
                    .iter()
                    .map(|p| p.category.as_deref().unwrap_or(UNCATEGORIZED)),
            ),
        }
    }
}

pub(crate) fn build_client(config: &AppConfig) -> anyhow::Result<MallClient> {
    let retry = RetryPolicy {
        max_retries: config.scraper_max_retries,
        backoff_base_ms: config.scraper_retry_backoff_base_ms,
    };
    MallClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        retry,
    )
    .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))
}

/// Scrapes one mall and writes `<mall>-scrape-summary.json`, then
/// `<mall>-products.json` unless no listing page could be fetched.
///
/// # Errors
///
/// Returns an error if the mall's selectors do not compile, no listing page
/// could be fetched, or an output file cannot be written.
pub(crate) async fn scrape_mall(
    client: &MallClient,
    config: &AppConfig,
    mall: &MallConfig,
    save_html: bool,
) -> anyhow::Result<ScrapeReport> {
    let scraper = MallScraper::new(client, mall, config.scraper_inter_request_delay_ms)?;

    if save_html {
        // Snapshot failures never abort the scrape itself.
        match scraper.fetch_homepage().await {
            Ok(html) => {
                let path = output::homepage_path(&config.output_dir, &mall.id);
                output::write_text(&path, &html)?;
                tracing::info!(mall = %mall.id, path = %path.display(), "homepage saved");
            }
            Err(e) => tracing::warn!(mall = %mall.id, error = %e, "homepage snapshot failed"),
        }
    }

    let report = scraper.scrape().await;
    let summary = ScrapeSummary::from_report(&report, Utc::now());
    write_json(
        &output::scrape_summary_path(&config.output_dir, &mall.id),
        &summary,
    )?;

    // The products file from the last good scrape stays in place.
    if report.pages_fetched == 0 && !report.failures.is_empty() {
        anyhow::bail!(
            "no listing page could be fetched ({} failures; first: {})",
            report.failures.len(),
            report.failures[0].error
        );
    }
    write_json(
        &output::products_path(&config.output_dir, &mall.id),
        &report.products,
    )?;
    Ok(report)
}

/// Runs [`scrape_mall`] for each selected mall.
///
/// # Errors
///
/// Returns an error if the client cannot be built or every selected mall fails.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    malls: &[&MallConfig],
    save_html: bool,
) -> anyhow::Result<()> {
    if malls.is_empty() {
        println!("no malls selected; nothing to scrape");
        return Ok(());
    }
    let client = build_client(config)?;

    let mut failed_malls = 0usize;
    for mall in malls {
        match scrape_mall(&client, config, mall, save_html).await {
            Ok(report) => println!(
                "✓ {}: {} items from {} pages ({} failed pages)",
                mall.id,
                report.products.len(),
                report.pages_fetched,
                report.failures.len()
            ),
            Err(e) => {
                tracing::error!(mall = %mall.id, error = %format!("{e:#}"), "scrape failed");
                println!("✗ {}: {e:#}", mall.id);
                failed_malls += 1;
            }
        }
    }

    if failed_malls == malls.len() {
        anyhow::bail!("all {failed_malls} malls failed to scrape");
    }
    if failed_malls > 0 {
        tracing::warn!(failed_malls, total_malls = malls.len(), "some malls failed");
    }
    Ok(())
}

/// Saves `<mall>-homepage.html`.
///
/// # Errors
///
/// Returns an error if the fetch or the write fails.
pub(crate) async fn run_snapshot(config: &AppConfig, mall: &MallConfig) -> anyhow::Result<()> {
    let path = save_homepage(config, mall).await?;
    println!("saved {}", path.display());
    Ok(())
}

async fn save_homepage(config: &AppConfig, mall: &MallConfig) -> anyhow::Result<PathBuf> {
    let client = build_client(config)?;
    let scraper = MallScraper::new(&client, mall, config.scraper_inter_request_delay_ms)?;
    let html = scraper.fetch_homepage().await?;
    let path = output::homepage_path(&config.output_dir, &mall.id);
    output::write_text(&path, &html)?;
    Ok(path)
}
