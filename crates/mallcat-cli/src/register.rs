//! `register` and `run` command handlers.
//!
//! Registration turns raw scraped items into records, merges them into the
//! shared catalog and writes a run summary. Items the record builder rejects
//! are counted as skipped alongside the merge's own duplicates.

use std::path::Path;

use chrono::{DateTime, Utc};
use mallcat_catalog::{register, summarize, write_json, MergeMode, RunSummary};
use mallcat_core::{AppConfig, MallConfig, ProductRecord};
use mallcat_scraper::{RawProduct, RecordBuilder};

use crate::{output, scrape};

/// Builds records for every raw item, in order. Returns the records and the
/// number of items rejected for insufficient data.
///
/// # Errors
///
/// Returns an error if the mall's product id pattern is invalid.
pub(crate) fn build_records(
    mall: &MallConfig,
    raw: &[RawProduct],
    now: DateTime<Utc>,
) -> anyhow::Result<(Vec<ProductRecord>, usize)> {
    let builder = RecordBuilder::new(mall)?;
    let mut records = Vec::with_capacity(raw.len());
    let mut rejected = 0usize;
    for item in raw {
        match builder.build(item, now) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(mall = %mall.id, error = %e, "item rejected");
                rejected += 1;
            }
        }
    }
    Ok((records, rejected))
}

/// Registers one mall's raw items into the catalog and returns the summary.
/// The summary is written to `<mall>-registration-summary.json` unless
/// `dry_run` is set.
///
/// # Errors
///
/// Returns an error if records cannot be built, the catalog cannot be loaded
/// or written, or the summary cannot be written.
pub(crate) fn register_mall(
    config: &AppConfig,
    mall: &MallConfig,
    raw: &[RawProduct],
    mode: MergeMode,
    dry_run: bool,
) -> anyhow::Result<RunSummary> {
    let now = Utc::now();
    let (records, rejected) = build_records(mall, raw, now)?;
    let outcome = register(
        &config.catalog_path,
        &config.resolved_backup_dir(),
        &records,
        mode,
        dry_run,
    )?;

    let mut counts = outcome.counts;
    counts.skipped += rejected;
    let summary = summarize(
        &mall.id,
        raw.len(),
        &counts,
        &outcome.added,
        config.summary_sample_size,
        now,
    );

    if let Some(backup) = &outcome.backup_path {
        tracing::info!(mall = %mall.id, backup = %backup.display(), "catalog backed up");
    }
    if !dry_run {
        write_json(
            &output::registration_summary_path(&config.output_dir, &mall.id),
            &summary,
        )?;
    }
    Ok(summary)
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    let prefix = if dry_run { "dry-run: " } else { "" };
    let c = &summary.counts;
    println!(
        "{prefix}{}: scraped {}, new {}, skipped {}, updated {}, catalog total {}",
        summary.mall, c.scraped, c.new, c.skipped, c.updated, c.total_after
    );
    if let (Some(min), Some(max), Some(mean)) = (
        summary.price_stats.min,
        summary.price_stats.max,
        summary.price_stats.mean,
    ) {
        println!("  price: min {min}원, max {max}원, mean {mean}원");
    }
    for (category, count) in &summary.categories {
        println!("  {category}: {count}");
    }
}

fn merge_mode(refresh: bool) -> MergeMode {
    if refresh {
        MergeMode::RefreshExisting
    } else {
        MergeMode::SkipExisting
    }
}

/// `register --mall ID`: reads the raw products file and registers it.
///
/// # Errors
///
/// Returns an error if the input file cannot be read or registration fails.
pub(crate) fn run_register(
    config: &AppConfig,
    mall: &MallConfig,
    input: Option<&Path>,
    refresh: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let default_input = output::products_path(&config.output_dir, &mall.id);
    let input = input.unwrap_or(&default_input);
    let raw = output::read_raw_products(input)?;
    tracing::info!(mall = %mall.id, input = %input.display(), items = raw.len(), "registering");

    let summary = register_mall(config, mall, &raw, merge_mode(refresh), dry_run)?;
    print_summary(&summary, dry_run);
    Ok(())
}

/// `run`: scrape then register each selected mall. A failing mall is logged
/// and skipped; catalog errors abort the whole run.
///
/// # Errors
///
/// Returns an error if every selected mall fails, or on a catalog error.
pub(crate) async fn run_pipeline(
    config: &AppConfig,
    malls: &[&MallConfig],
    refresh: bool,
) -> anyhow::Result<()> {
    if malls.is_empty() {
        println!("no malls selected; nothing to run");
        return Ok(());
    }
    let client = scrape::build_client(config)?;
    let mode = merge_mode(refresh);

    let mut failed_malls = 0usize;
    for mall in malls {
        // A bad id pattern is a per-mall config error; catch it before scraping.
        if let Err(e) = RecordBuilder::new(mall) {
            tracing::error!(mall = %mall.id, error = %e, "invalid mall configuration");
            println!("✗ {}: {e}", mall.id);
            failed_malls += 1;
            continue;
        }
        let report = match scrape::scrape_mall(&client, config, mall, false).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(mall = %mall.id, error = %format!("{e:#}"), "scrape failed");
                println!("✗ {}: {e:#}", mall.id);
                failed_malls += 1;
                continue;
            }
        };
        let summary = register_mall(config, mall, &report.products, mode, false)?;
        print_summary(&summary, false);
    }

    if failed_malls == malls.len() {
        anyhow::bail!("all {failed_malls} malls failed");
    }
    Ok(())
}

#[cfg(test)]
#[path = "register_test.rs"]
mod tests;
