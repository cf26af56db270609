//! Catalog maintenance commands: whole-mall removal and verification.

use mallcat_catalog::{remove_mall_records, verify_mall, write_json, Catalog, VerificationReport};
use mallcat_core::{AppConfig, MallConfig};

use crate::output;

/// `remove --mall ID`.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, backed up or written.
pub(crate) fn run_remove(config: &AppConfig, mall: &MallConfig) -> anyhow::Result<()> {
    let outcome = remove_mall_records(&config.catalog_path, &config.resolved_backup_dir(), &mall.id)?;
    if outcome.removed == 0 {
        println!("{}: no records in catalog; nothing removed", mall.id);
        return Ok(());
    }
    println!(
        "{}: removed {} records, catalog total {}",
        mall.id, outcome.removed, outcome.total_after
    );
    if let Some(backup) = outcome.backup_path {
        println!("  backup: {}", backup.display());
    }
    Ok(())
}

/// `verify --mall ID`: prints the report and writes `<mall>-verification.json`.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the report written.
pub(crate) fn run_verify(config: &AppConfig, mall: &MallConfig) -> anyhow::Result<()> {
    let catalog = Catalog::load(&config.catalog_path)?;
    let report = verify_mall(&catalog, &mall.id, config.summary_sample_size);
    write_json(
        &output::verification_path(&config.output_dir, &mall.id),
        &report,
    )?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &VerificationReport) {
    println!("{}: {} records", report.mall, report.total);
    if report.total == 0 {
        return;
    }
    println!(
        "  with price {}, with image {}, with tags {}",
        report.with_price, report.with_image, report.with_tags
    );
    let bands = &report.price_bands;
    println!(
        "  <10k {}, 10k-30k {}, 30k-50k {}, >=50k {}",
        bands.under_10k, bands.from_10k_to_30k, bands.from_30k_to_50k, bands.from_50k
    );
    for (category, count) in &report.categories {
        println!("  {category}: {count}");
    }
    for sample in &report.samples {
        println!("  - {} {} ({}원)", sample.id, sample.name, sample.price);
    }
    if report.is_clean() {
        println!("  ✓ no issues");
    } else {
        println!("  ✗ {} issues", report.issues.len());
        for issue in &report.issues {
            println!("    {}: {}", issue.id, issue.problem);
        }
    }
}
