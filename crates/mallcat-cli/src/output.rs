//! Output file layout under the configured output directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use mallcat_scraper::RawProduct;

pub(crate) fn products_path(output_dir: &Path, mall_id: &str) -> PathBuf {
    output_dir.join(format!("{mall_id}-products.json"))
}

pub(crate) fn scrape_summary_path(output_dir: &Path, mall_id: &str) -> PathBuf {
    output_dir.join(format!("{mall_id}-scrape-summary.json"))
}

pub(crate) fn registration_summary_path(output_dir: &Path, mall_id: &str) -> PathBuf {
    output_dir.join(format!("{mall_id}-registration-summary.json"))
}

pub(crate) fn verification_path(output_dir: &Path, mall_id: &str) -> PathBuf {
    output_dir.join(format!("{mall_id}-verification.json"))
}

pub(crate) fn homepage_path(output_dir: &Path, mall_id: &str) -> PathBuf {
    output_dir.join(format!("{mall_id}-homepage.html"))
}

/// Reads a `<mall>-products.json` file written by `scrape`.
///
/// # Errors
///
/// Returns an error if the file is missing or not a JSON array of raw products.
pub(crate) fn read_raw_products(path: &Path) -> anyhow::Result<Vec<RawProduct>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read raw products from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a raw products array", path.display()))
}

/// Writes text to `path`, creating the parent directory.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub(crate) fn write_text(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
