//! Per-mall scraping configuration loaded from `config/malls.yaml`.
//!
//! Each mall's markup quirks (candidate selectors, category pages,
//! pagination, price notation) are declared here and consumed by one
//! generic extraction pipeline in `mallcat-scraper`.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::products::MallRef;
use crate::ConfigError;

/// How to read a price out of text that contains more than one number.
///
/// Sources disagree: some render `"2025.01.01 12,000원"` (final price last),
/// others render `"18,600원 16,740원"` with the original first. The rule is
/// declared per mall rather than guessed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceConvention {
    /// Drop every non-digit character and parse what remains.
    #[default]
    StripAll,
    /// Take the first digit run (commas allowed inside the run).
    FirstNumber,
    /// Take the last digit run (commas allowed inside the run).
    LastNumber,
}

/// A category listing page, visited in configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPage {
    /// Site's own category label, carried onto scraped items.
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Query parameter carrying the page number, e.g. `"page"`.
    #[serde(default = "default_page_param")]
    pub param: String,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_max_pages() -> u32 {
    1
}

/// Ordered candidate selectors per semantic field. The first candidate
/// producing a plausible value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Product container candidates on a listing page.
    pub item: Vec<String>,
    pub name: Vec<String>,
    pub price: Vec<String>,
    #[serde(default)]
    pub original_price: Vec<String>,
    #[serde(default)]
    pub image: Vec<String>,
    #[serde(default)]
    pub link: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MallConfig {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub region: String,
    /// Extra tags attached to every record from this mall.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Category used when neither a label nor a keyword match applies.
    #[serde(default)]
    pub default_category: Option<String>,
    /// Site category label → controlled category.
    #[serde(default)]
    pub category_map: BTreeMap<String, String>,
    #[serde(default)]
    pub category_pages: Vec<CategoryPage>,
    #[serde(default)]
    pub pagination: Option<PaginationConfig>,
    #[serde(default)]
    pub price_convention: PriceConvention,
    /// Regex with one capture group applied to the product URL to obtain
    /// the mall's product code.
    #[serde(default)]
    pub product_id_pattern: Option<String>,
    /// Overrides the global inter-request delay for this mall.
    #[serde(default)]
    pub request_delay_ms: Option<u64>,
    pub selectors: SelectorConfig,
}

impl MallConfig {
    /// Metadata reference embedded into each record from this mall.
    #[must_use]
    pub fn mall_ref(&self) -> MallRef {
        MallRef {
            id: self.id.clone(),
            name: self.name.clone(),
            url: self.base_url.clone(),
            region: self.region.clone(),
        }
    }

    /// Maximum listing pages per category; `1` when pagination is not configured.
    #[must_use]
    pub fn max_pages(&self) -> u32 {
        self.pagination.as_ref().map_or(1, |p| p.max_pages)
    }
}

#[derive(Debug, Deserialize)]
pub struct MallsFile {
    pub malls: Vec<MallConfig>,
}

impl MallsFile {
    /// Looks up a mall by slug.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MallConfig> {
        self.malls.iter().find(|m| m.id == id)
    }
}

/// Load and validate the malls configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_malls(path: &Path) -> Result<MallsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::MallsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let malls_file: MallsFile = serde_yaml::from_str(&content)?;

    validate_malls(&malls_file)?;

    Ok(malls_file)
}

fn validate_malls(malls_file: &MallsFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();

    for mall in &malls_file.malls {
        if mall.id.is_empty()
            || !mall
                .id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "mall id '{}' must be non-empty and use only [a-z0-9_-]",
                mall.id
            )));
        }

        if mall.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "mall '{}' must have a non-empty name",
                mall.id
            )));
        }

        if !is_absolute_http_url(&mall.base_url) {
            return Err(ConfigError::Validation(format!(
                "mall '{}' has base_url '{}'; expected an absolute http(s) URL",
                mall.id, mall.base_url
            )));
        }

        for page in &mall.category_pages {
            if !is_absolute_http_url(&page.url) {
                return Err(ConfigError::Validation(format!(
                    "mall '{}' category '{}' has non-absolute url '{}'",
                    mall.id, page.name, page.url
                )));
            }
        }

        for (field, candidates) in [
            ("item", &mall.selectors.item),
            ("name", &mall.selectors.name),
            ("price", &mall.selectors.price),
        ] {
            if candidates.iter().all(|s| s.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "mall '{}' needs at least one '{field}' selector",
                    mall.id
                )));
            }
        }

        if let Some(pagination) = &mall.pagination {
            if pagination.max_pages == 0 {
                return Err(ConfigError::Validation(format!(
                    "mall '{}' has pagination.max_pages = 0; must be at least 1",
                    mall.id
                )));
            }
            if pagination.param.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "mall '{}' has an empty pagination.param",
                    mall.id
                )));
            }
        }

        if !seen_ids.insert(mall.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate mall id: '{}'",
                mall.id
            )));
        }

        if !seen_names.insert(mall.name.trim()) {
            return Err(ConfigError::Validation(format!(
                "duplicate mall name: '{}'",
                mall.name
            )));
        }
    }

    Ok(())
}

fn is_absolute_http_url(raw: &str) -> bool {
    let rest = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"));
    rest.is_some_and(|r| {
        let host = r.split(['/', '?', '#']).next().unwrap_or("");
        !host.is_empty()
    })
}

#[cfg(test)]
#[path = "malls_test.rs"]
mod tests;
