use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mall metadata embedded in every catalog record. The product refers to the
/// mall; it never owns the mall's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MallRef {
    /// Mall slug, e.g. `"kkimchi"`. Also the prefix of every record id.
    pub id: String,
    /// Display name, e.g. `"광주김치몰"`.
    pub name: String,
    /// Mall base URL.
    pub url: String,
    pub region: String,
}

/// A normalized product, the unit persisted to the shared catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// `<mall slug>_<product code>`, unique within the catalog.
    pub id: String,
    pub name: String,
    /// Current price in won. Zero means "no valid price".
    pub price: u64,
    /// Pre-discount price; only present when strictly greater than `price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<u64>,
    /// Whole-percent discount derived from `original_price` and `price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<u8>,
    pub image_url: String,
    pub product_url: String,
    pub category: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub mall: MallRef,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_in_stock() -> bool {
    true
}

/// Lower-cased name with all whitespace removed; the secondary
/// de-duplication key across scrape runs.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl ProductRecord {
    /// Returns `true` when the record has a non-blank name and a positive price.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && self.price > 0
    }

    /// Returns `true` if a pre-discount price above the current price is set.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.original_price.is_some_and(|orig| orig > self.price)
    }
}
