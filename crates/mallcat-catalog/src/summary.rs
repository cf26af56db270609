//! Run summaries: aggregate counts over a registered batch, written as JSON.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use mallcat_core::ProductRecord;
use serde::Serialize;

use crate::error::CatalogError;
use crate::merge::MergeCounts;
use crate::store::write_pretty_json;

const SAMPLE_NAME_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCounts {
    /// Raw items the scrape produced before record building.
    pub scraped: usize,
    pub new: usize,
    pub skipped: usize,
    pub updated: usize,
    pub total_after: usize,
}

/// Price statistics over records with a positive price. All `None` for an
/// empty batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceStats {
    pub min: Option<u64>,
    pub max: Option<u64>,
    pub mean: Option<u64>,
    pub with_price: usize,
    pub with_discount: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSample {
    pub id: String,
    pub name: String,
    pub price: u64,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub timestamp: DateTime<Utc>,
    pub mall: String,
    pub counts: RunCounts,
    pub categories: BTreeMap<String, usize>,
    pub price_stats: PriceStats,
    pub samples: Vec<RecordSample>,
}

/// Builds the summary for one mall's registration run. `records` is the set
/// of records newly added to the catalog.
#[must_use]
pub fn summarize(
    mall: &str,
    scraped: usize,
    counts: &MergeCounts,
    records: &[ProductRecord],
    sample_size: usize,
    timestamp: DateTime<Utc>,
) -> RunSummary {
    RunSummary {
        timestamp,
        mall: mall.to_owned(),
        counts: RunCounts {
            scraped,
            new: counts.new,
            skipped: counts.skipped,
            updated: counts.updated,
            total_after: counts.total_after,
        },
        categories: category_histogram(records.iter().map(|r| r.category.as_str())),
        price_stats: price_stats(records),
        samples: records
            .iter()
            .take(sample_size)
            .map(|r| RecordSample {
                id: r.id.clone(),
                name: truncate_name(&r.name),
                price: r.price,
                category: r.category.clone(),
            })
            .collect(),
    }
}

/// Count per category, sorted by category name.
pub fn category_histogram<'a>(categories: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut histogram = BTreeMap::new();
    for category in categories {
        *histogram.entry(category.to_owned()).or_insert(0) += 1;
    }
    histogram
}

#[must_use]
pub fn price_stats(records: &[ProductRecord]) -> PriceStats {
    let prices: Vec<u64> = records.iter().map(|r| r.price).filter(|&p| p > 0).collect();
    let with_discount = records.iter().filter(|r| r.has_discount()).count();
    if prices.is_empty() {
        return PriceStats {
            with_discount,
            ..PriceStats::default()
        };
    }

    // Accumulated in u128 so the sum of u64 prices cannot overflow.
    let n = prices.len() as u128;
    let sum: u128 = prices.iter().map(|&p| u128::from(p)).sum();
    let mean = u64::try_from((sum + n / 2) / n).unwrap_or(u64::MAX);
    PriceStats {
        min: prices.iter().min().copied(),
        max: prices.iter().max().copied(),
        mean: Some(mean),
        with_price: prices.len(),
        with_discount,
    }
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() <= SAMPLE_NAME_MAX_CHARS {
        return name.to_owned();
    }
    let mut short: String = name.chars().take(SAMPLE_NAME_MAX_CHARS).collect();
    short.push_str("...");
    short
}

/// Writes any summary artifact as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`CatalogError`] if serialization or the write fails.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CatalogError> {
    write_pretty_json(path, value)?;
    tracing::debug!(path = %path.display(), "summary written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mallcat_core::MallRef;

    use super::*;

    fn record(id: &str, name: &str, price: u64, original: Option<u64>, category: &str) -> ProductRecord {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        ProductRecord {
            id: id.to_owned(),
            name: name.to_owned(),
            price,
            original_price: original,
            discount_rate: None,
            image_url: String::new(),
            product_url: String::new(),
            category: category.to_owned(),
            tags: std::collections::BTreeSet::new(),
            mall: MallRef {
                id: "gochang".to_owned(),
                name: "고창마켓".to_owned(),
                url: "https://noblegochang.com".to_owned(),
                region: "전라북도 고창군".to_owned(),
            },
            in_stock: true,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn summarizes_counts_histogram_and_prices() {
        let records = vec![
            record("gochang_1", "고창 수박 8kg", 25_000, Some(30_000), "농산물"),
            record("gochang_2", "복분자즙 30포", 40_001, None, "가공식품"),
            record("gochang_3", "고창 멜론 2입", 18_000, None, "농산물"),
        ];
        let counts = MergeCounts {
            new: 3,
            skipped: 2,
            updated: 0,
            total_after: 10,
        };
        let summary = summarize("gochang", 5, &counts, &records, 2, Utc::now());

        assert_eq!(summary.counts.scraped, 5);
        assert_eq!(summary.counts.total_after, 10);
        assert_eq!(summary.categories.get("농산물"), Some(&2));
        assert_eq!(summary.categories.keys().next().map(String::as_str), Some("가공식품"));
        assert_eq!(summary.price_stats.min, Some(18_000));
        assert_eq!(summary.price_stats.max, Some(40_001));
        // (25000 + 40001 + 18000) / 3 = 27667 after rounding.
        assert_eq!(summary.price_stats.mean, Some(27_667));
        assert_eq!(summary.price_stats.with_discount, 1);
        assert_eq!(summary.samples.len(), 2);
    }

    #[test]
    fn empty_batch_has_null_price_stats() {
        let summary = summarize("gochang", 0, &MergeCounts::default(), &[], 5, Utc::now());
        assert_eq!(summary.price_stats, PriceStats::default());
        let value = serde_json::to_value(&summary).unwrap();
        assert!(value["priceStats"]["min"].is_null());
        assert!(value["counts"].get("totalAfter").is_some());
    }

    #[test]
    fn long_sample_names_are_truncated() {
        let long = "가".repeat(60);
        let records = vec![record("gochang_1", &long, 1_000, None, "기타")];
        let summary = summarize("gochang", 1, &MergeCounts::default(), &records, 5, Utc::now());
        let name = &summary.samples[0].name;
        assert_eq!(name.chars().count(), 53);
        assert!(name.ends_with("..."));
    }

    #[test]
    fn mean_of_huge_prices_does_not_overflow() {
        let records = vec![
            record("gochang_1", "고창 한우 선물세트", u64::MAX - 1, None, "축산물"),
            record("gochang_2", "고창 한우 특선세트", u64::MAX - 3, None, "축산물"),
        ];
        let stats = price_stats(&records);
        assert_eq!(stats.max, Some(u64::MAX - 1));
        assert_eq!(stats.mean, Some(u64::MAX - 2));
    }
}
