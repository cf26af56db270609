//! Post-registration check of one mall's catalog entries.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use crate::store::{entry_id, entry_name, Catalog};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBands {
    pub under_10k: usize,
    pub from_10k_to_30k: usize,
    pub from_30k_to_50k: usize,
    pub from_50k: usize,
}

impl PriceBands {
    fn add(&mut self, price: u64) {
        match price {
            0..=9_999 => self.under_10k += 1,
            10_000..=29_999 => self.from_10k_to_30k += 1,
            30_000..=49_999 => self.from_30k_to_50k += 1,
            _ => self.from_50k += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySample {
    pub id: String,
    pub name: String,
    pub price: u64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryIssue {
    pub id: String,
    pub problem: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub mall: String,
    pub total: usize,
    pub with_price: usize,
    pub with_image: usize,
    pub with_tags: usize,
    pub categories: BTreeMap<String, usize>,
    pub tags: BTreeSet<String>,
    pub price_bands: PriceBands,
    pub samples: Vec<EntrySample>,
    pub issues: Vec<EntryIssue>,
}

impl VerificationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Inspects every entry attributed to `mall_id`.
#[must_use]
pub fn verify_mall(catalog: &Catalog, mall_id: &str, sample_size: usize) -> VerificationReport {
    let mut report = VerificationReport {
        mall: mall_id.to_owned(),
        ..VerificationReport::default()
    };

    for entry in catalog.mall_entries(mall_id) {
        report.total += 1;
        let id = entry_id(entry).unwrap_or("?").to_owned();
        let name = entry_name(entry).unwrap_or_default();
        let price = entry.get("price").and_then(Value::as_u64).unwrap_or(0);
        let category = entry
            .get("category")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let image = entry
            .get("imageUrl")
            .or_else(|| entry.get("image"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let tags: Vec<&str> = entry
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut problems = Vec::new();
        if name.trim().is_empty() {
            problems.push("missing name".to_owned());
        }
        if price > 0 {
            report.with_price += 1;
            report.price_bands.add(price);
        } else {
            problems.push("missing price".to_owned());
        }
        if image.is_empty() {
            problems.push("missing image".to_owned());
        } else {
            report.with_image += 1;
        }
        if tags.is_empty() {
            problems.push("missing tags".to_owned());
        } else {
            report.with_tags += 1;
            report.tags.extend(tags.iter().map(|t| (*t).to_owned()));
        }
        if let Some(original) = entry.get("originalPrice").and_then(Value::as_u64) {
            if original <= price {
                problems.push(format!("originalPrice {original} is not above price {price}"));
            }
        }

        if !category.is_empty() {
            *report.categories.entry(category.to_owned()).or_insert(0) += 1;
        }
        if report.samples.len() < sample_size {
            report.samples.push(EntrySample {
                id: id.clone(),
                name: name.to_owned(),
                price,
                category: category.to_owned(),
            });
        }
        report
            .issues
            .extend(problems.into_iter().map(|problem| EntryIssue { id: id.clone(), problem }));
    }

    tracing::info!(
        mall = %mall_id,
        total = report.total,
        issues = report.issues.len(),
        "verification finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn reports_bands_tags_and_issues() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("products.json");
        std::fs::write(
            &path,
            json!([
                {"id": "taebaek_1", "name": "태백 한우 등심 500g", "price": 59000,
                 "imageUrl": "https://x/1.jpg", "category": "축산물",
                 "tags": ["한우", "강원도 태백시"], "mall": {"id": "taebaek"}},
                {"id": "taebaek_2", "name": "고랭지 배추 3포기", "price": 9000,
                 "originalPrice": 9000, "imageUrl": "https://x/2.jpg", "category": "농산물",
                 "tags": ["강원도 태백시"], "mall": {"id": "taebaek"}},
                {"id": "taebaek_3", "title": "곤드레 나물", "mallId": "taebaek"},
                {"id": "kkimchi_1", "name": "포기김치", "price": 30000, "mall": {"id": "kkimchi"}}
            ])
            .to_string(),
        )
        .unwrap();
        let catalog = Catalog::load(&path).unwrap();

        let report = verify_mall(&catalog, "taebaek", 2);

        assert_eq!(report.total, 3);
        assert_eq!(report.with_price, 2);
        assert_eq!(report.with_image, 2);
        assert_eq!(report.with_tags, 2);
        assert_eq!(report.price_bands.under_10k, 1);
        assert_eq!(report.price_bands.from_50k, 1);
        assert_eq!(report.tags.len(), 2);
        assert_eq!(report.categories.len(), 2);
        assert_eq!(report.samples.len(), 2);
        assert!(!report.is_clean());
        assert!(report
            .issues
            .iter()
            .any(|i| i.id == "taebaek_2" && i.problem.starts_with("originalPrice")));
        assert_eq!(
            report.issues.iter().filter(|i| i.id == "taebaek_3").count(),
            3
        );
    }

    #[test]
    fn unknown_mall_yields_empty_report() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::load(&dir.path().join("missing.json")).unwrap();
        let report = verify_mall(&catalog, "nowhere", 5);
        assert_eq!(report.total, 0);
        assert!(report.is_clean());
    }
}
