//! Pre-merge scrape output types.

use serde::{Deserialize, Serialize};

/// Raw fields resolved from one listing item, before normalization.
///
/// This is the `<mall>-products.json` schema. URLs are already absolute;
/// prices are still display text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    pub name: String,
    pub price_text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub original_price_text: String,
    #[serde(default)]
    pub image_src: String,
    #[serde(default)]
    pub link_href: String,
    /// Site category label of the listing page the item came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A listing page that could not be fetched or parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    pub url: String,
    pub error: String,
}

/// Outcome of scraping one mall.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeReport {
    pub mall_id: String,
    /// De-duplicated items in source order.
    pub products: Vec<RawProduct>,
    pub pages_fetched: usize,
    pub failures: Vec<PageFailure>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn raw_product_uses_camel_case_and_omits_empty_optionals() {
        let raw = RawProduct {
            name: "고창 수박 8kg".to_owned(),
            price_text: "25,000원".to_owned(),
            link_href: "https://noblegochang.com/product/x/12/".to_owned(),
            ..RawProduct::default()
        };
        let value = serde_json::to_value(&raw).unwrap();
        assert_eq!(value["priceText"], json!("25,000원"));
        assert_eq!(value["imageSrc"], json!(""));
        assert!(value.get("originalPriceText").is_none());
        assert!(value.get("category").is_none());
    }

    #[test]
    fn raw_product_reads_files_with_missing_fields() {
        let raw: RawProduct =
            serde_json::from_value(json!({"name": "복분자즙", "priceText": "30,000원", "category": "가공식품"}))
                .unwrap();
        assert_eq!(raw.category.as_deref(), Some("가공식품"));
        assert!(raw.link_href.is_empty());
        assert!(raw.original_price_text.is_empty());
    }

    #[test]
    fn scrape_report_serializes_failures() {
        let report = ScrapeReport {
            mall_id: "gochang".to_owned(),
            pages_fetched: 2,
            failures: vec![PageFailure {
                url: "https://noblegochang.com/category/3".to_owned(),
                error: "HTTP 503".to_owned(),
            }],
            ..ScrapeReport::default()
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["mallId"], json!("gochang"));
        assert_eq!(value["pagesFetched"], json!(2));
        assert_eq!(value["failures"][0]["error"], json!("HTTP 503"));
    }
}
