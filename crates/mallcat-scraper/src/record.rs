//! Builds normalized [`ProductRecord`]s from raw scraped fields.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use mallcat_core::{normalize_name, MallConfig, MallRef, PriceConvention, ProductRecord};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::ScraperError;
use crate::price::{is_sold_out, parse_price};
use crate::select::clean_text;
use crate::taxonomy::{infer_category, infer_tags};
use crate::types::RawProduct;
use crate::url::resolve_url;

/// Query parameters that carry a product code on common Korean shop builders
/// (Cafe24, Godomall, Youngcart, MakeShop), in lookup order.
const PRODUCT_CODE_PARAMS: &[&str] = &[
    "product_no",
    "goodsNo",
    "goods_no",
    "it_id",
    "branduid",
    "no",
    "idx",
    "id",
];

static BRACKET_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid regex"));

/// Per-mall record builder. Holds everything needed to turn a [`RawProduct`]
/// into a catalog record.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    mall: MallRef,
    mall_tags: Vec<String>,
    default_category: Option<String>,
    category_map: BTreeMap<String, String>,
    price_convention: PriceConvention,
    id_pattern: Option<Regex>,
}

impl RecordBuilder {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidConfig`] if `product_id_pattern` is not a
    /// valid regex or has no capture group.
    pub fn new(mall: &MallConfig) -> Result<Self, ScraperError> {
        let id_pattern = mall
            .product_id_pattern
            .as_deref()
            .map(|pattern| compile_id_pattern(&mall.id, pattern))
            .transpose()?;

        let mut mall_tags = mall.tags.clone();
        mall_tags.push(mall.region.clone());

        Ok(Self {
            mall: mall.mall_ref(),
            mall_tags,
            default_category: mall.default_category.clone(),
            category_map: mall.category_map.clone(),
            price_convention: mall.price_convention,
            id_pattern,
        })
    }

    /// Builds a record stamped with `now` as both creation and update time.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Rejected`] when the cleaned name is empty or the
    /// price normalizes to `0`. Callers log and continue with the next item.
    pub fn build(&self, raw: &RawProduct, now: DateTime<Utc>) -> Result<ProductRecord, ScraperError> {
        let name = clean_name(&raw.name);
        if name.is_empty() {
            return Err(ScraperError::Rejected {
                name: raw.name.clone(),
                reason: "empty name".to_owned(),
            });
        }

        let price = parse_price(&raw.price_text, self.price_convention)
            .with_original(&raw.original_price_text, self.price_convention);
        if price.price == 0 {
            return Err(ScraperError::Rejected {
                name,
                reason: format!("no valid price in {:?}", raw.price_text),
            });
        }

        let image_url = resolve_url(&self.mall.url, &raw.image_src);
        let product_url = resolve_url(&self.mall.url, &raw.link_href);
        let code = derive_product_code(&product_url, &name, self.id_pattern.as_ref());

        let category = infer_category(
            &name,
            raw.category.as_deref(),
            &self.category_map,
            self.default_category.as_deref(),
        );
        let tags = infer_tags(&name, self.mall_tags.iter().map(String::as_str));

        Ok(ProductRecord {
            id: format!("{}_{code}", self.mall.id),
            name,
            price: price.price,
            original_price: price.original_price,
            discount_rate: price.discount_rate,
            image_url,
            product_url,
            category,
            tags,
            mall: self.mall.clone(),
            in_stock: !is_sold_out(&raw.price_text),
            created_at: now,
            updated_at: now,
        })
    }
}

fn compile_id_pattern(mall_id: &str, pattern: &str) -> Result<Regex, ScraperError> {
    let re = Regex::new(pattern).map_err(|e| ScraperError::InvalidConfig {
        mall: mall_id.to_owned(),
        reason: format!("product_id_pattern: {e}"),
    })?;
    if re.captures_len() < 2 {
        return Err(ScraperError::InvalidConfig {
            mall: mall_id.to_owned(),
            reason: "product_id_pattern needs one capture group".to_owned(),
        });
    }
    Ok(re)
}

/// Strips `[...]` groups (vendor prefixes, promo badges) and collapses
/// whitespace. Falls back to the collapsed original when stripping leaves
/// fewer than three characters.
#[must_use]
pub fn clean_name(raw: &str) -> String {
    let collapsed = clean_text(raw);
    let stripped = clean_text(&BRACKET_GROUP_RE.replace_all(&collapsed, " "));
    if stripped.chars().count() < 3 {
        collapsed
    } else {
        stripped
    }
}

/// Derives the mall-local product code used as the id suffix.
///
/// Tried in order: the configured pattern's capture on `product_url`, a
/// well-known query parameter, the last all-digit path segment, and finally
/// the first 12 hex digits of a SHA-256 over the URL (or the normalized name
/// when there is no URL).
#[must_use]
pub fn derive_product_code(product_url: &str, name: &str, id_pattern: Option<&Regex>) -> String {
    if let Some(code) = id_pattern
        .and_then(|re| re.captures(product_url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|code| !code.is_empty())
    {
        return code.to_owned();
    }

    if let Ok(url) = reqwest::Url::parse(product_url) {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        for param in PRODUCT_CODE_PARAMS {
            if let Some((_, value)) = pairs
                .iter()
                .find(|(k, v)| k == param && !v.trim().is_empty())
            {
                return value.trim().to_owned();
            }
        }

        if let Some(segment) = url.path_segments().and_then(|mut segments| {
            segments.rfind(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        }) {
            return segment.to_owned();
        }
    }

    let seed = if product_url.is_empty() {
        normalize_name(name)
    } else {
        product_url.to_owned()
    };
    let digest = format!("{:x}", Sha256::digest(seed.as_bytes()));
    digest[..12].to_owned()
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
