//! Listing-page extraction: one HTML page in, raw items out.

use mallcat_core::SelectorConfig;
use scraper::Html;

use crate::error::ScraperError;
use crate::select::{first_attr, CandidateSelectors};
use crate::types::RawProduct;
use crate::url::resolve_url;

/// Image attributes in lookup order; lazy-loading malls keep the real URL in
/// a `data-*` attribute.
const IMAGE_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src", "data-original"];
const LINK_ATTRS: &[&str] = &["href"];

/// A mall's selector table, compiled once per scrape.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    item: CandidateSelectors,
    name: CandidateSelectors,
    price: CandidateSelectors,
    original_price: CandidateSelectors,
    image: CandidateSelectors,
    link: CandidateSelectors,
}

impl CompiledSelectors {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if any candidate is not valid CSS.
    pub fn compile(config: &SelectorConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            item: CandidateSelectors::compile(&config.item)?,
            name: CandidateSelectors::compile(&config.name)?,
            price: CandidateSelectors::compile(&config.price)?,
            original_price: CandidateSelectors::compile(&config.original_price)?,
            image: CandidateSelectors::compile(&config.image)?,
            link: CandidateSelectors::compile(&config.link)?,
        })
    }
}

/// Extracts raw items from one listing page, in document order.
///
/// The first `item` candidate matching at least one element defines the item
/// set. Items without a resolvable name are dropped here; items without a
/// usable price are kept so that registration can count them as skipped.
/// Image and link values are resolved to absolute URLs against `base_url`.
#[must_use]
pub fn extract_products(
    html: &str,
    selectors: &CompiledSelectors,
    base_url: &str,
    category: Option<&str>,
) -> Vec<RawProduct> {
    let document = Html::parse_document(html);

    let Some((item_selector, items)) = selectors.item.first_matching(&document) else {
        tracing::debug!("no item selector matched");
        return Vec::new();
    };
    tracing::debug!(selector = item_selector, count = items.len(), "item selector matched");

    let mut products = Vec::with_capacity(items.len());
    for item in items {
        let name = selectors.name.resolve_text(item);
        if name.is_empty() {
            tracing::debug!("dropping item without a name");
            continue;
        }

        let link = match selectors.link.resolve_attr(item, LINK_ATTRS) {
            href if !href.is_empty() => href,
            _ if item.value().name() == "a" => first_attr(item, LINK_ATTRS).unwrap_or_default(),
            _ => String::new(),
        };

        products.push(RawProduct {
            name,
            price_text: selectors.price.resolve_text(item),
            original_price_text: selectors.original_price.resolve_text(item),
            image_src: resolve_url(base_url, &selectors.image.resolve_attr(item, IMAGE_ATTRS)),
            link_href: resolve_url(base_url, &link),
            category: category.map(str::to_owned),
        });
    }

    products
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
