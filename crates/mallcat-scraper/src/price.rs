//! Normalization of Korean won price text.
//!
//! Listing pages render prices as free text: `"18,600원"`, `"10%18,600원→ 16,740원"`,
//! `"2025.01.01 12,000원"`, or `"품절"`. A price of `0` means "no valid price"
//! and is never an error.

use std::sync::LazyLock;

use mallcat_core::PriceConvention;
use regex::Regex;

/// `"<pct>% <original>원 → <current>원"`; the percent part is optional.
static ARROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\d{1,3}\s*%)?\s*(\d[\d,]*)\s*원?\s*(?:→|->|=>|▶)\s*(\d[\d,]*)")
        .expect("valid regex")
});
static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*").expect("valid regex"));

/// Result of normalizing one item's price text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizedPrice {
    pub price: u64,
    /// Only set when strictly greater than `price`.
    pub original_price: Option<u64>,
    pub discount_rate: Option<u8>,
}

impl NormalizedPrice {
    fn plain(price: u64) -> Self {
        Self {
            price,
            ..Self::default()
        }
    }

    /// Attaches a separately-rendered original price.
    ///
    /// Ignored when a discount was already detected from arrow notation or
    /// when the original does not exceed the current price.
    #[must_use]
    pub fn with_original(self, original_text: &str, convention: PriceConvention) -> Self {
        if self.original_price.is_some() || original_text.trim().is_empty() {
            return self;
        }
        let original = read_amount(original_text, convention);
        match discount_rate(self.price, original) {
            Some(rate) => Self {
                original_price: Some(original),
                discount_rate: Some(rate),
                ..self
            },
            None => self,
        }
    }
}

/// Strips every non-digit character and parses the remainder.
///
/// Returns `0` for empty input, text without digits, or digit runs too long
/// to represent.
#[must_use]
pub fn normalize_price(text: &str) -> u64 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Normalizes price text, detecting `original → current` arrow notation first
/// and otherwise reading one amount according to `convention`.
#[must_use]
pub fn parse_price(text: &str, convention: PriceConvention) -> NormalizedPrice {
    if let Some(caps) = ARROW_RE.captures(text) {
        let original = normalize_price(&caps[1]);
        let current = normalize_price(&caps[2]);
        if current > 0 {
            // The stated percent is display text; the rate is recomputed.
            return match discount_rate(current, original) {
                Some(rate) => NormalizedPrice {
                    price: current,
                    original_price: Some(original),
                    discount_rate: Some(rate),
                },
                None => NormalizedPrice::plain(current),
            };
        }
    }

    NormalizedPrice::plain(read_amount(text, convention))
}

/// `round((1 - current / original) * 100)`, or `None` unless `original > current > 0`.
#[must_use]
pub fn discount_rate(current: u64, original: u64) -> Option<u8> {
    if current == 0 || original <= current {
        return None;
    }
    let diff = u128::from(original - current);
    let original = u128::from(original);
    // Integer half-up rounding of 100 * diff / original.
    let rate = (200 * diff + original) / (2 * original);
    u8::try_from(rate).ok()
}

/// Returns `true` if the text marks the item as sold out.
#[must_use]
pub fn is_sold_out(text: &str) -> bool {
    text.contains("품절") || text.to_lowercase().contains("sold out")
}

fn read_amount(text: &str, convention: PriceConvention) -> u64 {
    match convention {
        PriceConvention::StripAll => normalize_price(text),
        PriceConvention::FirstNumber => DIGIT_RUN_RE
            .find(text)
            .map_or(0, |m| normalize_price(m.as_str())),
        PriceConvention::LastNumber => DIGIT_RUN_RE
            .find_iter(text)
            .last()
            .map_or(0, |m| normalize_price(m.as_str())),
    }
}
