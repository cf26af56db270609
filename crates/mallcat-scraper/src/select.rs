//! Ordered candidate-selector resolution over a parsed page.
//!
//! Mall markup varies, so every semantic field is located by trying CSS
//! selectors in priority order and accepting the first plausible hit.
//! Absence is a normal outcome reported as an empty string, never an error.

use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;

/// Values of this many characters or fewer are treated as noise
/// (stray separators, `"-"`, single icons).
const MIN_PLAUSIBLE_CHARS: usize = 2;

/// A compiled, ordered list of candidate selectors for one field.
#[derive(Debug, Clone)]
pub struct CandidateSelectors {
    candidates: Vec<(String, Selector)>,
}

impl CandidateSelectors {
    /// Compiles `candidates` in order, skipping blank entries.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] for the first candidate that
    /// is not valid CSS.
    pub fn compile(candidates: &[String]) -> Result<Self, ScraperError> {
        let candidates = candidates
            .iter()
            .map(|raw| raw.trim())
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                Selector::parse(raw)
                    .map(|sel| (raw.to_owned(), sel))
                    .map_err(|e| ScraperError::InvalidSelector {
                        selector: raw.to_owned(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { candidates })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Returns the cleaned text of the first candidate match within `scope`
    /// that is longer than two characters, or an empty string.
    #[must_use]
    pub fn resolve_text(&self, scope: ElementRef<'_>) -> String {
        for (raw, selector) in &self.candidates {
            for element in scope.select(selector) {
                let text = clean_text(&element.text().collect::<String>());
                if is_plausible(&text) {
                    tracing::trace!(selector = %raw, text = %text, "selector matched text");
                    return text;
                }
            }
        }
        String::new()
    }

    /// Returns the first plausible value of any of `attrs` (tried in order per
    /// element) among candidate matches within `scope`, or an empty string.
    #[must_use]
    pub fn resolve_attr(&self, scope: ElementRef<'_>, attrs: &[&str]) -> String {
        for (raw, selector) in &self.candidates {
            for element in scope.select(selector) {
                if let Some(value) = first_attr(element, attrs) {
                    tracing::trace!(selector = %raw, value = %value, "selector matched attribute");
                    return value;
                }
            }
        }
        String::new()
    }

    /// Returns the first candidate that matches at least one element in
    /// `document`, together with its matches in document order.
    #[must_use]
    pub fn first_matching<'a>(&self, document: &'a Html) -> Option<(&str, Vec<ElementRef<'a>>)> {
        self.candidates.iter().find_map(|(raw, selector)| {
            let matches: Vec<ElementRef<'a>> = document.select(selector).collect();
            (!matches.is_empty()).then_some((raw.as_str(), matches))
        })
    }
}

/// Returns the first plausible value among `attrs` on `element` itself.
#[must_use]
pub fn first_attr(element: ElementRef<'_>, attrs: &[&str]) -> Option<String> {
    attrs
        .iter()
        .filter_map(|attr| element.value().attr(attr))
        .map(str::trim)
        .find(|value| is_plausible(value))
        .map(str::to_owned)
}

/// Collapses every whitespace run (including newlines and NBSP) to one space
/// and trims the ends.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_plausible(value: &str) -> bool {
    value.chars().count() > MIN_PLAUSIBLE_CHARS
}
