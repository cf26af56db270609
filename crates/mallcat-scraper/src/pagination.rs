//! Query-parameter pagination for category listing pages.
//!
//! Most regional malls run on shared shop-builder platforms that page their
//! listings with a single numeric query parameter:
//!
//! ```text
//! https://www.k-kimchi.kr/index.php?cate=001          (page 1)
//! https://www.k-kimchi.kr/index.php?cate=001&page=2   (page 2)
//! ```

use crate::error::ScraperError;

/// Returns the URL of listing page `page` (1-based) of `category_url`.
///
/// Page 1 is the category URL unchanged. Later pages set `param` to the page
/// number, replacing any value already present in the query.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if `category_url` does not parse.
pub fn page_url(category_url: &str, param: &str, page: u32) -> Result<String, ScraperError> {
    if page <= 1 {
        return Ok(category_url.to_owned());
    }

    let mut url = reqwest::Url::parse(category_url).map_err(|e| ScraperError::InvalidUrl {
        url: category_url.to_owned(),
        reason: e.to_string(),
    })?;

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != param)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &retained {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(param, &page.to_string());
    }

    Ok(url.to_string())
}
