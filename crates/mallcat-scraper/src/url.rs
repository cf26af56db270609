//! Resolution of relative image and product links against a mall's base URL.

/// Scheme, host and port of `url`, e.g. `https://www.k-kimchi.kr` for a
/// listing page. Input that does not parse comes back without its trailing
/// slash.
#[must_use]
pub fn origin_of(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.origin().ascii_serialization(),
        Err(_) => url.trim_end_matches('/').to_owned(),
    }
}

/// Host name of `url` for error messages; the whole input when unparseable.
pub(crate) fn host_of(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.host_str().unwrap_or(url).to_owned(),
        Err(_) => url.to_owned(),
    }
}

/// Resolves `raw` against `base_url`.
///
/// - `//cdn.example.com/a.png` gets an `https:` scheme.
/// - `/img/a.png` is prefixed with the origin (scheme + host) of `base_url`.
/// - `http://` and `https://` values are returned unchanged.
/// - Anything else is joined to `base_url` as a relative path.
///
/// Blank input resolves to an empty string. `javascript:` links and bare
/// fragments carry no location and also resolve to empty.
#[must_use]
pub fn resolve_url(base_url: &str, raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') || raw.to_ascii_lowercase().starts_with("javascript:")
    {
        return String::new();
    }

    if let Some(rest) = raw.strip_prefix("//") {
        return format!("https://{rest}");
    }

    if raw.starts_with('/') {
        return format!("{}{raw}", origin_of(base_url));
    }

    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return raw.to_owned();
    }

    match reqwest::Url::parse(base_url).and_then(|base| base.join(raw)) {
        Ok(joined) => joined.to_string(),
        Err(e) => {
            tracing::debug!(base_url, raw, error = %e, "could not join relative URL");
            format!("{}/{raw}", base_url.trim_end_matches('/'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_relative_uses_origin_not_base_path() {
        assert_eq!(
            resolve_url("https://example.com/shop/", "/img/a.png"),
            "https://example.com/img/a.png"
        );
    }

    #[test]
    fn protocol_relative_gets_https() {
        assert_eq!(
            resolve_url("https://example.com/shop/", "//cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        assert_eq!(
            resolve_url("https://example.com", "http://other.kr/p/1"),
            "http://other.kr/p/1"
        );
    }

    #[test]
    fn path_relative_joins_against_base() {
        assert_eq!(
            resolve_url("https://example.com/shop/", "goods/view.php?no=3"),
            "https://example.com/shop/goods/view.php?no=3"
        );
        assert_eq!(
            resolve_url("https://example.com/shop/list.php", "view.php?no=3"),
            "https://example.com/shop/view.php?no=3"
        );
    }

    #[test]
    fn dot_relative_is_normalized() {
        assert_eq!(
            resolve_url("https://example.com/shop/list/", "../data/a.jpg"),
            "https://example.com/shop/data/a.jpg"
        );
    }

    #[test]
    fn blank_and_script_links_resolve_empty() {
        assert_eq!(resolve_url("https://example.com", "   "), "");
        assert_eq!(resolve_url("https://example.com", "#"), "");
        assert_eq!(resolve_url("https://example.com", "javascript:void(0)"), "");
    }

    #[test]
    fn origin_drops_path_and_query_but_keeps_port() {
        assert_eq!(
            origin_of("https://www.k-kimchi.kr/index.php?cate=001&page=2"),
            "https://www.k-kimchi.kr"
        );
        assert_eq!(origin_of("http://127.0.0.1:8080/list"), "http://127.0.0.1:8080");
        assert_eq!(origin_of("https://taebaek-mall.com/"), "https://taebaek-mall.com");
        assert_eq!(origin_of("not a url/"), "not a url");
    }

    #[test]
    fn host_for_error_messages() {
        assert_eq!(host_of("https://noblegochang.com/product"), "noblegochang.com");
        assert_eq!(host_of("garbage"), "garbage");
    }
}
