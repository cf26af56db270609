//! HTTP client for mall listing pages.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::url::{host_of, origin_of};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_KO: &str = "ko-KR,ko;q=0.9,en;q=0.8";

/// Fetches raw HTML from mall sites.
///
/// Status 429, 404 and other non-2xx responses come back as distinct
/// [`ScraperError`] variants. Transient failures are retried according to
/// the configured [`RetryPolicy`].
pub struct MallClient {
    client: Client,
    retry: RetryPolicy,
}

impl MallClient {
    /// Creates a `MallClient` with the given timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client fails to build.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, retry })
    }

    /// Fetches `url` and returns the decoded body.
    ///
    /// The body is decoded using the charset from `Content-Type`, so EUC-KR
    /// pages come back as proper UTF-8 strings.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if `url` is not an absolute URL.
    /// - [`ScraperError::RateLimited`] on HTTP 429 after all retries.
    /// - [`ScraperError::NotFound`] on HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`] on any other non-2xx status (5xx retried).
    /// - [`ScraperError::Http`] on network or TLS failure after all retries.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        let referer = origin_of(url);

        retry_with_backoff(self.retry, || {
            let url = url.to_owned();
            let referer = referer.clone();
            async move {
                tracing::debug!(url = %url, "fetching page");
                let response = self
                    .client
                    .get(&url)
                    .header(reqwest::header::ACCEPT, ACCEPT_HTML)
                    .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_KO)
                    .header(reqwest::header::REFERER, &referer)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .unwrap_or(60);

                    return Err(ScraperError::RateLimited {
                        domain: host_of(&url),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
