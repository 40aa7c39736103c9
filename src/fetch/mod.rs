//! HTTP fetching for the crawler
//!
//! This module is the crawler's only contact with the network transport:
//! - Building an HTTP client with the crawler's User-Agent and timeouts
//! - Performing a single GET and normalizing failures into [`FetchError`]
//! - Rate limiting and retry with backoff (see [`retry`])
//!
//! A JavaScript-rendering transport could replace [`fetch_page`] as long as
//! it honors the same contract: one URL in, a status/body pair or a
//! normalized error out.

mod retry;

pub use retry::{fetch_with_retry, RateLimiter, RetryPolicy};

use crate::config::UserAgentConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Per-URL fetch failures
///
/// These are retried and then skipped; they never abort a crawl. Timeouts
/// and connection failures are distinguished from HTTP status errors so
/// logs can tell a slow site from a hostile one.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection error for {url}")]
    Connect { url: String },

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Failed to read body for {url}: {message}")]
    Body { url: String, message: String },
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, if the server sent one
    pub content_type: Option<String>,

    /// Response body
    pub body: String,
}

impl FetchedPage {
    /// Whether the response looks like an HTML document
    ///
    /// A missing Content-Type header is treated as HTML; plenty of small
    /// storefronts omit it.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(ct) => ct.contains("text/html") || ct.contains("application/xhtml"),
            None => true,
        }
    }
}

/// Builds the HTTP client shared by page and robots.txt fetches
///
/// # Arguments
///
/// * `user_agent` - Crawler identity; becomes the User-Agent header
/// * `timeout_ms` - Per-request timeout in milliseconds
///
/// # Example
///
/// ```no_run
/// use solcrawl::config::UserAgentConfig;
/// use solcrawl::fetch::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), 30_000).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout_ms: u64,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_millis(timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs a single GET, normalizing all failure modes into [`FetchError`]
///
/// Redirects are followed by the client (up to its default hop limit); the
/// page's `final_url` records where the crawler actually landed. Any non-2xx
/// status is an error here; the retry layer decides how often to try again.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage, FetchError> {
    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if e.is_connect() {
            FetchError::Connect {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    })?;

    Ok(FetchedPage {
        final_url,
        status: status.as_u16(),
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&UserAgentConfig::default(), 30_000);
        assert!(client.is_ok());
    }

    #[test]
    fn test_is_html() {
        let page = |ct: Option<&str>| FetchedPage {
            final_url: "https://shop.example/".to_string(),
            status: 200,
            content_type: ct.map(|s| s.to_string()),
            body: String::new(),
        };

        assert!(page(Some("text/html; charset=utf-8")).is_html());
        assert!(page(None).is_html());
        assert!(!page(Some("application/pdf")).is_html());
        assert!(!page(Some("image/png")).is_html());
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/panel"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><h1>Panel</h1></html>", "text/html"),
            )
            .mount(&server)
            .await;

        let client = build_http_client(&UserAgentConfig::default(), 5000).unwrap();
        let page = fetch_page(&client, &format!("{}/products/panel", server.uri()))
            .await
            .unwrap();

        assert_eq!(page.status, 200);
        assert!(page.is_html());
        assert!(page.body.contains("Panel"));
    }

    #[tokio::test]
    async fn test_fetch_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let client = build_http_client(&UserAgentConfig::default(), 5000).unwrap();
        let err = fetch_page(&client, &format!("{}/gone", server.uri()))
            .await
            .unwrap_err();

        match err {
            FetchError::Http { status, .. } => assert_eq!(status, 410),
            other => panic!("expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_error() {
        // Nothing listens on this port
        let client = build_http_client(&UserAgentConfig::default(), 2000).unwrap();
        let err = fetch_page(&client, "http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Connect { .. } | FetchError::Timeout { .. }
        ));
    }
}
