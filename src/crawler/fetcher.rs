//! Fetch-and-extract collaborator
//!
//! The crawl core only knows about the [`LinkSource`] trait. [`HttpFetcher`]
//! is the production implementation:
//! - Building an HTTP client with user agent, timeouts and redirect limits
//! - GET requests that follow redirects
//! - Content-type classification
//! - Link extraction against the final response URL

use crate::config::HttpConfig;
use crate::crawler::parser::extract_links;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Source of outbound links for a URL
///
/// Implementations fetch `url`, resolve every discovered link to an absolute
/// URL string against the final (post-redirect) location, and hold no crawl
/// state of their own.
#[async_trait]
pub trait LinkSource: Send + Sync {
    async fn fetch_and_extract(&self, url: &Url) -> Result<Vec<String>, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```
/// use linkcrawl::config::HttpConfig;
/// use linkcrawl::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP and extracts their anchor links
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from `config`
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl LinkSource for HttpFetcher {
    /// # Request Flow
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Connection, TLS, timeout, redirect limit | `FetchError::Http` |
    /// | Content-Type present and not HTML | `Ok(vec![])` |
    /// | Body cannot be read | `FetchError::Body` |
    /// | HTML body, any status | Links resolved against the final URL |
    async fn fetch_and_extract(&self, url: &Url) -> Result<Vec<String>, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        // Error pages still carry navigation links
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "Non-success status");
        }

        let final_url = response.url().clone();
        if final_url != *url {
            tracing::debug!(url = %url, final_url = %final_url, "Followed redirect");
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_html(content_type) {
                tracing::debug!(url = %url, content_type, "Skipping non-HTML response");
                return Ok(Vec::new());
            }
        }

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        Ok(extract_links(&body, &final_url))
    }
}

/// Returns true for content types that may contain anchor links
fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}
