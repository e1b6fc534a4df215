//! HTTP client for public Shopify storefront product endpoints.

mod origin;

use std::time::Duration;

use reqwest::Client;
use seatwatch_core::{FeedConfig, FeedFormat};
use serde::de::DeserializeOwned;

use crate::error::ScraperError;
use crate::pagination::next_page_url;
use crate::types::{ProductEnvelope, ProductsResponse, StorefrontProduct};

pub use origin::extract_store_origin;
#[cfg(test)]
use origin::extract_domain;

/// Maximum number of listing pages followed for one collection feed.
/// Prevents infinite loops on cycling `Link` headers.
pub(super) const MAX_PAGES: usize = 50;

/// HTTP client for Shopify storefront feeds.
///
/// Maps 429, 404 and other non-2xx responses to typed errors. Never retries:
/// a feed that fails is reported once and the run moves on.
pub struct StorefrontClient {
    pub(super) client: Client,
}

impl StorefrontClient {
    /// Creates a `StorefrontClient` with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches every product a feed describes.
    ///
    /// Single-product formats yield exactly one product. Collection feeds
    /// follow `rel="next"` links and, when the feed names a `handle`, keep
    /// only that product.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`]: the feed URL does not parse.
    /// - [`ScraperError::RateLimited`]: HTTP 429.
    /// - [`ScraperError::NotFound`]: HTTP 404.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network, TLS or timeout failure.
    /// - [`ScraperError::Deserialize`]: the body is not the expected JSON.
    /// - [`ScraperError::PaginationLimit`]: more than [`MAX_PAGES`] listing pages.
    pub async fn fetch_feed(
        &self,
        feed: &FeedConfig,
    ) -> Result<Vec<StorefrontProduct>, ScraperError> {
        match feed.format() {
            FeedFormat::Ajax => {
                let (product, _) = self.get_json::<StorefrontProduct>(&feed.url).await?;
                Ok(vec![product])
            }
            FeedFormat::ProductJson => {
                let (envelope, _) = self.get_json::<ProductEnvelope>(&feed.url).await?;
                Ok(vec![envelope.product])
            }
            FeedFormat::CollectionJson => {
                self.fetch_collection(&feed.url, feed.handle.as_deref())
                    .await
            }
        }
    }

    async fn fetch_collection(
        &self,
        url: &str,
        handle: Option<&str>,
    ) -> Result<Vec<StorefrontProduct>, ScraperError> {
        let mut products = Vec::new();
        let mut next = Some(url.to_owned());
        let mut pages = 0usize;

        while let Some(page_url) = next {
            if pages >= MAX_PAGES {
                return Err(ScraperError::PaginationLimit {
                    url: url.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }
            pages += 1;

            let (page, link_header) = self.get_json::<ProductsResponse>(&page_url).await?;
            tracing::debug!(
                url = %page_url,
                page = pages,
                products = page.products.len(),
                "fetched listing page"
            );
            if page.products.is_empty() {
                break;
            }
            products.extend(page.products);
            next = next_page_url(link_header.as_deref());
        }

        if let Some(handle) = handle {
            products.retain(|p| p.handle.as_deref() == Some(handle));
        }
        Ok(products)
    }

    /// GETs `url` and parses the body as `T`, returning the `Link` header too.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<(T, Option<String>), ScraperError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        let referer = extract_store_origin(url);

        let response = self
            .client
            .get(parsed)
            .header(
                reqwest::header::ACCEPT,
                "application/json,text/javascript;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::REFERER, &referer)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);

            return Err(ScraperError::RateLimited {
                domain: origin::extract_domain(url),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        // Extract the Link header before consuming the response body.
        let link_header = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response.text().await?;
        let value = serde_json::from_str::<T>(&body).map_err(|e| ScraperError::Deserialize {
            context: url.to_owned(),
            source: e,
        })?;

        Ok((value, link_header))
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
