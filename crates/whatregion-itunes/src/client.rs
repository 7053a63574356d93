//! HTTP client for the iTunes Search `lookup` endpoint.
//!
//! Wraps `reqwest` with a bounded per-request timeout, a cache-defeating
//! `rand` query parameter, and typed response deserialization.

use std::time::Duration;

use reqwest::{Client, Url};
use whatregion_core::CanonicalAppId;

use crate::error::CatalogError;
use crate::types::LookupResponse;

const DEFAULT_BASE_URL: &str = "https://itunes.apple.com/";

/// Client for the iTunes lookup API.
///
/// Use [`ItunesClient::new`] for production or [`ItunesClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct ItunesClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ItunesClient {
    /// Creates a new client pointed at the public iTunes API.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, CatalogError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CatalogError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, CatalogError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so that `join("lookup")` appends a
        // segment instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CatalogError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Upper bound on a single lookup, including reading the body.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Looks up `app_id` in the storefront for `country`.
    ///
    /// A storefront that does not sell the app answers `200` with
    /// `resultCount: 0`; that is a successful lookup, not an error.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Timeout`] if the request exceeds the client timeout.
    /// - [`CatalogError::Http`] on any other network failure.
    /// - [`CatalogError::UnexpectedStatus`] on a non-2xx status.
    /// - [`CatalogError::Deserialize`] if the body is not a lookup response.
    pub async fn lookup(
        &self,
        app_id: &CanonicalAppId,
        country: &str,
    ) -> Result<LookupResponse, CatalogError> {
        let url = self.lookup_url(
            app_id,
            country,
            chrono::Utc::now().timestamp_millis(),
        )?;

        let timed_out = |e: reqwest::Error| {
            if e.is_timeout() {
                CatalogError::Timeout {
                    country: country.to_owned(),
                }
            } else {
                CatalogError::Http(e)
            }
        };

        let response = self.client.get(url).send().await.map_err(timed_out)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                country: country.to_owned(),
            });
        }

        let body = response.text().await.map_err(timed_out)?;
        serde_json::from_str(&body).map_err(|e| CatalogError::Deserialize {
            context: format!("lookup(id={app_id}, country={country})"),
            source: e,
        })
    }

    /// Builds `<base>/lookup?id=..&country=..&rand=..` with encoded query values.
    fn lookup_url(
        &self,
        app_id: &CanonicalAppId,
        country: &str,
        rand: i64,
    ) -> Result<Url, CatalogError> {
        let mut url = self
            .base_url
            .join("lookup")
            .map_err(|e| CatalogError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("id", app_id.as_str())
            .append_pair("country", country)
            .append_pair("rand", &rand.to_string());
        Ok(url)
    }
}
