use thiserror::Error;

/// Errors returned by the iTunes lookup client.
///
/// None of these reach the availability view: the aggregator logs them and
/// treats the region as unavailable.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the client timeout.
    #[error("lookup timed out for country {country}")]
    Timeout { country: String },

    #[error("unexpected HTTP status {status} for country {country}")]
    UnexpectedStatus { status: u16, country: String },

    /// The response body could not be deserialized into a lookup response.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid lookup base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
