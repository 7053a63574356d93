//! iTunes lookup API response types.
//!
//! `GET /lookup?id=<trackId>&country=<code>` returns
//! `{"resultCount": N, "results": [ ... ]}`. For an ID lookup `N` is 0 when
//! the app is not sold in that storefront and 1 otherwise.
//!
//! Field coverage varies by storefront and by app age (older records lack
//! `artworkUrl512`, some lack `sellerName`), so every field except `trackId`
//! defaults when absent. Field names are camelCase on the wire and snake_case
//! when re-serialized by the server.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level response from `GET /lookup`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    #[serde(default)]
    pub result_count: u32,
    #[serde(default)]
    pub results: Vec<AppRecord>,
}

impl LookupResponse {
    /// The first record, when the lookup reported any.
    #[must_use]
    pub fn first_record(&self) -> Option<&AppRecord> {
        if self.result_count == 0 {
            return None;
        }
        self.results.first()
    }
}

/// One software record as returned by the lookup API.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct AppRecord {
    pub track_id: i64,
    #[serde(default)]
    pub track_name: String,
    #[serde(default)]
    pub bundle_id: Option<String>,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub seller_name: Option<String>,
    /// Numeric price in the storefront currency, e.g. `0.99`.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Display price as the storefront formats it, e.g. `"$0.99"` or `"Free"`.
    #[serde(default)]
    pub formatted_price: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub primary_genre_name: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub artwork_url60: Option<String>,
    #[serde(default)]
    pub artwork_url100: Option<String>,
    #[serde(default)]
    pub artwork_url512: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub average_user_rating: Option<f64>,
    #[serde(default)]
    pub user_rating_count: Option<u64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub current_version_release_date: Option<String>,
    #[serde(default)]
    pub minimum_os_version: Option<String>,
    #[serde(default)]
    pub track_view_url: Option<String>,
}
