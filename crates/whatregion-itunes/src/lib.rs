//! Client and aggregation layer for the iTunes lookup API.
//!
//! [`ItunesClient`] performs single `(app id, storefront)` lookups,
//! [`Aggregator`] fans them out across the region catalog through a shared
//! [`LookupCache`], and [`Session`] keeps a [`RegionBoard`] consistent while
//! the checked app changes underneath in-flight lookups.

pub mod aggregate;
pub mod board;
pub mod cache;
pub mod client;
pub mod error;
pub mod types;

pub use aggregate::{interpret, Aggregator, LookupEvent};
pub use board::{Applied, BaselineState, BoardSnapshot, BoardSummary, RegionBoard, Session};
pub use cache::LookupCache;
pub use client::ItunesClient;
pub use error::CatalogError;
pub use types::{AppRecord, LookupResponse};
