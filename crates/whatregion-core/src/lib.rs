//! Domain core for region availability checks: configuration, the static
//! storefront catalog, app identifier normalization, and the per-region
//! availability view types shared by the lookup client and the HTTP server.

pub mod app_config;
pub mod app_id;
pub mod availability;
pub mod config;
pub mod error;
pub mod regions;

pub use app_config::{AppConfig, Environment};
pub use app_id::{normalize_app_id, CanonicalAppId};
pub use availability::{RegionAvailability, RegionEntry, RegionState};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{AppIdError, ConfigError};
pub use regions::{find_region, regions_by_continent, Continent, Region, REGIONS};
