use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Root of the catalog lookup API; `lookup` is appended to it.
    pub lookup_base_url: String,
    pub lookup_timeout_secs: u64,
    pub user_agent: String,
    /// Storefront whose record supplies the app's name, artwork and description.
    pub baseline_region: &'static str,
    pub cache_ttl_secs: u64,
    pub rate_limit_per_minute: usize,
}
