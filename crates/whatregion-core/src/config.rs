use crate::app_config::{AppConfig, Environment};
use crate::regions::find_region;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a working
/// development config pointed at the public lookup API.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("WHATREGION_ENV", "development"))?;

    let bind_addr = or_default("WHATREGION_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("WHATREGION_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("WHATREGION_LOG_LEVEL", "info");

    let lookup_base_url = or_default("WHATREGION_LOOKUP_BASE_URL", "https://itunes.apple.com/");
    if !lookup_base_url.starts_with("http://") && !lookup_base_url.starts_with("https://") {
        return Err(invalid(
            "WHATREGION_LOOKUP_BASE_URL",
            format!("\"{lookup_base_url}\" is not an http(s) URL"),
        ));
    }

    let lookup_timeout_secs = parse_u64("WHATREGION_LOOKUP_TIMEOUT_SECS", "10")?;
    if lookup_timeout_secs == 0 {
        return Err(invalid(
            "WHATREGION_LOOKUP_TIMEOUT_SECS",
            "timeout must be at least one second".to_string(),
        ));
    }

    let user_agent = or_default(
        "WHATREGION_USER_AGENT",
        "whatregion/0.1 (region-availability)",
    );

    let baseline_raw = or_default("WHATREGION_BASELINE_REGION", "us");
    let baseline_region = find_region(&baseline_raw)
        .map(|region| region.code)
        .ok_or_else(|| {
            invalid(
                "WHATREGION_BASELINE_REGION",
                format!("\"{baseline_raw}\" is not a known storefront code"),
            )
        })?;

    let cache_ttl_secs = parse_u64("WHATREGION_CACHE_TTL_SECS", "300")?;
    let rate_limit_per_minute = parse_usize("WHATREGION_RATE_LIMIT_PER_MINUTE", "120")?;
    if rate_limit_per_minute == 0 {
        return Err(invalid(
            "WHATREGION_RATE_LIMIT_PER_MINUTE",
            "limit must allow at least one request".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        lookup_base_url,
        lookup_timeout_secs,
        user_agent,
        baseline_region,
        cache_ttl_secs,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "WHATREGION_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
