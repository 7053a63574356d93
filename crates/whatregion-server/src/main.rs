mod api;
mod middleware;

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use whatregion_core::AppConfig;
use whatregion_itunes::{Aggregator, ItunesClient, LookupCache};

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = whatregion_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let aggregator = build_aggregator(&config)?;
    let rate_limit = RateLimitState::new(config.rate_limit_per_minute, Duration::from_secs(60));
    let app = build_app(AppState { aggregator }, rate_limit);

    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        lookup_base_url = %config.lookup_base_url,
        baseline_region = config.baseline_region,
        "starting whatregion server"
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn build_aggregator(config: &AppConfig) -> anyhow::Result<Aggregator> {
    let client = ItunesClient::with_base_url(
        config.lookup_timeout_secs,
        &config.user_agent,
        &config.lookup_base_url,
    )?;
    let cache = LookupCache::new(Duration::from_secs(config.cache_ttl_secs));
    let baseline = whatregion_core::find_region(config.baseline_region).ok_or_else(|| {
        anyhow::anyhow!(
            "baseline region {} is not in the catalog",
            config.baseline_region
        )
    })?;
    Ok(Aggregator::new(client, cache, baseline))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
