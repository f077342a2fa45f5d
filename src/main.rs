//! Lucid service entry point.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌────────────────────────────────────────────┐
//!                        │                 LUCID SERVICE               │
//!                        │                                            │
//!   Client Request       │  ┌─────────┐   ┌────────────┐   ┌───────┐  │
//!   ─────────────────────┼─▶│  http   │──▶│ rate_limit │──▶│handler│  │
//!                        │  │ server  │   │ guard (429)│   │       │  │
//!                        │  └─────────┘   └─────┬──────┘   └───┬───┘  │
//!                        │                      │              │      │
//!                        │               fail closed      fail open   │
//!                        │                      │              │      │
//!                        │                ┌─────▼─────┐  ┌─────▼────┐ │
//!                        │                │RateLimiter│  │CacheClient│ │
//!                        │                │ + breaker │  │ + breaker │ │
//!                        │                └─────┬─────┘  └─────┬────┘ │
//!                        │                      └──────┬───────┘      │
//!                        └─────────────────────────────┼──────────────┘
//!                                                      ▼
//!                                                Remote store (Redis)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use lucid::config::{load_config, ServiceConfig};
use lucid::http::{AppState, MemoryContextSource};
use lucid::observability::{logging, metrics};
use lucid::rate_limit::{FixedWindowLimiter, LimiterBackend, RateLimiter};
use lucid::resilience::CircuitBreaker;
use lucid::store::{KeyValueStore, RedisStore};
use lucid::CacheClient;

#[derive(Parser, Debug)]
#[command(name = "lucid", about = "Lucid journaling service resilience layer")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "lucid.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let args = Args::parse();
    let config = if args.config.exists() {
        load_config(&args.config)?
    } else {
        tracing::info!(path = %args.config.display(), "Config file not found, using defaults");
        ServiceConfig::default()
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        cache_enabled = config.cache.enabled,
        rate_limit_enabled = config.rate_limit.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    // Cache store: connection failure degrades to uncached operation,
    // consistent with the fail-open contract.
    let store: Option<Arc<dyn KeyValueStore>> = match (&config.redis.url, config.cache.enabled) {
        (Some(url), true) => match RedisStore::connect(url).await {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                tracing::warn!(error = %e, "Cache store unavailable, continuing without cache");
                None
            }
        },
        _ => None,
    };
    let cache = Arc::new(CacheClient::new(
        store,
        CircuitBreaker::new("cache", (&config.cache.breaker).into()),
    ));

    // Limiter backend: connection failure aborts startup. Booting with
    // rate limiting silently absent would be fail-open in the one place
    // that must fail closed.
    let backend: Option<Arc<dyn LimiterBackend>> = match (&config.redis.url, config.rate_limit.enabled)
    {
        (Some(url), true) => {
            let limiter = FixedWindowLimiter::connect(
                url,
                config.rate_limit.max_requests,
                config.rate_limit.window_secs,
            )
            .await?;
            Some(Arc::new(limiter))
        }
        _ => None,
    };
    let limiter = Arc::new(RateLimiter::new(
        backend,
        CircuitBreaker::new("rate_limit", (&config.rate_limit.breaker).into()),
    ));

    if config.admin.api_key.is_empty() {
        tracing::warn!("admin.api_key not set, admin endpoints disabled");
    }

    let state = AppState {
        cache,
        limiter,
        source: Arc::new(MemoryContextSource::default()),
        admin_api_key: Arc::from(config.admin.api_key.as_str()),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    lucid::http::run(listener, state).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
