// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Listing Gateway Service
//!
//! Admission filter in front of the listing marketplace API.
//!
//! ## Usage
//!
//! 1. **Forward auth**: the proxy replays each request to the gateway and
//!    only forwards it upstream on a 200.
//!
//! 2. **External check**: the proxy posts `{ip, method, path}` to `/check`.
//!
//! ## Configuration
//!
//! Flags, environment variables, or a `.env` file:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `STRICT_MAX_REQUESTS`: Budget for mutating endpoints (default: 50)
//! - `MODERATE_MAX_REQUESTS`: Budget for ordinary reads (default: 300)
//! - `LENIENT_MAX_REQUESTS`: Budget for lightweight reads (default: 600)
//! - `RATE_WINDOW_MS`: Window length for every class (default: 900000)
//! - `CLEANUP_PROBABILITY`: Chance of a sweep per request (default: 0.01)
//! - `CLEANUP_INTERVAL_SECS`: Background sweep interval, 0 disables (default: 60)
//! - `MAX_RATE_ENTRIES`: Bound on tracked keys, 0 is unbounded (default: 0)
//! - `TRUST_PROXY_HEADERS`: Honour X-Forwarded-For / X-Real-IP (default: true)

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use listing_gateway::{
    app::router,
    config::{Config, RateLimitConfig},
    handlers::AppState,
};

#[derive(Parser, Debug)]
#[command(name = "listing-gateway", about = "Rate limiting gateway for the listing API")]
struct Args {
    /// Server bind address
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: String,

    /// Requests per window for mutating and publish endpoints
    #[arg(long, env = "STRICT_MAX_REQUESTS", default_value_t = 50)]
    strict_max_requests: u32,

    /// Requests per window for ordinary reads
    #[arg(long, env = "MODERATE_MAX_REQUESTS", default_value_t = 300)]
    moderate_max_requests: u32,

    /// Requests per window for lightweight reads
    #[arg(long, env = "LENIENT_MAX_REQUESTS", default_value_t = 600)]
    lenient_max_requests: u32,

    /// Window length in milliseconds, shared by every class
    #[arg(long, env = "RATE_WINDOW_MS", default_value_t = 900_000)]
    rate_window_ms: u64,

    /// Chance that a request triggers a sweep of expired entries
    #[arg(long, env = "CLEANUP_PROBABILITY", default_value_t = 0.01)]
    cleanup_probability: f64,

    /// Background sweep interval in seconds (0 disables)
    #[arg(long, env = "CLEANUP_INTERVAL_SECS", default_value_t = 60)]
    cleanup_interval_secs: u64,

    /// Maximum tracked client/class keys (0 = unbounded)
    #[arg(long, env = "MAX_RATE_ENTRIES", default_value_t = 0)]
    max_rate_entries: usize,

    /// Honour X-Forwarded-For / X-Real-IP headers
    #[arg(long, env = "TRUST_PROXY_HEADERS", default_value_t = true, action = clap::ArgAction::Set)]
    trust_proxy_headers: bool,

    /// Disable the Prometheus endpoint
    #[arg(long, env = "DISABLE_METRICS")]
    disable_metrics: bool,
}

impl Args {
    fn into_config(self) -> Config {
        let mut rate_limit = RateLimitConfig {
            cleanup_probability: self.cleanup_probability,
            cleanup_interval_secs: self.cleanup_interval_secs,
            max_entries: self.max_rate_entries,
            trust_proxy_headers: self.trust_proxy_headers,
            ..Default::default()
        }
        .with_window_ms(self.rate_window_ms);
        rate_limit.strict.max_requests = self.strict_max_requests;
        rate_limit.moderate.max_requests = self.moderate_max_requests;
        rate_limit.lenient.max_requests = self.lenient_max_requests;

        let mut config = Config {
            bind_addr: self.bind_addr,
            rate_limit,
            ..Default::default()
        };
        config.metrics.enabled = !self.disable_metrics;
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Args::parse().into_config();
    config.validate()?;
    info!(
        bind_addr = %config.bind_addr,
        strict = config.rate_limit.strict.max_requests,
        moderate = config.rate_limit.moderate.max_requests,
        lenient = config.rate_limit.lenient.max_requests,
        window_ms = config.rate_limit.strict.window_ms,
        max_entries = config.rate_limit.max_entries,
        "Starting listing gateway"
    );

    let state = Arc::new(AppState::new(config.clone())?);

    // Spawn cleanup task
    if let Some(period) = config.rate_limit.cleanup_interval() {
        let cleanup_state = state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let removed = cleanup_state.limiter.cleanup();
                cleanup_state
                    .metrics
                    .set_entries(cleanup_state.limiter.tracked_entries());
                tracing::debug!(removed, "Periodic rate limit cleanup");
            }
        });
    }

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
