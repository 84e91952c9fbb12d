use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod admission;
mod classifier;
mod config;
mod error;
mod handlers;
mod metrics;
mod models;
mod rate_limit;
mod router;
mod rules;
mod state;
mod stats;
mod transport;

use config::{Args, GatewayConfig};
use state::AppState;

// this is main async function with tokio
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // parse cli arguments
    let args = Args::parse();

    let default_filter = if args.verbose {
        "info,rpc_gatekeeper=debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_args(&args)?;

    tracing::info!("server will run on :{}", config.port);
    tracing::info!("redirecting to {}", config.target);
    tracing::info!("list of allowed paths: {:?}", config.allowed_paths);
    tracing::info!("list of no-limit IPs: {:?}", config.no_limit_ips);
    tracing::info!(
        "requests from IP per minute limited to {}",
        config.requests_per_minute
    );
    if !config.host_override {
        tracing::info!("host header override disabled");
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState::new(config));
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
