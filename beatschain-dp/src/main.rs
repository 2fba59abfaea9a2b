//! beatschain-dp - Unified Data Provider microservice
//!
//! Serves producer and beat lookups that reconcile the content store with
//! on-chain NFT data. Default port: 5780.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use beatschain_common::config::{resolve_config_path, write_toml_config};
use beatschain_dp::config::{self, ConfigOverrides};
use beatschain_dp::{build_router, AppState, UnifiedDataProvider};

const MODULE_NAME: &str = "beatschain-dp";

/// Command-line arguments for beatschain-dp
#[derive(Parser, Debug)]
#[command(name = "beatschain-dp")]
#[command(about = "Unified producer/beat data provider for BeatsChain")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "BEATSCHAIN_DP_PORT")]
    port: Option<u16>,

    /// Chain JSON-RPC endpoint
    #[arg(long, env = "BEATSCHAIN_RPC_URL")]
    rpc_url: Option<String>,

    /// Beat NFT contract address
    #[arg(long, env = "BEATSCHAIN_CONTRACT_ADDRESS")]
    contract_address: Option<String>,

    /// HTTP(S) gateway used to dereference ipfs:// URIs
    #[arg(long, env = "BEATSCHAIN_IPFS_GATEWAY")]
    ipfs_gateway: Option<String>,

    /// Content store project id
    #[arg(long, env = "BEATSCHAIN_SANITY_PROJECT_ID")]
    sanity_project_id: Option<String>,

    /// Content store dataset
    #[arg(long, env = "BEATSCHAIN_SANITY_DATASET")]
    sanity_dataset: Option<String>,

    /// Content store read token
    #[arg(long, env = "BEATSCHAIN_SANITY_TOKEN", hide_env_values = true)]
    sanity_token: Option<String>,

    /// Write a config file with built-in defaults to the resolved path and exit
    #[arg(long)]
    init_config: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            rpc_url: self.rpc_url.clone(),
            contract_address: self.contract_address.clone(),
            ipfs_gateway: self.ipfs_gateway.clone(),
            sanity_project_id: self.sanity_project_id.clone(),
            sanity_dataset: self.sanity_dataset.clone(),
            sanity_token: self.sanity_token.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), MODULE_NAME);

    if args.init_config {
        let path = config_path.context("Could not determine a config file location")?;
        write_toml_config(&Default::default(), &path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    // Config loading logs through a bootstrap subscriber; the configured
    // level is not known yet
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        config::load(config_path.as_deref(), args.overrides())
    })?;

    // Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.logging.level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting {} (Unified Data Provider)", MODULE_NAME);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let content_enabled = !config.content.project_id.trim().is_empty();
    let chain_enabled = config.chain.contract_address.is_some();
    info!(
        "Content store: {}",
        if content_enabled { config.content.project_id.as_str() } else { "not configured" }
    );
    info!("Chain RPC: {} (contract configured: {})", config.chain.rpc_url, chain_enabled);
    info!("IPFS gateway: {}", config.chain.ipfs_gateway);

    let provider = UnifiedDataProvider::from_config(&config)
        .context("Failed to initialize data provider")?;

    let state = AppState::new(Arc::new(provider)).with_backends(content_enabled, chain_enabled);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
