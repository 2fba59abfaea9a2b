//! Configuration loading and config file resolution
//!
//! Bootstrap configuration comes from a TOML file. Every section and field is
//! optional; anything left out falls back to a built-in default so a missing
//! or partial file never prevents startup.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "BEATSCHAIN_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub provider: ProviderConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            logging: LoggingConfig::default(),
            content: ContentConfig::default(),
            chain: ChainConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Content store (structured CMS) connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Project identifier; empty means the content backend is unconfigured
    #[serde(default)]
    pub project_id: String,

    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// Query API version, dated (e.g. "2023-05-03")
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Read token for private datasets
    #[serde(default)]
    pub token: Option<String>,

    /// Override for the API base URL (defaults to `https://<project>.api.sanity.io`)
    #[serde(default)]
    pub api_host: Option<String>,

    /// Featured listing length when the caller gives no limit
    #[serde(default = "default_featured_limit")]
    pub featured_limit: usize,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: default_dataset(),
            api_version: default_api_version(),
            token: None,
            api_host: None,
            featured_limit: default_featured_limit(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Blockchain read client and metadata gateway settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of the chain node
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Beat NFT contract address; chain lookups are disabled when absent
    #[serde(default)]
    pub contract_address: Option<String>,

    /// HTTP(S) gateway base that `ipfs://` URIs are rewritten onto
    #[serde(default = "default_ipfs_gateway")]
    pub ipfs_gateway: String,

    /// Outgoing request budget shared by RPC and gateway calls
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Concurrent token metadata fetches per beat listing
    #[serde(default = "default_metadata_concurrency")]
    pub metadata_concurrency: usize,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Time budget for one wallet's beat listing; tokens not fetched by then
    /// are left out of the listing
    #[serde(default = "default_listing_deadline_ms")]
    pub listing_deadline_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            contract_address: None,
            ipfs_gateway: default_ipfs_gateway(),
            requests_per_second: default_requests_per_second(),
            metadata_concurrency: default_metadata_concurrency(),
            request_timeout_ms: default_request_timeout_ms(),
            listing_deadline_ms: default_listing_deadline_ms(),
        }
    }
}

/// Data provider orchestration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Deadline for each individual backend call
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Deadline for a chain beat listing, which spans many requests.
    /// Must exceed `chain.listing_deadline_ms` so partial listings survive.
    #[serde(default = "default_listing_timeout_ms")]
    pub listing_timeout_ms: u64,

    /// Concurrent chain enhancements when listing all producers
    #[serde(default = "default_enhancement_concurrency")]
    pub enhancement_concurrency: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout_ms(),
            listing_timeout_ms: default_listing_timeout_ms(),
            enhancement_concurrency: default_enhancement_concurrency(),
        }
    }
}

fn default_port() -> u16 {
    5780
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dataset() -> String {
    "production".to_string()
}

fn default_api_version() -> String {
    "2023-05-03".to_string()
}

fn default_featured_limit() -> usize {
    6
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_ipfs_gateway() -> String {
    "https://gateway.pinata.cloud/ipfs/".to_string()
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_metadata_concurrency() -> usize {
    4
}

fn default_call_timeout_ms() -> u64 {
    10_000
}

// 500 tokens need 1 + 2 * 500 requests: about 100 s at the default 10 req/s
fn default_listing_deadline_ms() -> u64 {
    110_000
}

fn default_listing_timeout_ms() -> u64 {
    120_000
}

fn default_enhancement_concurrency() -> usize {
    8
}

/// Resolve the config file path.
///
/// Priority order:
/// 1. Command-line argument
/// 2. `BEATSCHAIN_CONFIG` environment variable
/// 3. `<user config dir>/beatschain/<module>.toml`
///
/// Returns `None` only when no candidate can be determined at all.
pub fn resolve_config_path(cli_arg: Option<&Path>, module_name: &str) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("beatschain").join(format!("{}.toml", module_name)))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load the config file if it exists, otherwise fall back to defaults.
///
/// A missing file is not an error; a file that exists but cannot be parsed is.
pub fn load_or_default(path: Option<&Path>) -> Result<TomlConfig> {
    match path {
        Some(path) if path.exists() => {
            let config = load_toml_config(path)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        Some(path) => {
            warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            );
            Ok(TomlConfig::default())
        }
        None => {
            warn!("No config file location available, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Write a config file (used to seed a starter file for operators)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize config failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
