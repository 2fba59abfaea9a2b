//! Configuration resolution for beatschain-dp
//!
//! Provides multi-tier configuration resolution with
//! command line / environment → TOML → built-in default priority.

use beatschain_common::config::{load_or_default, TomlConfig};
use beatschain_common::models::is_wallet_address;
use beatschain_common::{Error, Result};
use std::path::Path;
use tracing::{info, warn};

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub rpc_url: Option<String>,
    pub contract_address: Option<String>,
    pub ipfs_gateway: Option<String>,
    pub sanity_project_id: Option<String>,
    pub sanity_dataset: Option<String>,
    pub sanity_token: Option<String>,
}

/// Read the config file (defaults when missing), then apply overrides
pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<TomlConfig> {
    resolve(load_or_default(path)?, overrides)
}

/// Apply overrides on top of the TOML configuration and validate the result
pub fn resolve(mut config: TomlConfig, overrides: ConfigOverrides) -> Result<TomlConfig> {
    if let Some(port) = overrides.port {
        config.port = port;
    }

    if let Some(url) = non_blank(overrides.rpc_url) {
        override_field("chain.rpc_url", &mut config.chain.rpc_url, url);
    }
    if let Some(gateway) = non_blank(overrides.ipfs_gateway) {
        override_field("chain.ipfs_gateway", &mut config.chain.ipfs_gateway, gateway);
    }
    if let Some(address) = non_blank(overrides.contract_address) {
        if config.chain.contract_address.is_some() {
            warn!("chain.contract_address found in TOML and environment. Using environment.");
        }
        config.chain.contract_address = Some(address);
    }

    if let Some(project) = non_blank(overrides.sanity_project_id) {
        override_field("content.project_id", &mut config.content.project_id, project);
    }
    if let Some(dataset) = non_blank(overrides.sanity_dataset) {
        override_field("content.dataset", &mut config.content.dataset, dataset);
    }
    if let Some(token) = non_blank(overrides.sanity_token) {
        config.content.token = Some(token);
    }

    validate(&config)?;
    Ok(config)
}

/// Reject settings the clients cannot work with
pub fn validate(config: &TomlConfig) -> Result<()> {
    if let Some(address) = &config.chain.contract_address {
        if !is_wallet_address(address) {
            return Err(Error::Config(format!(
                "chain.contract_address '{}' is not a 0x-prefixed 20-byte address",
                address
            )));
        }
    }

    for (name, url) in [
        ("chain.rpc_url", &config.chain.rpc_url),
        ("chain.ipfs_gateway", &config.chain.ipfs_gateway),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "{} must be an http(s) URL, got '{}'",
                name, url
            )));
        }
    }

    if config.chain.requests_per_second == 0 {
        return Err(Error::Config(
            "chain.requests_per_second must be at least 1".to_string(),
        ));
    }

    if config.provider.call_timeout_ms == 0 {
        return Err(Error::Config(
            "provider.call_timeout_ms must be at least 1".to_string(),
        ));
    }

    if config.provider.listing_timeout_ms <= config.chain.listing_deadline_ms {
        return Err(Error::Config(format!(
            "provider.listing_timeout_ms ({}) must exceed chain.listing_deadline_ms ({})",
            config.provider.listing_timeout_ms, config.chain.listing_deadline_ms
        )));
    }

    Ok(())
}

fn override_field(name: &str, field: &mut String, value: String) {
    if *field != value {
        info!("{} overridden from environment/command line", name);
    }
    *field = value;
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
