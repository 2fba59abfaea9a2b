//! Startup configuration loading tests

mod helpers;

use beatschain_dp::config::{self, ConfigOverrides};
use helpers::LogCapture;
use std::path::PathBuf;
use tracing::Level;

fn missing_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("beatschain-dp-{}-{}.toml", name, std::process::id()))
}

#[test]
fn missing_config_file_is_reported_once() {
    let capture = LogCapture::new();
    let _guard = capture.set_default();
    let path = missing_path("absent");

    let config = config::load(Some(path.as_path()), ConfigOverrides::default()).unwrap();

    assert_eq!(config.port, 5780);
    capture.assert_contains(Level::WARN, "not found, using built-in defaults");
    let warnings = capture
        .records()
        .iter()
        .filter(|r| r.message.contains(&path.display().to_string()))
        .count();
    assert_eq!(warnings, 1);
}

#[test]
fn overrides_are_applied_and_logged() {
    let capture = LogCapture::new();
    let _guard = capture.set_default();

    let config = config::load(
        Some(missing_path("override").as_path()),
        ConfigOverrides {
            rpc_url: Some("https://rpc.example".to_string()),
            ..ConfigOverrides::default()
        },
    )
    .unwrap();

    assert_eq!(config.chain.rpc_url, "https://rpc.example");
    capture.assert_contains(Level::INFO, "chain.rpc_url overridden");
}

#[test]
fn invalid_override_fails_loading() {
    let result = config::load(
        Some(missing_path("invalid").as_path()),
        ConfigOverrides {
            contract_address: Some("0x1234".to_string()),
            ..ConfigOverrides::default()
        },
    );

    assert!(result.is_err());
}
