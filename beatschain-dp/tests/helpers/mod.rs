//! Test Helper Utilities
//!
//! Shared utilities for testing beatschain-dp

#![allow(dead_code)]

pub mod fixtures;
pub mod log_capture;
pub mod mock_source;

pub use fixtures::{catalog_beat, nft_beat, producer, producer_with_wallet, WALLET};
pub use log_capture::LogCapture;
pub use mock_source::{Failure, MockSource};

use beatschain_common::config::ProviderConfig;
use beatschain_dp::UnifiedDataProvider;
use std::sync::Arc;

/// Provider over the two mocks with a short call timeout
pub fn provider(content: Arc<MockSource>, chain: Arc<MockSource>) -> UnifiedDataProvider {
    UnifiedDataProvider::new(
        content,
        chain,
        &ProviderConfig {
            call_timeout_ms: 200,
            listing_timeout_ms: 200,
            enhancement_concurrency: 4,
        },
    )
}
