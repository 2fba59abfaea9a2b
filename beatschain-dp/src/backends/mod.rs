//! Catalog backends
//!
//! Two sources feed the data provider:
//! - Content store (curated producer/beat documents)
//! - Chain (NFT balances and token metadata via JSON-RPC and an IPFS gateway)
//!
//! Both implement [`CatalogSource`]. Backends report failures as
//! [`BackendError`]; deciding what to fall back to is the provider's job.

use async_trait::async_trait;
use beatschain_common::{Beat, Producer};
use thiserror::Error;

pub mod abi;
pub mod chain;
pub mod content;
pub mod metadata;

pub use chain::ChainClient;
pub use content::SanityClient;

/// Backend failure
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote answered with a non-success status
    #[error("{source_id} returned status {status}")]
    Status { source_id: &'static str, status: u16 },

    /// Payload could not be decoded
    #[error("Malformed response: {0}")]
    Decode(String),

    /// JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Call exceeded the provider deadline
    #[error("{0} call timed out")]
    Timeout(&'static str),

    /// Backend is missing required configuration
    #[error("{0} backend is not configured")]
    NotConfigured(&'static str),
}

/// Result type for backend calls
pub type BackendResult<T> = Result<T, BackendError>;

/// A source of producer and beat records
///
/// Misses are `Ok(None)` / `Ok(vec![])`; `Err` means the source could not
/// answer at all.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Source identifier for logging (e.g., "content", "chain")
    fn source_id(&self) -> &'static str;

    async fn get_producer(&self, id: &str) -> BackendResult<Option<Producer>>;

    async fn get_producer_beats(&self, producer_id: &str) -> BackendResult<Vec<Beat>>;

    async fn get_all_producers(&self) -> BackendResult<Vec<Producer>>;

    async fn get_beat(&self, id: &str) -> BackendResult<Option<Beat>>;

    /// Curated listing; `None` uses the source's own default length
    async fn get_featured_beats(&self, limit: Option<usize>) -> BackendResult<Vec<Beat>>;
}
