//! Unified data provider
//!
//! Reconciles the content store with chain data behind one read interface.
//!
//! Every public operation is total: backend failures, timeouts and panics are
//! logged and turned into `None` / an empty list. Callers only ever observe
//! absence of data.
//!
//! Routing policy:
//! - Wallet-shaped producer ids and numeric beat ids try the chain first and
//!   return its answer outright when there is one
//! - Everything else (and every chain miss) falls back to the content store
//! - Producers from the content store that carry a wallet address get their
//!   counters overlaid from the chain ([`Producer::merge_counters`])

pub mod routing;

use crate::backends::{
    BackendError, BackendResult, CatalogSource, ChainClient, SanityClient,
};
use beatschain_common::config::{ProviderConfig, TomlConfig};
use beatschain_common::{Beat, Producer};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

pub use routing::IdKind;

pub struct UnifiedDataProvider {
    content: Arc<dyn CatalogSource>,
    chain: Arc<dyn CatalogSource>,
    call_timeout: Duration,
    listing_timeout: Duration,
    enhancement_concurrency: usize,
}

impl UnifiedDataProvider {
    pub fn new(
        content: Arc<dyn CatalogSource>,
        chain: Arc<dyn CatalogSource>,
        config: &ProviderConfig,
    ) -> Self {
        Self {
            content,
            chain,
            call_timeout: Duration::from_millis(config.call_timeout_ms),
            listing_timeout: Duration::from_millis(config.listing_timeout_ms),
            enhancement_concurrency: config.enhancement_concurrency.max(1),
        }
    }

    /// Build the provider with the HTTP content and chain clients
    pub fn from_config(config: &TomlConfig) -> BackendResult<Self> {
        let content = SanityClient::new(config.content.clone())?;
        let chain = ChainClient::new(config.chain.clone())?;

        if !content.is_configured() {
            warn!("Content store project id not set; content lookups will return nothing");
        }
        if !chain.is_configured() {
            warn!("Beat NFT contract address not set; chain lookups are disabled");
        }

        Ok(Self::new(Arc::new(content), Arc::new(chain), &config.provider))
    }

    /// Producer by wallet address or content id
    pub async fn get_producer(&self, id: &str) -> Option<Producer> {
        if IdKind::classify(id) == IdKind::Empty {
            warn!("get_producer called with an empty id");
            return None;
        }
        self.guarded("get_producer", self.resolve_producer(id)).await
    }

    /// Beats belonging to a producer; chain listing wins when non-empty
    pub async fn get_producer_beats(&self, producer_id: &str) -> Vec<Beat> {
        if IdKind::classify(producer_id) == IdKind::Empty {
            warn!("get_producer_beats called with an empty id");
            return Vec::new();
        }
        self.guarded("get_producer_beats", self.resolve_producer_beats(producer_id))
            .await
    }

    /// All producers known to the content store, chain-enhanced
    pub async fn get_all_producers(&self) -> Vec<Producer> {
        self.guarded("get_all_producers", self.resolve_all_producers())
            .await
    }

    /// Beat by token id or content id
    pub async fn get_beat(&self, id: &str) -> Option<Beat> {
        if IdKind::classify(id) == IdKind::Empty {
            warn!("get_beat called with an empty id");
            return None;
        }
        self.guarded("get_beat", self.resolve_beat(id)).await
    }

    /// Curated beats; content store only
    pub async fn get_featured_beats(&self, limit: Option<usize>) -> Vec<Beat> {
        self.guarded("get_featured_beats", async {
            let beats = self
                .call(self.content.as_ref(), self.content.get_featured_beats(limit))
                .await?;
            Ok(beats.into_iter().map(Beat::normalized).collect())
        })
        .await
    }

    async fn resolve_producer(&self, id: &str) -> BackendResult<Option<Producer>> {
        if IdKind::classify(id) == IdKind::Wallet {
            match self
                .call(self.chain.as_ref(), self.chain.get_producer(id))
                .await
            {
                Ok(Some(producer)) => return Ok(Some(producer.normalized())),
                Ok(None) => debug!("No chain producer for {}", id),
                Err(e) => warn!("Error fetching producer {} from chain: {}", id, e),
            }
        }

        let producer = self
            .call(self.content.as_ref(), self.content.get_producer(id))
            .await?;

        match producer {
            Some(producer) => Ok(Some(self.enhance(producer.normalized()).await)),
            None => Ok(None),
        }
    }

    async fn resolve_producer_beats(&self, producer_id: &str) -> BackendResult<Vec<Beat>> {
        let Some(producer) = self.get_producer(producer_id).await else {
            debug!("No producer resolved for {}", producer_id);
            return Ok(Vec::new());
        };

        if let Some(wallet) = producer.wallet_address.as_deref() {
            // Listing budget, not the per-call one; the client stops at its own
            // shorter deadline and returns what it fetched
            match self
                .call_within(
                    self.listing_timeout,
                    self.chain.as_ref(),
                    self.chain.get_producer_beats(wallet),
                )
                .await
            {
                Ok(beats) if !beats.is_empty() => {
                    return Ok(beats.into_iter().map(Beat::normalized).collect());
                }
                Ok(_) => debug!("No chain beats for wallet {}", wallet),
                Err(e) => warn!("Error fetching beats for {} from chain: {}", wallet, e),
            }
        }

        let beats = self
            .call(self.content.as_ref(), self.content.get_producer_beats(producer_id))
            .await?;
        Ok(beats.into_iter().map(Beat::normalized).collect())
    }

    async fn resolve_all_producers(&self) -> BackendResult<Vec<Producer>> {
        let producers = self
            .call(self.content.as_ref(), self.content.get_all_producers())
            .await?;

        let enhanced: Vec<Producer> = stream::iter(producers)
            .map(|producer| self.enhance(producer.normalized()))
            .buffered(self.enhancement_concurrency)
            .collect()
            .await;
        Ok(enhanced)
    }

    async fn resolve_beat(&self, id: &str) -> BackendResult<Option<Beat>> {
        if IdKind::classify(id) == IdKind::Numeric {
            match self.call(self.chain.as_ref(), self.chain.get_beat(id)).await {
                Ok(Some(beat)) => return Ok(Some(beat.normalized())),
                Ok(None) => debug!("No chain beat for token {}", id),
                Err(e) => warn!("Error fetching beat {} from chain: {}", id, e),
            }
        }

        let beat = self
            .call(self.content.as_ref(), self.content.get_beat(id))
            .await?;
        Ok(beat.map(Beat::normalized))
    }

    /// Overlay chain counters onto a content producer with a linked wallet.
    /// Any chain failure leaves the producer unchanged.
    async fn enhance(&self, producer: Producer) -> Producer {
        let Some(wallet) = producer.wallet_address.clone() else {
            return producer;
        };

        match self
            .call(self.chain.as_ref(), self.chain.get_producer(&wallet))
            .await
        {
            Ok(Some(chain_producer)) => producer.merge_counters(&chain_producer),
            Ok(None) => producer,
            Err(e) => {
                warn!(
                    "Error enhancing producer {} with chain data: {}",
                    producer.id, e
                );
                producer
            }
        }
    }

    /// Bound a single backend call by the configured deadline
    async fn call<T>(
        &self,
        source: &dyn CatalogSource,
        fut: impl Future<Output = BackendResult<T>>,
    ) -> BackendResult<T> {
        self.call_within(self.call_timeout, source, fut).await
    }

    async fn call_within<T>(
        &self,
        limit: Duration,
        source: &dyn CatalogSource,
        fut: impl Future<Output = BackendResult<T>>,
    ) -> BackendResult<T> {
        tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| BackendError::Timeout(source.source_id()))?
    }

    /// Run an operation body, mapping errors and panics to the empty value
    async fn guarded<T: Default>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = BackendResult<T>>,
    ) -> T {
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                error!("{} failed: {}", operation, e);
                T::default()
            }
            Err(_) => {
                error!("{} panicked", operation);
                T::default()
            }
        }
    }
}
