// Chain backend client
//
// Reads the beat NFT contract through JSON-RPC `eth_call` and dereferences
// token URIs through an IPFS gateway. There is no indexer behind this client,
// so it cannot enumerate producers or curate featured beats.

use super::abi;
use super::metadata::{rewrite_gateway_uri, TokenMetadata};
use super::{BackendError, BackendResult, CatalogSource};
use async_trait::async_trait;
use beatschain_common::config::ChainConfig;
use beatschain_common::models::is_wallet_address;
use beatschain_common::{Beat, Producer};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

const SOURCE_ID: &str = "chain";

/// Upper bound on synthesized token ids per listing
const MAX_TOKENS_PER_LISTING: u64 = 500;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (CallParams<'a>, &'static str),
}

#[derive(Debug, Serialize)]
struct CallParams<'a> {
    to: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

pub struct ChainClient {
    config: ChainConfig,
    client: reqwest::Client,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    request_id: AtomicU64,
}

impl ChainClient {
    pub fn new(config: ChainConfig) -> BackendResult<Self> {
        let per_second =
            NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = governor::RateLimiter::direct(governor::Quota::per_second(per_second));

        let client = reqwest::Client::builder()
            .user_agent(concat!("beatschain-dp/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            config,
            client,
            rate_limiter,
            request_id: AtomicU64::new(1),
        })
    }

    /// Check if a contract address is configured
    pub fn is_configured(&self) -> bool {
        self.contract_address().is_some()
    }

    fn contract_address(&self) -> Option<&str> {
        self.config
            .contract_address
            .as_deref()
            .filter(|a| is_wallet_address(a))
    }

    async fn eth_call(&self, data: &str) -> BackendResult<Vec<u8>> {
        let contract = self
            .contract_address()
            .ok_or(BackendError::NotConfigured(SOURCE_ID))?;

        self.rate_limiter.until_ready().await;

        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.request_id.fetch_add(1, Ordering::Relaxed),
            method: "eth_call",
            params: (CallParams { to: contract, data }, "latest"),
        };

        let response = self
            .client
            .post(&self.config.rpc_url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::Status {
                source_id: SOURCE_ID,
                status: response.status().as_u16(),
            });
        }

        let body: RpcResponse = response.json().await?;
        if let Some(err) = body.error {
            return Err(BackendError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        let result = body
            .result
            .ok_or_else(|| BackendError::Decode("RPC response without result".to_string()))?;
        abi::decode_hex(&result)
    }

    async fn balance_of(&self, address: &str) -> BackendResult<u64> {
        let data = abi::encode_address_call(abi::BALANCE_OF, address)?;
        abi::decode_uint(&self.eth_call(&data).await?)
    }

    async fn token_uri(&self, token_id: u128) -> BackendResult<String> {
        let data = abi::encode_uint_call(abi::TOKEN_URI, token_id);
        abi::decode_string(&self.eth_call(&data).await?)
    }

    async fn owner_of(&self, token_id: u128) -> BackendResult<String> {
        let data = abi::encode_uint_call(abi::OWNER_OF, token_id);
        abi::decode_address(&self.eth_call(&data).await?)
    }

    async fn fetch_metadata(&self, token_uri: &str) -> BackendResult<TokenMetadata> {
        let url = rewrite_gateway_uri(token_uri, &self.config.ipfs_gateway);
        debug!("Fetching token metadata: {}", url);

        self.rate_limiter.until_ready().await;

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::Status {
                source_id: "ipfs gateway",
                status: response.status().as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::Decode(format!("token metadata at {}: {}", url, e)))
    }

    /// Resolve one token into a beat; `None` when the token has no URI
    async fn fetch_beat(&self, token_id: u128, owner: &str) -> BackendResult<Option<Beat>> {
        let uri = self.token_uri(token_id).await?;
        if uri.trim().is_empty() {
            return Ok(None);
        }

        let metadata = self.fetch_metadata(&uri).await?;
        Ok(Some(metadata.into_beat(
            &token_id.to_string(),
            owner,
            &self.config.ipfs_gateway,
        )))
    }

    fn synthesize_producer(wallet_address: &str, balance: u64) -> Producer {
        Producer {
            name: "Web3 Producer".to_string(),
            bio: "Producer on BeatsChain platform.".to_string(),
            location: "Blockchain".to_string(),
            genres: vec!["Hip Hop".to_string()],
            total_beats: balance,
            total_sales: 0,
            verified: false,
            wallet_address: Some(wallet_address.to_string()),
            ..Producer::new(wallet_address.to_lowercase())
        }
    }
}

#[async_trait]
impl CatalogSource for ChainClient {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn get_producer(&self, id: &str) -> BackendResult<Option<Producer>> {
        if !is_wallet_address(id) || !self.is_configured() {
            return Ok(None);
        }

        let balance = self.balance_of(id).await?;
        debug!("Wallet {} holds {} beat tokens", id, balance);

        Ok(Some(Self::synthesize_producer(id, balance)))
    }

    async fn get_producer_beats(&self, producer_id: &str) -> BackendResult<Vec<Beat>> {
        if !is_wallet_address(producer_id) || !self.is_configured() {
            return Ok(Vec::new());
        }

        let deadline =
            tokio::time::Instant::now() + Duration::from_millis(self.config.listing_deadline_ms);

        let balance = self.balance_of(producer_id).await?;
        if balance > MAX_TOKENS_PER_LISTING {
            warn!(
                "Wallet {} holds {} tokens, listing only the first {}",
                producer_id, balance, MAX_TOKENS_PER_LISTING
            );
        }
        let count = balance.min(MAX_TOKENS_PER_LISTING);
        let concurrency = self.config.metadata_concurrency.max(1);

        let fetches = stream::iter(1..=u128::from(count))
            .map(|token_id| async move {
                match self.fetch_beat(token_id, producer_id).await {
                    Ok(beat) => beat,
                    Err(e) => {
                        warn!("Failed to fetch metadata for token {}: {}", token_id, e);
                        None
                    }
                }
            })
            .buffered(concurrency);
        futures::pin_mut!(fetches);

        let mut beats = Vec::new();
        let mut resolved: u64 = 0;
        loop {
            match tokio::time::timeout_at(deadline, fetches.next()).await {
                Ok(Some(beat)) => {
                    resolved += 1;
                    beats.extend(beat);
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        "Listing for {} reached its {} ms deadline after {} of {} tokens",
                        producer_id, self.config.listing_deadline_ms, resolved, count
                    );
                    break;
                }
            }
        }

        Ok(beats)
    }

    async fn get_all_producers(&self) -> BackendResult<Vec<Producer>> {
        // Enumeration needs an event indexer
        Ok(Vec::new())
    }

    async fn get_beat(&self, id: &str) -> BackendResult<Option<Beat>> {
        let Ok(token_id) = id.parse::<u128>() else {
            return Ok(None);
        };
        if !self.is_configured() {
            return Ok(None);
        }

        let uri = self.token_uri(token_id).await?;
        if uri.trim().is_empty() {
            return Ok(None);
        }
        let metadata = self.fetch_metadata(&uri).await?;

        let owner = match self.owner_of(token_id).await {
            Ok(owner) => owner,
            Err(e) => {
                warn!("Failed to resolve owner of token {}: {}", token_id, e);
                String::new()
            }
        };

        Ok(Some(metadata.into_beat(id, &owner, &self.config.ipfs_gateway)))
    }

    async fn get_featured_beats(&self, _limit: Option<usize>) -> BackendResult<Vec<Beat>> {
        // Curation needs an indexer
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(contract: Option<&str>) -> ChainClient {
        ChainClient::new(ChainConfig {
            contract_address: contract.map(str::to_string),
            ..ChainConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_source_id() {
        assert_eq!(client(None).source_id(), "chain");
    }

    #[test]
    fn test_is_configured() {
        assert!(!client(None).is_configured());
        assert!(!client(Some("not-an-address")).is_configured());
        assert!(client(Some("0x52908400098527886E0F7030069857D2E4169EE7")).is_configured());
    }

    #[test]
    fn test_synthesize_producer() {
        let producer =
            ChainClient::synthesize_producer("0x52908400098527886E0F7030069857D2E4169EE7", 4);

        assert_eq!(producer.id, "0x52908400098527886e0f7030069857d2e4169ee7");
        assert_eq!(
            producer.wallet_address.as_deref(),
            Some("0x52908400098527886E0F7030069857D2E4169EE7")
        );
        assert_eq!(producer.total_beats, 4);
        assert_eq!(producer.total_sales, 0);
        assert_eq!(producer.genres, vec!["Hip Hop".to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_inputs_short_circuit() {
        let client = client(Some("0x52908400098527886E0F7030069857D2E4169EE7"));

        assert!(client.get_producer("0xABC").await.unwrap().is_none());
        assert!(client.get_producer("dj-test").await.unwrap().is_none());
        assert!(client.get_producer_beats("0xABC").await.unwrap().is_empty());
        assert!(client.get_beat("abc-beat").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_client_returns_nothing() {
        let client = client(None);

        assert!(client
            .get_producer("0x52908400098527886E0F7030069857D2E4169EE7")
            .await
            .unwrap()
            .is_none());
        assert!(client.get_beat("42").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_enumeration() {
        let client = client(None);
        assert!(client.get_all_producers().await.unwrap().is_empty());
        assert!(client.get_featured_beats(Some(3)).await.unwrap().is_empty());
    }
}
