// Content store client
//
// Curated producer and beat documents live in a hosted structured-content
// store queried with GROQ over HTTP:
//   GET {base}/v{api_version}/data/query/{dataset}?query=...&$param="json"
// The response wraps the query value in `{ "result": ... }`.

use super::{BackendError, BackendResult, CatalogSource};
use async_trait::async_trait;
use beatschain_common::config::ContentConfig;
use beatschain_common::models::{DEFAULT_BPM, DEFAULT_PRODUCER_NAME};
use beatschain_common::{Beat, Producer};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const SOURCE_ID: &str = "content";

const PRODUCER_PROJECTION: &str = r#"{
    _id,
    "slug": slug.current,
    name,
    bio,
    location,
    genres,
    totalBeats,
    totalSales,
    verified,
    walletAddress,
    "profileImageUrl": profileImage.asset->url,
    "coverImageUrl": coverImage.asset->url
}"#;

const BEAT_PROJECTION: &str = r#"{
    _id,
    "slug": slug.current,
    title,
    description,
    genre,
    key,
    bpm,
    price,
    "producerId": coalesce(producer->slug.current, producer._ref),
    "producerName": producer->name,
    "audioUrl": audioFile.asset->url,
    "coverImageUrl": coverImage.asset->url,
    tokenId
}"#;

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: Option<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProducerDocument {
    #[serde(rename = "_id")]
    id: String,
    slug: Option<String>,
    name: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    genres: Option<Vec<String>>,
    total_beats: Option<f64>,
    total_sales: Option<f64>,
    verified: Option<bool>,
    wallet_address: Option<String>,
    profile_image_url: Option<String>,
    cover_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BeatDocument {
    #[serde(rename = "_id")]
    id: String,
    slug: Option<String>,
    title: Option<String>,
    description: Option<String>,
    genre: Option<String>,
    key: Option<String>,
    bpm: Option<f64>,
    price: Option<f64>,
    producer_id: Option<String>,
    producer_name: Option<String>,
    audio_url: Option<String>,
    cover_image_url: Option<String>,
    token_id: Option<serde_json::Value>,
}

impl From<ProducerDocument> for Producer {
    fn from(doc: ProducerDocument) -> Self {
        let id = non_blank(doc.slug).unwrap_or(doc.id);
        let defaults = Producer::new(id);

        Producer {
            name: non_blank(doc.name).unwrap_or(defaults.name.clone()),
            bio: non_blank(doc.bio).unwrap_or(defaults.bio.clone()),
            location: non_blank(doc.location).unwrap_or(defaults.location.clone()),
            genres: doc.genres.unwrap_or_default(),
            total_beats: to_count(doc.total_beats),
            total_sales: to_count(doc.total_sales),
            verified: doc.verified.unwrap_or(false),
            wallet_address: non_blank(doc.wallet_address),
            profile_image_url: non_blank(doc.profile_image_url),
            cover_image_url: non_blank(doc.cover_image_url),
            ..defaults
        }
        .normalized()
    }
}

impl From<BeatDocument> for Beat {
    fn from(doc: BeatDocument) -> Self {
        let token_id = doc.token_id.and_then(|v| match v {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Beat {
            id: non_blank(doc.slug).unwrap_or(doc.id),
            title: non_blank(doc.title).unwrap_or_else(|| "Untitled Beat".to_string()),
            description: doc.description.unwrap_or_default(),
            genre: non_blank(doc.genre).unwrap_or_else(|| "Hip Hop".to_string()),
            key: non_blank(doc.key).unwrap_or_else(|| "C".to_string()),
            bpm: doc
                .bpm
                .filter(|v| v.is_finite() && *v >= 1.0)
                .map(|v| v as u32)
                .unwrap_or(DEFAULT_BPM),
            price: doc.price.unwrap_or(0.0),
            producer_id: doc.producer_id.unwrap_or_default(),
            producer_name: non_blank(doc.producer_name)
                .unwrap_or_else(|| DEFAULT_PRODUCER_NAME.to_string()),
            audio_url: doc.audio_url,
            cover_image_url: doc.cover_image_url,
            is_nft: token_id.is_some(),
            token_id,
        }
        .normalized()
    }
}

pub struct SanityClient {
    config: ContentConfig,
    client: reqwest::Client,
}

impl SanityClient {
    pub fn new(config: ContentConfig) -> BackendResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("beatschain-dp/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { config, client })
    }

    /// Check if a project is configured
    pub fn is_configured(&self) -> bool {
        !self.config.project_id.trim().is_empty()
    }

    /// Query endpoint for the configured project and dataset
    pub fn query_url(&self) -> String {
        let base = match &self.config.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.api.sanity.io", self.config.project_id),
        };
        format!(
            "{}/v{}/data/query/{}",
            base, self.config.api_version, self.config.dataset
        )
    }

    async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &[(&str, &str)],
    ) -> BackendResult<Option<T>> {
        if !self.is_configured() {
            return Err(BackendError::NotConfigured(SOURCE_ID));
        }

        let mut query: Vec<(String, String)> = vec![("query".to_string(), groq.to_string())];
        for (name, value) in params {
            // Parameters are passed JSON-encoded
            let encoded = serde_json::Value::String((*value).to_string()).to_string();
            query.push((format!("${}", name), encoded));
        }

        let mut request = self.client.get(self.query_url()).query(&query);
        if let Some(token) = self.config.token.as_deref().filter(|t| !t.is_empty()) {
            request = request.bearer_auth(token);
        }

        debug!("Content query: {}", groq.split_whitespace().collect::<Vec<_>>().join(" "));

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(BackendError::Status {
                source_id: SOURCE_ID,
                status: response.status().as_u16(),
            });
        }

        let body: QueryResponse<T> = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(format!("content query result: {}", e)))?;
        Ok(body.result)
    }
}

#[async_trait]
impl CatalogSource for SanityClient {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn get_producer(&self, id: &str) -> BackendResult<Option<Producer>> {
        let groq = format!(
            r#"*[_type == "producer" && (_id == $id || slug.current == $id)][0]{}"#,
            PRODUCER_PROJECTION
        );
        let doc: Option<ProducerDocument> = self.query(&groq, &[("id", id)]).await?;
        Ok(doc.map(Producer::from))
    }

    async fn get_producer_beats(&self, producer_id: &str) -> BackendResult<Vec<Beat>> {
        let groq = format!(
            r#"*[_type == "beat" && (producer._ref == $producerId || producer->slug.current == $producerId)] | order(_createdAt desc){}"#,
            BEAT_PROJECTION
        );
        let docs: Option<Vec<BeatDocument>> =
            self.query(&groq, &[("producerId", producer_id)]).await?;
        Ok(docs.unwrap_or_default().into_iter().map(Beat::from).collect())
    }

    async fn get_all_producers(&self) -> BackendResult<Vec<Producer>> {
        let groq = format!(
            r#"*[_type == "producer"] | order(_createdAt desc){}"#,
            PRODUCER_PROJECTION
        );
        let docs: Option<Vec<ProducerDocument>> = self.query(&groq, &[]).await?;
        Ok(docs
            .unwrap_or_default()
            .into_iter()
            .map(Producer::from)
            .collect())
    }

    async fn get_beat(&self, id: &str) -> BackendResult<Option<Beat>> {
        let groq = format!(
            r#"*[_type == "beat" && (_id == $id || slug.current == $id)][0]{}"#,
            BEAT_PROJECTION
        );
        let doc: Option<BeatDocument> = self.query(&groq, &[("id", id)]).await?;
        Ok(doc.map(Beat::from))
    }

    async fn get_featured_beats(&self, limit: Option<usize>) -> BackendResult<Vec<Beat>> {
        let limit = limit.unwrap_or(self.config.featured_limit);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let groq = format!(
            r#"*[_type == "beat" && featured == true] | order(_createdAt desc)[0...{}]{}"#,
            limit, BEAT_PROJECTION
        );
        let docs: Option<Vec<BeatDocument>> = self.query(&groq, &[]).await?;
        Ok(docs.unwrap_or_default().into_iter().map(Beat::from).collect())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn to_count(value: Option<f64>) -> u64 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v as u64)
        .unwrap_or(0)
}
