//! Catalog data model shared by the data provider and its callers
//!
//! Producers and beats are read-only projections: they are built fresh from
//! whichever backend answered and are never written back.

use serde::{Deserialize, Serialize};

/// Default BPM when a source omits tempo
pub const DEFAULT_BPM: u32 = 120;

/// Placeholder producer name when a source has none
pub const DEFAULT_PRODUCER_NAME: &str = "Beat Creator";

/// Placeholder producer bio when a source has none
pub const DEFAULT_PRODUCER_BIO: &str = "Beat creator";

/// Placeholder producer location when a source has none
pub const DEFAULT_PRODUCER_LOCATION: &str = "Unknown";

/// A beat producer profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Producer {
    /// Lower-cased wallet address or content-store slug
    pub id: String,
    pub name: String,
    pub bio: String,
    pub location: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub total_beats: u64,
    #[serde(default)]
    pub total_sales: u64,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
}

impl Producer {
    /// Create a producer with placeholder descriptive fields and zero counters
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: DEFAULT_PRODUCER_NAME.to_string(),
            bio: DEFAULT_PRODUCER_BIO.to_string(),
            location: DEFAULT_PRODUCER_LOCATION.to_string(),
            genres: Vec::new(),
            total_beats: 0,
            total_sales: 0,
            verified: false,
            wallet_address: None,
            profile_image_url: None,
            cover_image_url: None,
        }
    }

    /// Overlay the dynamic counters from another source.
    ///
    /// A counter from `other` replaces ours only when it is non-zero, so a
    /// zero reported by the chain never hides a count known to the catalog.
    pub fn merge_counters(mut self, other: &Producer) -> Self {
        if other.total_beats != 0 {
            self.total_beats = other.total_beats;
        }
        if other.total_sales != 0 {
            self.total_sales = other.total_sales;
        }
        self
    }

    /// Fill blank descriptive fields with their defaults
    pub fn normalized(mut self) -> Self {
        if self.name.trim().is_empty() {
            self.name = DEFAULT_PRODUCER_NAME.to_string();
        }
        if self.bio.trim().is_empty() {
            self.bio = DEFAULT_PRODUCER_BIO.to_string();
        }
        if self.location.trim().is_empty() {
            self.location = DEFAULT_PRODUCER_LOCATION.to_string();
        }
        self
    }
}

/// A beat listed on the marketplace, either catalog-only or minted as an NFT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beat {
    /// Content-store id or on-chain token id
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub genre: String,
    pub key: String,
    #[serde(default = "default_bpm")]
    pub bpm: u32,
    /// Price in native currency
    #[serde(default)]
    pub price: f64,
    pub producer_id: String,
    pub producer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(rename = "isNFT", default)]
    pub is_nft: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

fn default_bpm() -> u32 {
    DEFAULT_BPM
}

impl Beat {
    /// Enforce the beat invariants: positive bpm, non-negative finite price,
    /// and `is_nft` set exactly when a token id is present.
    pub fn normalized(mut self) -> Self {
        if self.bpm == 0 {
            self.bpm = DEFAULT_BPM;
        }
        if !self.price.is_finite() || self.price < 0.0 {
            self.price = 0.0;
        }
        self.token_id = self.token_id.filter(|t| !t.trim().is_empty());
        self.is_nft = self.token_id.is_some();
        self.audio_url = self.audio_url.filter(|u| !u.trim().is_empty());
        self.cover_image_url = self.cover_image_url.filter(|u| !u.trim().is_empty());
        self
    }
}

/// Whether `value` looks like an EVM account address (`0x` + 40 hex digits)
pub fn is_wallet_address(value: &str) -> bool {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
