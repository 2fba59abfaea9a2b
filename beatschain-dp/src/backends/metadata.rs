// NFT token metadata
//
// Token URIs point at a JSON document in the usual marketplace layout:
// `name`, `description`, `image`, `animation_url` plus an `attributes` list
// of `{ trait_type, value }` pairs carrying the beat's musical details.

use beatschain_common::models::DEFAULT_BPM;
use beatschain_common::Beat;
use serde::Deserialize;

const IPFS_SCHEME: &str = "ipfs://";

pub const DEFAULT_TITLE: &str = "Untitled Beat";
pub const DEFAULT_ARTIST: &str = "Unknown Artist";
pub const DEFAULT_GENRE: &str = "Hip Hop";
pub const DEFAULT_KEY: &str = "C";
pub const DEFAULT_PRICE: f64 = 0.05;

/// Token metadata document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub animation_url: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// A `{ trait_type, value }` pair; value may be a string or a number
#[derive(Debug, Clone, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl TokenMetadata {
    /// Look up an attribute value by trait name (case-insensitive)
    pub fn attribute(&self, trait_type: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|a| a.trait_type.eq_ignore_ascii_case(trait_type))
            .and_then(|a| match &a.value {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    /// Build a beat for `token_id` owned by `owner`, rewriting asset URIs onto `gateway`
    pub fn into_beat(self, token_id: &str, owner: &str, gateway: &str) -> Beat {
        let genre = self
            .attribute("Genre")
            .unwrap_or_else(|| DEFAULT_GENRE.to_string());
        let key = self.attribute("Key").unwrap_or_else(|| DEFAULT_KEY.to_string());
        let bpm = self
            .attribute("BPM")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 1.0)
            .map(|v| v as u32)
            .unwrap_or(DEFAULT_BPM);
        let price = self
            .attribute("Price")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(DEFAULT_PRICE);

        Beat {
            id: token_id.to_string(),
            title: non_blank(self.name).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            description: self.description.unwrap_or_default(),
            genre,
            key,
            bpm,
            price,
            producer_id: owner.to_lowercase(),
            producer_name: non_blank(self.artist).unwrap_or_else(|| DEFAULT_ARTIST.to_string()),
            audio_url: non_blank(self.animation_url).map(|u| rewrite_gateway_uri(&u, gateway)),
            cover_image_url: non_blank(self.image).map(|u| rewrite_gateway_uri(&u, gateway)),
            is_nft: true,
            token_id: Some(token_id.to_string()),
        }
        .normalized()
    }
}

/// Rewrite an `ipfs://` URI onto an HTTP(S) gateway base.
///
/// `ipfs://<cid>/<path>` and `ipfs://ipfs/<cid>/<path>` both become
/// `<gateway>/<cid>/<path>`. Anything else is returned unchanged.
pub fn rewrite_gateway_uri(uri: &str, gateway: &str) -> String {
    let Some(rest) = uri.strip_prefix(IPFS_SCHEME) else {
        return uri.to_string();
    };
    let rest = rest.strip_prefix("ipfs/").unwrap_or(rest);

    if gateway.ends_with('/') {
        format!("{}{}", gateway, rest)
    } else {
        format!("{}/{}", gateway, rest)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GATEWAY: &str = "https://gateway.example/ipfs/";

    #[test]
    fn test_rewrite_gateway_uri() {
        assert_eq!(
            rewrite_gateway_uri("ipfs://QmCid/beat.mp3", GATEWAY),
            "https://gateway.example/ipfs/QmCid/beat.mp3"
        );
        assert_eq!(
            rewrite_gateway_uri("ipfs://ipfs/QmCid", GATEWAY),
            "https://gateway.example/ipfs/QmCid"
        );
        assert_eq!(
            rewrite_gateway_uri("ipfs://QmCid", "https://gw.example/ipfs"),
            "https://gw.example/ipfs/QmCid"
        );
        assert_eq!(
            rewrite_gateway_uri("https://cdn.example/cover.png", GATEWAY),
            "https://cdn.example/cover.png"
        );
    }

    #[test]
    fn test_into_beat_reads_attributes() {
        let metadata: TokenMetadata = serde_json::from_value(serde_json::json!({
            "name": "Midnight Groove",
            "description": "Late night amapiano",
            "artist": "DJ Test",
            "image": "ipfs://QmCover",
            "animation_url": "ipfs://QmAudio/track.mp3",
            "attributes": [
                { "trait_type": "Genre", "value": "Amapiano" },
                { "trait_type": "BPM", "value": 112 },
                { "trait_type": "Key", "value": "F#m" },
                { "trait_type": "Price", "value": "0.25" }
            ]
        }))
        .unwrap();

        let beat = metadata.into_beat("7", "0xABCDEF", GATEWAY);

        assert_eq!(beat.id, "7");
        assert_eq!(beat.title, "Midnight Groove");
        assert_eq!(beat.genre, "Amapiano");
        assert_eq!(beat.bpm, 112);
        assert_eq!(beat.key, "F#m");
        assert_eq!(beat.price, 0.25);
        assert_eq!(beat.producer_id, "0xabcdef");
        assert_eq!(beat.producer_name, "DJ Test");
        assert_eq!(
            beat.audio_url.as_deref(),
            Some("https://gateway.example/ipfs/QmAudio/track.mp3")
        );
        assert_eq!(
            beat.cover_image_url.as_deref(),
            Some("https://gateway.example/ipfs/QmCover")
        );
        assert!(beat.is_nft);
        assert_eq!(beat.token_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_into_beat_defaults() {
        let beat = TokenMetadata::default().into_beat("1", "", GATEWAY);

        assert_eq!(beat.title, DEFAULT_TITLE);
        assert_eq!(beat.producer_name, DEFAULT_ARTIST);
        assert_eq!(beat.genre, DEFAULT_GENRE);
        assert_eq!(beat.key, DEFAULT_KEY);
        assert_eq!(beat.bpm, DEFAULT_BPM);
        assert_eq!(beat.price, DEFAULT_PRICE);
        assert!(beat.audio_url.is_none());
        assert!(beat.cover_image_url.is_none());
    }

    #[test]
    fn test_unparseable_bpm_falls_back() {
        let metadata: TokenMetadata = serde_json::from_value(serde_json::json!({
            "attributes": [
                { "trait_type": "bpm", "value": "fast" },
                { "trait_type": "Price", "value": -1 }
            ]
        }))
        .unwrap();

        let beat = metadata.into_beat("3", "0x1", GATEWAY);
        assert_eq!(beat.bpm, DEFAULT_BPM);
        assert_eq!(beat.price, 0.0);
    }
}
