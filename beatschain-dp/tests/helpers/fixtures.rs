//! Producer and beat fixtures

use beatschain_common::{Beat, Producer};

pub const WALLET: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

pub fn producer(id: &str, name: &str, total_beats: u64, total_sales: u64) -> Producer {
    Producer {
        name: name.to_string(),
        total_beats,
        total_sales,
        genres: vec!["Amapiano".to_string()],
        ..Producer::new(id)
    }
}

pub fn producer_with_wallet(
    id: &str,
    name: &str,
    wallet: &str,
    total_beats: u64,
    total_sales: u64,
) -> Producer {
    Producer {
        wallet_address: Some(wallet.to_string()),
        ..producer(id, name, total_beats, total_sales)
    }
}

pub fn catalog_beat(id: &str, producer_id: &str) -> Beat {
    Beat {
        id: id.to_string(),
        title: format!("Catalog {}", id),
        description: String::new(),
        genre: "Trap".to_string(),
        key: "Am".to_string(),
        bpm: 140,
        price: 0.1,
        producer_id: producer_id.to_string(),
        producer_name: "DJ Test".to_string(),
        audio_url: Some(format!("https://cdn.example/{}.mp3", id)),
        cover_image_url: None,
        is_nft: false,
        token_id: None,
    }
}

pub fn nft_beat(token_id: &str, owner: &str) -> Beat {
    Beat {
        title: format!("Token {}", token_id),
        producer_id: owner.to_lowercase(),
        is_nft: true,
        token_id: Some(token_id.to_string()),
        ..catalog_beat(token_id, owner)
    }
}
