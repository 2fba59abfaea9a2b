// ERC-721 read-call encoding
//
// Only the three view functions the chain client needs. Arguments and return
// values are single 32-byte words except `tokenURI`, which returns a dynamic
// string (offset word, length word, padded bytes).

use super::{BackendError, BackendResult};
use beatschain_common::models::is_wallet_address;

/// `balanceOf(address)`
pub const BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// `tokenURI(uint256)`
pub const TOKEN_URI: [u8; 4] = [0xc8, 0x7b, 0x56, 0xdd];

/// `ownerOf(uint256)`
pub const OWNER_OF: [u8; 4] = [0x63, 0x52, 0x21, 0x1e];

const WORD: usize = 32;

/// Calldata for a function taking one `address`
pub fn encode_address_call(selector: [u8; 4], address: &str) -> BackendResult<String> {
    if !is_wallet_address(address) {
        return Err(BackendError::Decode(format!("invalid address: {}", address)));
    }
    let bytes = decode_hex(address)?;

    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector);
    data.extend_from_slice(&[0u8; WORD - 20]);
    data.extend_from_slice(&bytes);
    Ok(to_hex(&data))
}

/// Calldata for a function taking one `uint256`
pub fn encode_uint_call(selector: [u8; 4], value: u128) -> String {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector);
    data.extend_from_slice(&[0u8; WORD - 16]);
    data.extend_from_slice(&value.to_be_bytes());
    to_hex(&data)
}

/// Decode a `uint256` return value, saturating at `u64::MAX`
pub fn decode_uint(data: &[u8]) -> BackendResult<u64> {
    let word = word_at(data, 0)?;
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Ok(u64::MAX);
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[WORD - 8..]);
    Ok(u64::from_be_bytes(tail))
}

/// Decode an `address` return value as lower-case `0x` hex
pub fn decode_address(data: &[u8]) -> BackendResult<String> {
    let word = word_at(data, 0)?;
    Ok(to_hex(&word[WORD - 20..]))
}

/// Decode a dynamic `string` return value
pub fn decode_string(data: &[u8]) -> BackendResult<String> {
    let offset = word_as_usize(word_at(data, 0)?)?;
    let length = word_as_usize(word_at(data, offset)?)?;

    let start = offset + WORD;
    let end = start
        .checked_add(length)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| BackendError::Decode("string length out of bounds".to_string()))?;

    String::from_utf8(data[start..end].to_vec())
        .map_err(|e| BackendError::Decode(format!("string is not UTF-8: {}", e)))
}

/// Parse `0x`-prefixed (or bare) hex into bytes
pub fn decode_hex(value: &str) -> BackendResult<Vec<u8>> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    hex::decode(digits).map_err(|e| BackendError::Decode(format!("malformed hex {}: {}", value, e)))
}

/// Lower-case `0x`-prefixed hex
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn word_at(data: &[u8], offset: usize) -> BackendResult<&[u8]> {
    offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            BackendError::Decode(format!(
                "expected 32-byte word at offset {}, got {} bytes",
                offset,
                data.len()
            ))
        })
}

fn word_as_usize(word: &[u8]) -> BackendResult<usize> {
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(BackendError::Decode("offset exceeds 64 bits".to_string()));
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(tail))
        .map_err(|_| BackendError::Decode("offset exceeds usize".to_string()))
}
