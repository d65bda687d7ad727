use rmp_serde::{decode, encode};
use thiserror::Error;

use crate::{BoardSnapshot, InboundEvent, Move, OutboundEvent};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("encode error: {0}")]
    Encode(#[from] encode::Error),
    #[error("decode error: {0}")]
    Decode(#[from] decode::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn serialize_inbound(event: &InboundEvent) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec(event)?)
}

pub fn deserialize_inbound(bytes: &[u8]) -> Result<InboundEvent, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_outbound(event: &OutboundEvent) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec(event)?)
}

pub fn deserialize_outbound(bytes: &[u8]) -> Result<OutboundEvent, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_snapshot(snapshot: &BoardSnapshot) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec(snapshot)?)
}

pub fn deserialize_snapshot(bytes: &[u8]) -> Result<BoardSnapshot, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_moves(moves: &[Move]) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec(moves)?)
}

pub fn deserialize_moves(bytes: &[u8]) -> Result<Vec<Move>, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_inbound_json(event: &InboundEvent) -> Result<String, WireError> {
    Ok(serde_json::to_string(event)?)
}

pub fn deserialize_inbound_json(json: &str) -> Result<InboundEvent, WireError> {
    Ok(serde_json::from_str(json)?)
}

pub fn serialize_outbound_json(event: &OutboundEvent) -> Result<String, WireError> {
    Ok(serde_json::to_string(event)?)
}

pub fn deserialize_outbound_json(json: &str) -> Result<OutboundEvent, WireError> {
    Ok(serde_json::from_str(json)?)
}

pub fn serialize_snapshot_json(snapshot: &BoardSnapshot) -> Result<String, WireError> {
    Ok(serde_json::to_string(snapshot)?)
}

pub fn deserialize_snapshot_json(json: &str) -> Result<BoardSnapshot, WireError> {
    Ok(serde_json::from_str(json)?)
}

/// Deterministic snapshot hash for desync detection: two participants
/// hold the same game state exactly when their snapshots hash equal.
///
/// Hashes the MessagePack-serialized snapshot using FNV-1a 64-bit.
pub fn snapshot_hash(snapshot: &BoardSnapshot) -> Result<u64, WireError> {
    let bytes = serialize_snapshot(snapshot)?;
    Ok(hash_bytes_fnv1a64(&bytes))
}

/// Deterministic, stable 64-bit hash for raw bytes (FNV-1a).
pub fn hash_bytes_fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut hash = OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
