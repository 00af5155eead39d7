//! Keccak-256 selectors
//!
//! Functions and errors are identified by the first four bytes of the
//! digest of their canonical signature, events by the full digest (topic
//! zero). The digest is legacy Keccak, not NIST SHA3-256.

use sha3::{Digest, Keccak256};

pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&Keccak256::digest(data.as_ref()));
    hash
}

/// `name(type1,type2,...)`
pub fn canonical_signature<S: AsRef<str>>(name: &str, types: &[S]) -> String {
    let types: Vec<&str> = types.iter().map(AsRef::as_ref).collect();
    format!("{}({})", name, types.join(","))
}

/// First four digest bytes of a function or error signature
pub fn selector_bytes(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// `0x` followed by eight lowercase hex digits
pub fn function_selector(signature: &str) -> String {
    format!("0x{}", hex::encode(selector_bytes(signature)))
}

/// `0x` followed by the full 64-digit digest
pub fn event_topic(signature: &str) -> String {
    format!("0x{}", hex::encode(keccak256(signature.as_bytes())))
}
