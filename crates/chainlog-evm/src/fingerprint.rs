//! EVM event signature hashing.
//!
//! The signature hash of an event is the keccak256 of its canonical
//! signature string, e.g.:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef
//!
//! For non-anonymous events it is emitted as topics[0].

use alloy_primitives::B256;
use tiny_keccak::{Hasher, Keccak};

/// keccak256 of arbitrary bytes.
pub fn keccak256(bytes: &[u8]) -> B256 {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(bytes);
    hasher.finalize(&mut output);
    B256::from(output)
}

/// Hash a canonical event signature: `"EventName(type1,type2,...)"`.
pub fn event_signature_hash(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}
