//! # chainlog-evm
//!
//! EVM event log decoding: ABI codec, event descriptors, log matcher and
//! event decoder.
//!
//! ## Implementation notes
//! - Topics[0] → event signature hash (keccak256), absent for anonymous events
//! - Topics[1..] → indexed parameters (one 32-byte word each; reference
//!   types are only available as their hash)
//! - `data` → non-indexed parameters (ABI-encoded tuple)

pub mod codec;
pub mod decoder;
pub mod descriptor;
pub mod encoder;
pub mod fingerprint;
pub mod matcher;
pub mod signature;

pub use codec::{decode_dynamic, decode_static, decode_tuple};
pub use decoder::{decode, decode_matched, decode_topic};
pub use descriptor::{EventDescriptor, EventParam, ParserConfig};
pub use encoder::{encode_topic, encode_tuple, encode_word, to_dyn_value};
pub use fingerprint::{event_signature_hash, keccak256};
pub use matcher::{check, matches, Mismatch};
