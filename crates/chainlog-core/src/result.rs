//! Decoded event output.

use crate::types::{AbiType, AbiValue};
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// One decoded event argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedValue {
    /// Parameter name from the event declaration (may be empty)
    pub name: String,
    /// Declared ABI type
    pub ty: AbiType,
    /// Whether the value came from a topic rather than the data blob
    pub indexed: bool,
    pub value: AbiValue,
}

impl DecodedValue {
    /// `true` when the argument was indexed as a reference type and only its
    /// keccak-256 digest is available.
    pub fn is_hashed(&self) -> bool {
        self.value.is_hashed()
    }
}

/// One matched-and-decoded event occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParserResult {
    /// Event name, e.g. "Transfer"
    pub event: String,
    /// Arguments in ABI declaration order
    pub values: Vec<DecodedValue>,
    /// Contract that emitted the log
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub transaction_hash: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub log_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub block_number: Option<u64>,
}

impl EventParserResult {
    /// Look up a decoded argument by parameter name.
    pub fn get(&self, name: &str) -> Option<&DecodedValue> {
        self.values.iter().find(|v| v.name == name)
    }

    /// Look up a decoded argument's value by parameter name.
    pub fn value(&self, name: &str) -> Option<&AbiValue> {
        self.get(name).map(|v| &v.value)
    }
}
