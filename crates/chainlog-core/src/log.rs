//! Node wire shapes: logs, transactions, blocks and receipts.
//!
//! These mirror the JSON-RPC objects returned by `eth_getTransactionByHash`,
//! `eth_getBlockByNumber` and `eth_getTransactionReceipt`. Fields the decoder
//! does not need are ignored on deserialization.

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// One emitted log as delivered by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Contract that emitted the log
    pub address: Address,
    /// topics[0] is the event signature hash unless the event is anonymous
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed arguments
    #[serde(default)]
    pub data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "quantity::opt")]
    pub block_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "quantity::opt")]
    pub transaction_index: Option<u64>,
    /// Position of the log within its block
    #[serde(default, skip_serializing_if = "Option::is_none", with = "quantity::opt")]
    pub log_index: Option<u64>,
}

impl LogEntry {
    /// A log with no block or transaction context attached.
    pub fn new(address: Address, topics: Vec<B256>, data: impl Into<Bytes>) -> Self {
        Self {
            address,
            topics,
            data: data.into(),
            block_number: None,
            block_hash: None,
            transaction_hash: None,
            transaction_index: None,
            log_index: None,
        }
    }

    pub fn with_transaction_hash(mut self, hash: B256) -> Self {
        self.transaction_hash = Some(hash);
        self
    }

    pub fn with_block_number(mut self, number: u64) -> Self {
        self.block_number = Some(number);
        self
    }

    pub fn with_log_index(mut self, index: u64) -> Self {
        self.log_index = Some(index);
        self
    }

    /// topics[0], if present.
    pub fn topic0(&self) -> Option<&B256> {
        self.topics.first()
    }
}

/// A transaction as returned by `eth_getTransactionByHash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: B256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "quantity::opt")]
    pub block_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "quantity::opt")]
    pub transaction_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// `None` for contract creations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
}

impl Transaction {
    pub fn new(hash: B256) -> Self {
        Self {
            hash,
            block_hash: None,
            block_number: None,
            transaction_index: None,
            from: None,
            to: None,
        }
    }
}

/// The `transactions` field of a block: full objects or hashes only,
/// depending on the flag the block was requested with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransactions {
    Full(Vec<Transaction>),
    Hashes(Vec<B256>),
}

impl Default for BlockTransactions {
    fn default() -> Self {
        BlockTransactions::Hashes(Vec::new())
    }
}

impl BlockTransactions {
    /// Transaction hashes in block order.
    pub fn hashes(&self) -> Vec<B256> {
        match self {
            BlockTransactions::Full(txs) => txs.iter().map(|tx| tx.hash).collect(),
            BlockTransactions::Hashes(hashes) => hashes.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            BlockTransactions::Full(txs) => txs.len(),
            BlockTransactions::Hashes(hashes) => hashes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A block as returned by `eth_getBlockByNumber`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(with = "quantity")]
    pub number: u64,
    /// `None` for pending blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<B256>,
    #[serde(default)]
    pub transactions: BlockTransactions,
}

impl Block {
    pub fn new(number: u64, transactions: Vec<Transaction>) -> Self {
        Self {
            number,
            hash: None,
            transactions: BlockTransactions::Full(transactions),
        }
    }
}

/// A transaction receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: B256,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "quantity::opt")]
    pub transaction_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "quantity::opt")]
    pub block_number: Option<u64>,
    /// 1 = success, 0 = reverted; absent on pre-Byzantium receipts
    #[serde(default, skip_serializing_if = "Option::is_none", with = "quantity::opt")]
    pub status: Option<u64>,
    /// Logs in emission order
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

impl Receipt {
    pub fn new(transaction_hash: B256, logs: Vec<LogEntry>) -> Self {
        Self {
            transaction_hash,
            transaction_index: None,
            block_hash: None,
            block_number: None,
            status: Some(1),
            logs,
        }
    }

    /// `false` only when the node reports the transaction as reverted.
    pub fn succeeded(&self) -> bool {
        self.status != Some(0)
    }
}

/// Parse a JSON-RPC hex quantity (`"0x1a"`) into a `u64`.
pub fn parse_quantity(s: &str) -> Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| format!("quantity '{s}' is missing the 0x prefix"))?;
    if digits.is_empty() {
        return Err(format!("quantity '{s}' has no digits"));
    }
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid quantity '{s}': {e}"))
}

/// Serde adapters for hex quantities. Plain JSON numbers are accepted too.
pub(crate) mod quantity {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Hex(String),
        Num(u64),
    }

    impl Repr {
        fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
            match self {
                Repr::Hex(s) => super::parse_quantity(&s).map_err(E::custom),
                Repr::Num(n) => Ok(n),
            }
        }
    }

    pub fn serialize<S: Serializer>(value: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("{value:#x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        Repr::deserialize(d)?.into_u64::<D::Error>()
    }

    pub mod opt {
        use super::Repr;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &Option<u64>, s: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
            Option::<Repr>::deserialize(d)?
                .map(|r| r.into_u64::<D::Error>())
                .transpose()
        }
    }
}
