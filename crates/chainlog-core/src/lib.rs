//! # chainlog-core
//!
//! Core types shared across all ChainLog crates: the ABI type/value model,
//! the node wire shapes the decoder consumes (logs, transactions, blocks,
//! receipts), the decoded result types, and the error taxonomy.
//!
//! Nothing in this crate performs I/O. Fetching node data is delegated to a
//! [`ChainResolver`] supplied by the caller.

pub mod chain;
pub mod error;
pub mod log;
pub mod resolver;
pub mod result;
pub mod types;

pub use chain::ChainId;
pub use error::{DecodeError, DescriptorError, EncodeError, ParserError, ResolutionError};
pub use log::{Block, BlockTransactions, LogEntry, Receipt, Transaction};
pub use resolver::ChainResolver;
pub use result::{DecodedValue, EventParserResult};
pub use types::{AbiType, AbiValue};
