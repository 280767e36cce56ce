//! The `ChainResolver` trait: how the scanner obtains node data.
//!
//! Resolution is the only I/O in the pipeline. Implementations wrap an RPC
//! client, an archive database, or an in-memory fixture store; retries and
//! timeouts belong to the implementation, not to the scanner.

use crate::error::ResolutionError;
use crate::log::{Block, Receipt, Transaction};
use alloy_primitives::B256;
use std::sync::Arc;

/// Supplies transactions, blocks and receipts to the scanner.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`: one resolver is shared by every
/// scan running on a parser, including scans moved onto worker threads.
pub trait ChainResolver: Send + Sync {
    /// Look up a transaction by hash.
    fn resolve_transaction(&self, hash: B256) -> Result<Transaction, ResolutionError>;

    /// Look up a block by number.
    fn resolve_block(&self, number: u64) -> Result<Block, ResolutionError>;

    /// Fetch the receipt (and therefore the logs) of a transaction.
    fn fetch_receipt(&self, transaction_hash: B256) -> Result<Receipt, ResolutionError>;
}

impl<T: ChainResolver + ?Sized> ChainResolver for Arc<T> {
    fn resolve_transaction(&self, hash: B256) -> Result<Transaction, ResolutionError> {
        (**self).resolve_transaction(hash)
    }

    fn resolve_block(&self, number: u64) -> Result<Block, ResolutionError> {
        (**self).resolve_block(number)
    }

    fn fetch_receipt(&self, transaction_hash: B256) -> Result<Receipt, ResolutionError> {
        (**self).fetch_receipt(transaction_hash)
    }
}

impl<T: ChainResolver + ?Sized> ChainResolver for &T {
    fn resolve_transaction(&self, hash: B256) -> Result<Transaction, ResolutionError> {
        (**self).resolve_transaction(hash)
    }

    fn resolve_block(&self, number: u64) -> Result<Block, ResolutionError> {
        (**self).resolve_block(number)
    }

    fn fetch_receipt(&self, transaction_hash: B256) -> Result<Receipt, ResolutionError> {
        (**self).fetch_receipt(transaction_hash)
    }
}
