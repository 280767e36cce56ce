//! In-memory `ChainResolver` implementation.
//!
//! Suitable for testing, replaying captured node data, and embedders that
//! already hold blocks and receipts. Thread-safe via `Arc<RwLock<Inner>>`.

use alloy_primitives::B256;
use chainlog_core::{Block, ChainResolver, Receipt, ResolutionError, Transaction};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

#[derive(Default)]
struct Inner {
    transactions: HashMap<B256, Transaction>,
    blocks: HashMap<u64, Block>,
    /// transaction hash → receipt
    receipts: HashMap<B256, Receipt>,
}

/// Thread-safe in-memory node data store.
#[derive(Clone, Default)]
pub struct MemoryResolver {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_transaction(&self, tx: Transaction) {
        self.write().transactions.insert(tx.hash, tx);
    }

    /// Store a block. Full transaction objects are indexed as well.
    pub fn insert_block(&self, block: Block) {
        let mut inner = self.write();
        if let chainlog_core::BlockTransactions::Full(txs) = &block.transactions {
            for tx in txs {
                inner.transactions.insert(tx.hash, tx.clone());
            }
        }
        inner.blocks.insert(block.number, block);
    }

    pub fn insert_receipt(&self, receipt: Receipt) {
        self.write().receipts.insert(receipt.transaction_hash, receipt);
    }

    /// Store a block together with the receipts of its transactions.
    pub fn insert_block_with_receipts(&self, block: Block, receipts: impl IntoIterator<Item = Receipt>) {
        self.insert_block(block);
        for receipt in receipts {
            self.insert_receipt(receipt);
        }
    }

    /// Number of stored (transactions, blocks, receipts).
    pub fn counts(&self) -> (usize, usize, usize) {
        let inner = self.read();
        (inner.transactions.len(), inner.blocks.len(), inner.receipts.len())
    }

    // Writers only insert whole entries; a poisoned lock is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl ChainResolver for MemoryResolver {
    fn resolve_transaction(&self, hash: B256) -> Result<Transaction, ResolutionError> {
        self.read()
            .transactions
            .get(&hash)
            .cloned()
            .ok_or_else(|| ResolutionError::not_found(format!("transaction {hash}")))
    }

    fn resolve_block(&self, number: u64) -> Result<Block, ResolutionError> {
        self.read()
            .blocks
            .get(&number)
            .cloned()
            .ok_or_else(|| ResolutionError::not_found(format!("block {number}")))
    }

    fn fetch_receipt(&self, transaction_hash: B256) -> Result<Receipt, ResolutionError> {
        self.read()
            .receipts
            .get(&transaction_hash)
            .cloned()
            .ok_or_else(|| ResolutionError::not_found(format!("receipt for {transaction_hash}")))
    }
}
