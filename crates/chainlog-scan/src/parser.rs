//! `EventParser`: walks receipts, transactions and blocks and collects
//! every occurrence of one configured event.
//!
//! All work happens in one synchronous code path. The `*_async` entry points
//! move that same computation onto the tokio blocking pool, so both surfaces
//! return identical results for identical node data.

use alloy_primitives::B256;
use chainlog_core::{
    Block, ChainResolver, DecodeError, EventParserResult, LogEntry, ParserError, Receipt,
    Transaction,
};
use chainlog_evm::{decode_matched, matches, ParserConfig};
use std::sync::Arc;
use tracing::{debug, warn};

/// A log that matched the event but could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLog {
    /// Index of the log within the scanned slice
    pub position: usize,
    pub transaction_hash: Option<B256>,
    pub log_index: Option<u64>,
    pub error: DecodeError,
}

/// Result of scanning a list of logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Decoded events in log order
    pub events: Vec<EventParserResult>,
    /// Matching logs dropped because they failed to decode
    pub skipped: Vec<SkippedLog>,
    /// Total logs inspected
    pub scanned: usize,
}

/// Scans node data for one event.
///
/// Cheap to clone: the configuration and resolver are shared.
#[derive(Clone)]
pub struct EventParser {
    config: Arc<ParserConfig>,
    resolver: Arc<dyn ChainResolver>,
}

impl EventParser {
    pub fn new(config: ParserConfig, resolver: impl ChainResolver + 'static) -> Self {
        Self::from_shared(Arc::new(config), Arc::new(resolver))
    }

    /// Build from an already shared config and resolver.
    pub fn from_shared(config: Arc<ParserConfig>, resolver: Arc<dyn ChainResolver>) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    // ─── Pure scanning ────────────────────────────────────────────────────────

    /// Match and decode `logs` in order. Undecodable matches are skipped.
    pub fn scan_logs(&self, logs: &[LogEntry]) -> ScanOutcome {
        let mut outcome = ScanOutcome {
            scanned: logs.len(),
            ..ScanOutcome::default()
        };

        for (position, log) in logs.iter().enumerate() {
            if !matches(log, &self.config) {
                continue;
            }
            match decode_matched(log, &self.config) {
                Ok(event) => outcome.events.push(event),
                Err(error) => {
                    warn!(
                        "EventParser: skipping {} log {} (tx {:?}): {}",
                        self.config.descriptor().name(),
                        position,
                        log.transaction_hash,
                        error
                    );
                    outcome.skipped.push(SkippedLog {
                        position,
                        transaction_hash: log.transaction_hash,
                        log_index: log.log_index,
                        error,
                    });
                }
            }
        }
        outcome
    }

    /// Scan a receipt's logs. Results without a transaction hash or block
    /// number inherit the receipt's.
    pub fn scan_receipt(&self, receipt: &Receipt) -> ScanOutcome {
        let mut outcome = self.scan_logs(&receipt.logs);
        for event in &mut outcome.events {
            event.transaction_hash.get_or_insert(receipt.transaction_hash);
            if event.block_number.is_none() {
                event.block_number = receipt.block_number;
            }
        }
        outcome
    }

    pub fn parse_receipt(&self, receipt: &Receipt) -> Vec<EventParserResult> {
        self.scan_receipt(receipt).events
    }

    // ─── Blocking entry points ────────────────────────────────────────────────

    /// Fetch the transaction's receipt and decode its matching logs.
    pub fn parse_transaction(&self, tx: &Transaction) -> Result<Vec<EventParserResult>, ParserError> {
        let receipt = self.resolver.fetch_receipt(tx.hash)?;
        let mut events = self.parse_receipt(&receipt);
        if let Some(number) = tx.block_number {
            for event in &mut events {
                event.block_number.get_or_insert(number);
            }
        }
        debug!(
            "EventParser: tx {}: {} {} events",
            tx.hash,
            events.len(),
            self.config.descriptor().name()
        );
        Ok(events)
    }

    pub fn parse_transaction_hash(&self, hash: B256) -> Result<Vec<EventParserResult>, ParserError> {
        let tx = self.resolver.resolve_transaction(hash)?;
        self.parse_transaction(&tx)
    }

    /// Decode matching logs across every transaction of `block`, in
    /// transaction order. Any missing receipt fails the whole call.
    pub fn parse_block(&self, block: &Block) -> Result<Vec<EventParserResult>, ParserError> {
        let mut events = Vec::new();
        let mut skipped = 0usize;
        for hash in block.transactions.hashes() {
            let receipt = self.resolver.fetch_receipt(hash)?;
            let mut outcome = self.scan_receipt(&receipt);
            for event in &mut outcome.events {
                event.block_number.get_or_insert(block.number);
            }
            skipped += outcome.skipped.len();
            events.extend(outcome.events);
        }
        debug!(
            "EventParser: block {}: {} transactions, {} events, {} skipped",
            block.number,
            block.transactions.len(),
            events.len(),
            skipped
        );
        Ok(events)
    }

    pub fn parse_block_number(&self, number: u64) -> Result<Vec<EventParserResult>, ParserError> {
        let block = self.resolver.resolve_block(number)?;
        self.parse_block(&block)
    }

    // ─── Async entry points ───────────────────────────────────────────────────

    pub async fn parse_transaction_async(
        &self,
        tx: &Transaction,
    ) -> Result<Vec<EventParserResult>, ParserError> {
        let tx = tx.clone();
        self.run_blocking(move |parser| parser.parse_transaction(&tx)).await
    }

    pub async fn parse_transaction_hash_async(
        &self,
        hash: B256,
    ) -> Result<Vec<EventParserResult>, ParserError> {
        self.run_blocking(move |parser| parser.parse_transaction_hash(hash)).await
    }

    pub async fn parse_block_async(&self, block: &Block) -> Result<Vec<EventParserResult>, ParserError> {
        let block = block.clone();
        self.run_blocking(move |parser| parser.parse_block(&block)).await
    }

    pub async fn parse_block_number_async(
        &self,
        number: u64,
    ) -> Result<Vec<EventParserResult>, ParserError> {
        self.run_blocking(move |parser| parser.parse_block_number(number)).await
    }

    async fn run_blocking<R, F>(&self, f: F) -> Result<R, ParserError>
    where
        F: FnOnce(&EventParser) -> Result<R, ParserError> + Send + 'static,
        R: Send + 'static,
    {
        let parser = self.clone();
        tokio::task::spawn_blocking(move || f(&parser))
            .await
            .map_err(|e| ParserError::Worker(e.to_string()))?
    }
}

impl std::fmt::Debug for EventParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventParser")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
