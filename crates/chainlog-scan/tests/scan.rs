//! End-to-end scanning against an in-memory node.

use alloy_primitives::{Address, Bytes, B256, U256};
use chainlog_core::{
    AbiType, AbiValue, Block, ChainResolver, DecodeError, LogEntry, ParserError, Receipt,
    ResolutionError, Transaction,
};
use chainlog_evm::{encode_topic, encode_tuple, ParserConfig};
use chainlog_scan::{
    rpc::{JsonRpcRequest, JsonRpcResponse},
    EventParser, JsonRpcResolver, MemoryResolver, ParserSettings, RpcTransport, TransportError,
};
use serde_json::Value;
use std::sync::Arc;

const TRANSFER: &str = "event Transfer(address indexed from, address indexed to, uint256 value)";

fn token() -> Address {
    Address::repeat_byte(0xa0)
}

fn transfer_config() -> ParserConfig {
    ParserConfig::parse(TRANSFER).unwrap().with_address(token())
}

fn transfer_log(from: u8, to: u8, value: u64) -> LogEntry {
    let config = transfer_config();
    let topic = |byte| {
        encode_topic(&AbiType::Address, &AbiValue::Address(Address::repeat_byte(byte))).unwrap()
    };
    let data = encode_tuple(&[AbiType::Uint(256)], &[AbiValue::Uint(U256::from(value))]).unwrap();
    LogEntry::new(
        token(),
        vec![config.descriptor().signature_hash(), topic(from), topic(to)],
        data,
    )
}

fn approval_log() -> LogEntry {
    let sig = ParserConfig::parse("Approval(address indexed, address indexed, uint256)")
        .unwrap()
        .descriptor()
        .signature_hash();
    LogEntry::new(token(), vec![sig, B256::ZERO, B256::ZERO], Bytes::from(vec![0u8; 32]))
}

fn tx_hash(n: u8) -> B256 {
    B256::repeat_byte(n)
}

/// Block 100: tx 1 has two transfers around an approval, tx 2 has a
/// transfer with a truncated data blob and a good one, tx 3 has no logs.
fn seeded_node() -> MemoryResolver {
    let node = MemoryResolver::new();
    let mut txs = Vec::new();
    let mut receipts = Vec::new();

    let logs = [
        (1, vec![transfer_log(1, 2, 10), approval_log(), transfer_log(2, 3, 20)]),
        (2, {
            let mut bad = transfer_log(4, 5, 30);
            bad.data = Bytes::from(vec![0u8; 31]);
            vec![bad, transfer_log(5, 6, 40)]
        }),
        (3, vec![]),
    ];
    for (n, logs) in logs {
        let mut tx = Transaction::new(tx_hash(n));
        tx.block_number = Some(100);
        let logs = logs
            .into_iter()
            .enumerate()
            .map(|(i, log)| log.with_transaction_hash(tx_hash(n)).with_log_index(i as u64))
            .collect();
        let mut receipt = Receipt::new(tx.hash, logs);
        receipt.block_number = Some(100);
        txs.push(tx);
        receipts.push(receipt);
    }
    node.insert_block_with_receipts(Block::new(100, txs), receipts);
    node.insert_block(Block::new(101, vec![]));
    node
}

fn values(events: &[chainlog_core::EventParserResult]) -> Vec<U256> {
    events
        .iter()
        .map(|e| e.value("value").and_then(AbiValue::as_uint).unwrap())
        .collect()
}

// ─── Blocks ───────────────────────────────────────────────────────────────────

#[test]
fn block_results_follow_transaction_and_log_order() {
    let parser = EventParser::new(transfer_config(), seeded_node());
    let events = parser.parse_block_number(100).unwrap();

    // the truncated transfer in tx 2 is dropped, the rest survive
    assert_eq!(values(&events), [10u64, 20, 40].map(U256::from));
    assert_eq!(events[2].transaction_hash, Some(tx_hash(2)));
    assert_eq!(events[2].log_index, Some(1));
    assert!(events.iter().all(|e| e.block_number == Some(100)));
}

#[test]
fn empty_block_yields_nothing() {
    let parser = EventParser::new(transfer_config(), seeded_node());
    assert!(parser.parse_block_number(101).unwrap().is_empty());
}

#[test]
fn scanning_twice_is_identical() {
    let parser = EventParser::new(transfer_config(), seeded_node());
    assert_eq!(
        parser.parse_block_number(100).unwrap(),
        parser.parse_block_number(100).unwrap()
    );
}

#[test]
fn other_contract_is_filtered_out() {
    let config = ParserConfig::parse(TRANSFER)
        .unwrap()
        .with_address(Address::repeat_byte(0x01));
    let parser = EventParser::new(config, seeded_node());
    assert!(parser.parse_block_number(100).unwrap().is_empty());
}

#[test]
fn unknown_block_is_a_resolution_error() {
    let parser = EventParser::new(transfer_config(), seeded_node());
    assert!(matches!(
        parser.parse_block_number(999),
        Err(ParserError::Resolution(ResolutionError::NotFound { .. }))
    ));
}

#[test]
fn missing_receipt_fails_the_whole_block() {
    let node = MemoryResolver::new();
    node.insert_block(Block::new(7, vec![Transaction::new(tx_hash(9))]));
    let parser = EventParser::new(transfer_config(), node);
    assert!(matches!(
        parser.parse_block_number(7),
        Err(ParserError::Resolution(_))
    ));
}

// ─── Transactions and receipts ────────────────────────────────────────────────

#[test]
fn transaction_by_hash() {
    let parser = EventParser::new(transfer_config(), seeded_node());
    let events = parser.parse_transaction_hash(tx_hash(1)).unwrap();
    assert_eq!(values(&events), [10u64, 20].map(U256::from));
    assert_eq!(
        events[0].value("to").and_then(AbiValue::as_address),
        Some(Address::repeat_byte(2))
    );
}

#[test]
fn transaction_without_logs() {
    let parser = EventParser::new(transfer_config(), seeded_node());
    let mut tx = Transaction::new(tx_hash(3));
    tx.block_number = Some(100);
    assert!(parser.parse_transaction(&tx).unwrap().is_empty());
}

#[test]
fn scan_receipt_reports_skipped_logs() {
    let node = seeded_node();
    let receipt = node.fetch_receipt(tx_hash(2)).unwrap();
    let parser = EventParser::new(transfer_config(), node);

    let outcome = parser.scan_receipt(&receipt);
    assert_eq!(outcome.scanned, 2);
    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].log_index, Some(0));
    assert!(matches!(
        outcome.skipped[0].error,
        DecodeError::TruncatedData { needed: 32, available: 31 }
    ));
}

// ─── Anonymous events and malformed data ──────────────────────────────────────

const NOTE: &str = "event Note(address indexed author, string memo) anonymous";

fn note_log(data: Vec<u8>) -> LogEntry {
    let author =
        encode_topic(&AbiType::Address, &AbiValue::Address(Address::repeat_byte(0x0b))).unwrap();
    LogEntry::new(token(), vec![author], Bytes::from(data))
}

fn memo(text: &str) -> Vec<u8> {
    encode_tuple(&[AbiType::String], &[AbiValue::from(text)]).unwrap()
}

fn word(n: u64) -> Vec<u8> {
    B256::from(U256::from(n)).to_vec()
}

#[test]
fn anonymous_event_skips_malformed_logs_and_continues() {
    let offset_past_end = word(4096);
    let mut bad_utf8 = [word(32), word(2)].concat();
    bad_utf8.extend([0xc3, 0x28]);
    bad_utf8.resize(96, 0);

    let hash = tx_hash(0x20);
    let logs: Vec<LogEntry> = [
        note_log(memo("first")),
        note_log(offset_past_end),
        transfer_log(1, 2, 5),
        note_log(bad_utf8),
        note_log(memo("last")),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, log)| log.with_transaction_hash(hash).with_log_index(i as u64))
    .collect();
    let mut tx = Transaction::new(hash);
    tx.block_number = Some(200);
    let receipt = Receipt::new(hash, logs);
    let node = MemoryResolver::new();
    node.insert_block_with_receipts(Block::new(200, vec![tx]), vec![receipt.clone()]);

    let notes = EventParser::new(ParserConfig::parse(NOTE).unwrap(), node.clone());
    let memos: Vec<String> = notes
        .parse_block_number(200)
        .unwrap()
        .iter()
        .map(|e| e.value("memo").and_then(AbiValue::as_str).unwrap().to_string())
        .collect();
    assert_eq!(memos, ["first", "last"]);

    let outcome = notes.scan_receipt(&receipt);
    assert_eq!(outcome.scanned, 5);
    let skipped: Vec<_> = outcome.skipped.iter().map(|s| (s.log_index, &s.error)).collect();
    assert!(matches!(
        skipped.as_slice(),
        [
            (Some(1), DecodeError::OffsetOutOfRange { offset: 4096, len: 32 }),
            (Some(3), DecodeError::MalformedValue { .. }),
        ]
    ));

    let transfers = EventParser::new(transfer_config(), node);
    assert_eq!(values(&transfers.parse_block_number(200).unwrap()), [U256::from(5u64)]);
}

// ─── Async ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn async_matches_blocking() {
    let parser = EventParser::new(transfer_config(), seeded_node());

    let blocking = parser.parse_block_number(100).unwrap();
    let async_result = parser.parse_block_number_async(100).await.unwrap();
    assert_eq!(blocking, async_result);

    let block = seeded_node().resolve_block(100).unwrap();
    assert_eq!(parser.parse_block_async(&block).await.unwrap(), blocking);

    assert_eq!(
        parser.parse_transaction_hash_async(tx_hash(1)).await.unwrap(),
        parser.parse_transaction_hash(tx_hash(1)).unwrap()
    );
    let tx = seeded_node().resolve_transaction(tx_hash(2)).unwrap();
    assert_eq!(
        parser.parse_transaction_async(&tx).await.unwrap(),
        parser.parse_transaction(&tx).unwrap()
    );
}

#[tokio::test]
async fn async_propagates_resolution_errors() {
    let parser = EventParser::new(transfer_config(), MemoryResolver::new());
    assert!(matches!(
        parser.parse_transaction_hash_async(tx_hash(1)).await,
        Err(ParserError::Resolution(ResolutionError::NotFound { .. }))
    ));
}

#[tokio::test]
async fn concurrent_scans_share_one_parser() {
    let parser = EventParser::new(transfer_config(), seeded_node());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let parser = parser.clone();
            tokio::spawn(async move { parser.parse_block_number_async(100).await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().len(), 3);
    }
}

// ─── JSON-RPC resolver ────────────────────────────────────────────────────────

/// Serves a node's data in JSON-RPC form.
struct NodeTransport(MemoryResolver);

impl RpcTransport for NodeTransport {
    fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let hash = |v: &Value| -> Result<B256, TransportError> {
            v.as_str()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| TransportError::Io("bad hash param".into()))
        };
        let result = match req.method.as_str() {
            "eth_getBlockByNumber" => {
                let number = chainlog_core::log::parse_quantity(req.params[0].as_str().unwrap())
                    .map_err(TransportError::Io)?;
                self.0.resolve_block(number).ok().map(serde_json::to_value).transpose()?
            }
            "eth_getTransactionByHash" => self
                .0
                .resolve_transaction(hash(&req.params[0])?)
                .ok()
                .map(serde_json::to_value)
                .transpose()?,
            "eth_getTransactionReceipt" => self
                .0
                .fetch_receipt(hash(&req.params[0])?)
                .ok()
                .map(serde_json::to_value)
                .transpose()?,
            other => return Err(TransportError::Io(format!("unsupported method {other}"))),
        };
        Ok(JsonRpcResponse {
            id: req.id.into(),
            result,
            error: None,
        })
    }
}

#[test]
fn rpc_resolver_round_trips_node_json() {
    let over_rpc = EventParser::new(transfer_config(), JsonRpcResolver::new(NodeTransport(seeded_node())));
    let direct = EventParser::new(transfer_config(), seeded_node());
    assert_eq!(
        over_rpc.parse_block_number(100).unwrap(),
        direct.parse_block_number(100).unwrap()
    );
    assert!(matches!(
        over_rpc.parse_block_number(5),
        Err(ParserError::Resolution(ResolutionError::NotFound { .. }))
    ));
}

#[test]
fn shared_resolver_across_parsers() {
    let node: Arc<dyn ChainResolver> = Arc::new(seeded_node());
    let transfers = EventParser::from_shared(Arc::new(transfer_config()), node.clone());
    let approvals = EventParser::from_shared(
        Arc::new(ParserConfig::parse("Approval(address indexed owner, address indexed spender, uint256 value)").unwrap()),
        node,
    );
    assert_eq!(transfers.parse_block_number(100).unwrap().len(), 3);
    assert_eq!(approvals.parse_block_number(100).unwrap().len(), 1);
}

// ─── Settings ─────────────────────────────────────────────────────────────────

#[test]
fn parser_from_yaml_settings() {
    let yaml = format!(
        "event: \"{TRANSFER}\"\naddress: \"{}\"\nchain_id: 8453\n",
        token()
    );
    let settings = ParserSettings::from_yaml_str(&yaml).unwrap();
    let parser = EventParser::new(settings.parser_config().unwrap(), seeded_node());
    assert_eq!(parser.config().chain(), Some(chainlog_core::ChainId::BASE));
    assert_eq!(parser.parse_block_number(100).unwrap().len(), 3);
}
