//! Golden fixture integration tests.
//!
//! Each test loads an EVM log from `fixtures/evm/`, builds a parser config
//! from the event declaration recorded in the fixture, and asserts the
//! decoded values match the fixture's `expectedFields`.

use alloy_primitives::{Address, Bytes, B256, I256, U256};
use chainlog_core::{AbiValue, ChainId, LogEntry};
use chainlog_evm::{decode, matches, ParserConfig};

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Parse hex bytes from a `"0x..."` string.
fn hex_to_bytes(s: &str) -> Vec<u8> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).unwrap_or_else(|e| panic!("bad hex '{s}': {e}"))
}

fn chain_from_slug(slug: &str) -> ChainId {
    match slug {
        "ethereum" => ChainId::MAINNET,
        "base" => ChainId::BASE,
        "arbitrum" => ChainId::ARBITRUM_ONE,
        "polygon" => ChainId::POLYGON,
        "optimism" => ChainId::OPTIMISM,
        other => panic!("unknown chain slug '{other}'"),
    }
}

/// The fixtures live two levels above the crate root.
fn fixture_path(name: &str) -> std::path::PathBuf {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../../fixtures/evm");
    p.push(name);
    p
}

fn load_fixture(name: &str) -> serde_json::Value {
    let json = std::fs::read_to_string(fixture_path(name)).expect("fixture not found");
    serde_json::from_str(&json).expect("fixture is not valid JSON")
}

fn log_from_fixture(f: &serde_json::Value) -> LogEntry {
    let topics = f["topics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap().parse::<B256>().unwrap())
        .collect();
    LogEntry::new(
        f["contractAddress"].as_str().unwrap().parse().unwrap(),
        topics,
        Bytes::from(hex_to_bytes(f["data"].as_str().unwrap())),
    )
    .with_transaction_hash(f["txHash"].as_str().unwrap().parse().unwrap())
    .with_block_number(f["blockNumber"].as_u64().unwrap())
    .with_log_index(f["logIndex"].as_u64().unwrap())
}

fn config_from_fixture(f: &serde_json::Value) -> ParserConfig {
    ParserConfig::parse(f["event"].as_str().unwrap())
        .expect("fixture event declaration must parse")
        .with_address(f["contractAddress"].as_str().unwrap().parse().unwrap())
        .with_chain(chain_from_slug(f["chain"].as_str().unwrap()))
}

fn expected_address(expected: &serde_json::Value, key: &str) -> Address {
    expected[key].as_str().unwrap().parse().unwrap()
}

fn expected_uint(expected: &serde_json::Value, key: &str) -> U256 {
    expected[key].as_str().unwrap().parse().unwrap()
}

// ─── ERC-20 Transfer ──────────────────────────────────────────────────────────

#[test]
fn erc20_transfer_golden() {
    let fixture = load_fixture("erc20-transfer.json");
    let config = config_from_fixture(&fixture);
    let log = log_from_fixture(&fixture);

    assert!(matches(&log, &config));
    let event = decode(&log, &config).expect("decode failed");
    assert_eq!(event.event, "Transfer");

    let expected = &fixture["expectedFields"];
    assert_eq!(
        event.value("from").and_then(AbiValue::as_address),
        Some(expected_address(expected, "from"))
    );
    assert_eq!(
        event.value("to").and_then(AbiValue::as_address),
        Some(expected_address(expected, "to"))
    );
    // 1000 USDC, 6 decimals
    assert_eq!(
        event.value("value").and_then(AbiValue::as_uint),
        Some(expected_uint(expected, "value"))
    );

    assert_eq!(event.block_number, Some(19_000_000));
    assert_eq!(event.log_index, Some(42));
    assert_eq!(event.address, log.address);
}

#[test]
fn erc20_transfer_from_other_contract_is_ignored() {
    let fixture = load_fixture("erc20-transfer.json");
    let config = config_from_fixture(&fixture).with_address(Address::repeat_byte(0x01));
    assert!(!matches(&log_from_fixture(&fixture), &config));
}

// ─── Uniswap V3 Swap ──────────────────────────────────────────────────────────

#[test]
fn uniswap_v3_swap_golden() {
    let fixture = load_fixture("uniswap-v3-swap.json");
    let config = config_from_fixture(&fixture);
    let log = log_from_fixture(&fixture);

    assert_eq!(
        config.descriptor().signature(),
        "Swap(address,address,int256,int256,uint160,uint128,int24)"
    );
    let event = decode(&log, &config).expect("decode failed");
    let expected = &fixture["expectedFields"];

    assert_eq!(
        event.value("sender").and_then(AbiValue::as_address),
        Some(expected_address(expected, "sender"))
    );

    // amount0 is negative: tokens flowed out of the pool
    for key in ["amount0", "amount1", "tick"] {
        let want = I256::from_dec_str(expected[key].as_str().unwrap()).unwrap();
        assert_eq!(event.value(key).and_then(AbiValue::as_int), Some(want), "{key}");
    }
    assert!(event.value("amount0").and_then(AbiValue::as_int).unwrap().is_negative());

    for key in ["sqrtPriceX96", "liquidity"] {
        assert_eq!(
            event.value(key).and_then(AbiValue::as_uint),
            Some(expected_uint(expected, key)),
            "{key}"
        );
    }

    let names: Vec<_> = event.values.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(
        names,
        ["sender", "recipient", "amount0", "amount1", "sqrtPriceX96", "liquidity", "tick"]
    );
}

// ─── Custom event: hashed topic, string, array, static tuple ─────────────────

#[test]
fn custom_registered_golden() {
    let fixture = load_fixture("custom-registered.json");
    let config = config_from_fixture(&fixture);
    let log = log_from_fixture(&fixture);
    assert_eq!(config.chain(), Some(ChainId::BASE));

    let event = decode(&log, &config).expect("decode failed");
    let expected = &fixture["expectedFields"];

    assert_eq!(
        event.value("id").and_then(AbiValue::as_uint),
        Some(expected_uint(expected, "id"))
    );

    let label = event.get("label").unwrap();
    assert!(label.indexed && label.is_hashed());
    assert_eq!(
        label.value,
        AbiValue::Hashed(expected["label"].as_str().unwrap().parse().unwrap())
    );

    assert_eq!(
        event.value("name").and_then(AbiValue::as_str),
        expected["name"].as_str()
    );

    let scores: Vec<U256> = event
        .value("scores")
        .and_then(AbiValue::as_array)
        .unwrap()
        .iter()
        .map(|v| v.as_uint().unwrap())
        .collect();
    let want: Vec<U256> = expected["scores"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap().parse().unwrap())
        .collect();
    assert_eq!(scores, want);

    let meta = event.value("meta").and_then(AbiValue::as_tuple).unwrap();
    assert_eq!(meta[0].as_address(), Some(expected_address(expected, "owner")));
    assert_eq!(
        meta[1].as_bytes(),
        Some(hex_to_bytes(expected["salt"].as_str().unwrap()).as_slice())
    );
}

#[test]
fn custom_registered_with_truncated_data_fails() {
    let fixture = load_fixture("custom-registered.json");
    let config = config_from_fixture(&fixture);
    let mut log = log_from_fixture(&fixture);
    log.data = Bytes::from(log.data[..log.data.len() - 32].to_vec());

    assert!(matches(&log, &config));
    assert!(matches!(
        decode(&log, &config),
        Err(chainlog_core::ParserError::Decode(
            chainlog_core::DecodeError::TruncatedData { .. }
        ))
    ));
}
