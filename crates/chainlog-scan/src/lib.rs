//! # chainlog-scan
//!
//! Scan orchestration for ChainLog: finds every occurrence of one configured
//! event across receipts, transactions and blocks, resolving node data
//! through a [`ChainResolver`](chainlog_core::ChainResolver).
//!
//! ```no_run
//! use chainlog_evm::ParserConfig;
//! use chainlog_scan::{EventParser, MemoryResolver};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ParserConfig::parse(
//!     "event Transfer(address indexed from, address indexed to, uint256 value)",
//! )?;
//! let parser = EventParser::new(config, MemoryResolver::new());
//! let _transfers = parser.parse_block_number(19_000_000)?;
//! # Ok(())
//! # }
//! ```

pub mod memory;
pub mod parser;
pub mod rpc;
pub mod settings;

pub use memory::MemoryResolver;
pub use parser::{EventParser, ScanOutcome, SkippedLog};
pub use rpc::{JsonRpcResolver, RpcTransport, TransportError};
pub use settings::{LogSettings, ParserSettings, SettingsError};
