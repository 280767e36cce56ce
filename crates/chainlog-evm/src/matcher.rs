//! Log matching: decide whether a raw log is an occurrence of the configured event.
//!
//! Only the emitting address and the topics are inspected. The data blob is
//! left to the decoder.

use chainlog_core::LogEntry;
use thiserror::Error;

use crate::descriptor::ParserConfig;

/// Why a log was not a candidate for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Mismatch {
    /// The parser is bound to another contract.
    #[error("log emitted by a different contract")]
    Address,
    /// The log has the wrong number of topics for the descriptor.
    #[error("expected {expected} topics, log has {actual}")]
    TopicCount { expected: usize, actual: usize },
    /// topics[0] is not the event's signature hash.
    #[error("topic 0 is not the event signature hash")]
    Signature,
}

/// Check a log against `config`, reporting the first rule it breaks.
pub fn check(log: &LogEntry, config: &ParserConfig) -> Result<(), Mismatch> {
    if let Some(address) = config.address() {
        if log.address != address {
            return Err(Mismatch::Address);
        }
    }

    let descriptor = config.descriptor();
    let expected = descriptor.expected_topic_count();
    if log.topics.len() != expected {
        return Err(Mismatch::TopicCount {
            expected,
            actual: log.topics.len(),
        });
    }

    if !descriptor.is_anonymous() && log.topic0() != Some(&descriptor.signature_hash()) {
        return Err(Mismatch::Signature);
    }
    Ok(())
}

/// `true` when the log should be handed to the decoder.
pub fn matches(log: &LogEntry, config: &ParserConfig) -> bool {
    check(log, config).is_ok()
}
