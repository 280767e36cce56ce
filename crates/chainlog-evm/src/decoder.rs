//! Event decoding: one matched log in, one `EventParserResult` out.
//!
//! Indexed arguments come from the topics, the rest from the ABI-encoded
//! data blob. Values are returned in declaration order regardless of where
//! they were stored.

use alloy_primitives::B256;
use chainlog_core::{
    AbiType, AbiValue, DecodeError, DecodedValue, EventParserResult, LogEntry, ParserError,
};

use crate::codec::{decode_static, decode_tuple};
use crate::descriptor::ParserConfig;
use crate::matcher;

/// Decode a log that matches `config`.
///
/// A log that fails the matcher is a caller defect and yields
/// `PreconditionFailed`; codec failures surface as `ParserError::Decode`.
pub fn decode(log: &LogEntry, config: &ParserConfig) -> Result<EventParserResult, ParserError> {
    matcher::check(log, config).map_err(|m| ParserError::PreconditionFailed {
        reason: m.to_string(),
    })?;
    Ok(decode_matched(log, config)?)
}

/// Decode a log the caller has already run through the matcher.
///
/// Skips the match check but never panics on a log that would fail it;
/// missing topics surface as `MalformedValue`.
pub fn decode_matched(
    log: &LogEntry,
    config: &ParserConfig,
) -> Result<EventParserResult, DecodeError> {
    let descriptor = config.descriptor();
    let first_topic = if descriptor.is_anonymous() { 0 } else { 1 };
    let mut topics = log.topics.iter().skip(first_topic);

    let data_types: Vec<AbiType> = descriptor.data_params().map(|p| p.ty.clone()).collect();
    let mut data_values = decode_tuple(&data_types, &log.data)?.into_iter();

    let mut values = Vec::with_capacity(descriptor.params().len());
    for param in descriptor.params() {
        let value = if param.indexed {
            let topic = topics.next().ok_or_else(|| DecodeError::malformed("missing topic"))?;
            decode_topic(&param.ty, topic)?
        } else {
            data_values
                .next()
                .ok_or_else(|| DecodeError::malformed("missing data value"))?
        };
        values.push(DecodedValue {
            name: param.name.clone(),
            ty: param.ty.clone(),
            indexed: param.indexed,
            value,
        });
    }

    Ok(EventParserResult {
        event: descriptor.name().to_string(),
        values,
        address: log.address,
        transaction_hash: log.transaction_hash,
        log_index: log.log_index,
        block_number: log.block_number,
    })
}

/// Decode one indexed argument from its topic.
///
/// Word types are stored verbatim. Everything else was hashed by the
/// emitting contract and comes back as `AbiValue::Hashed`.
pub fn decode_topic(ty: &AbiType, topic: &B256) -> Result<AbiValue, DecodeError> {
    if ty.is_word() {
        decode_static(ty, &topic.0)
    } else {
        Ok(AbiValue::Hashed(*topic))
    }
}
