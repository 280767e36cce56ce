//! ABI value decoding.
//!
//! Implements the head-tail layout of the Solidity ABI:
//! - every value occupies a 32-byte aligned head slot (or, for static tuples
//!   and static fixed arrays, its inline size)
//! - dynamic values (`bytes`, `string`, `T[]`, and compounds containing them)
//!   store an offset in their head slot, relative to the start of the
//!   enclosing tuple region, pointing into the tail
//!
//! All reads are bounds-checked; no input can make the decoder panic or
//! allocate more than the input could describe. Each decoded value is charged
//! against a budget of one per word of input, so heads that alias the same
//! tail cannot multiply the output.

use alloy_primitives::{Address, Bytes, I256, U256};
use chainlog_core::{types::WORD_SIZE, AbiType, AbiValue, DecodeError};

/// Decode a single-word static value.
///
/// Total over any 32-byte input for word types; any other type is
/// `MalformedValue`.
pub fn decode_static(ty: &AbiType, word: &[u8; WORD_SIZE]) -> Result<AbiValue, DecodeError> {
    match ty {
        AbiType::Uint(_) if ty.is_valid() => Ok(AbiValue::Uint(U256::from_be_bytes(*word))),
        AbiType::Int(_) if ty.is_valid() => {
            Ok(AbiValue::Int(I256::from_raw(U256::from_be_bytes(*word))))
        }
        AbiType::Bool => Ok(AbiValue::Bool(word.iter().any(|b| *b != 0))),
        // high 12 bytes are ignored, even when dirty
        AbiType::Address => Ok(AbiValue::Address(Address::from_slice(&word[12..]))),
        AbiType::FixedBytes(n) if (1..=WORD_SIZE).contains(n) => {
            Ok(AbiValue::FixedBytes(Bytes::copy_from_slice(&word[..*n])))
        }
        other => Err(DecodeError::malformed(format!(
            "{other} is not a single-word static type"
        ))),
    }
}

/// Decode the value of `ty` located at `offset` in `blob`.
///
/// Returns the value and the number of bytes it spans from `offset`.
pub fn decode_dynamic(
    ty: &AbiType,
    blob: &[u8],
    offset: usize,
) -> Result<(AbiValue, usize), DecodeError> {
    dynamic_at(ty, blob, offset, &mut Budget::new(blob, 1))
}

/// Decode a tuple region: the data blob of a log, or a nested tuple.
pub fn decode_tuple(types: &[AbiType], blob: &[u8]) -> Result<Vec<AbiValue>, DecodeError> {
    let mut budget = Budget::new(blob, types.len());
    decode_sequence(blob, types.len(), |i| &types[i], &mut budget).map(|(values, _)| values)
}

/// Values left to decode from one blob.
///
/// A well-formed encoding spends a distinct word on every leaf, every
/// `bytes`/`string` length, every array count and every dynamic head, so a
/// blob of `n` words never needs more than `n` charges.
struct Budget {
    remaining: usize,
    blob_len: usize,
}

impl Budget {
    /// `slack` covers top-level values that occupy no words, such as `()`.
    fn new(blob: &[u8], slack: usize) -> Self {
        Self {
            remaining: (blob.len() / WORD_SIZE).saturating_add(slack),
            blob_len: blob.len(),
        }
    }

    fn charge(&mut self) -> Result<(), DecodeError> {
        self.remaining = self
            .remaining
            .checked_sub(1)
            .ok_or(DecodeError::TruncatedData {
                needed: self.blob_len.saturating_add(WORD_SIZE),
                available: self.blob_len,
            })?;
        Ok(())
    }
}

fn dynamic_at(
    ty: &AbiType,
    blob: &[u8],
    offset: usize,
    budget: &mut Budget,
) -> Result<(AbiValue, usize), DecodeError> {
    if offset.checked_add(WORD_SIZE).map_or(true, |end| end > blob.len()) {
        return Err(DecodeError::OffsetOutOfRange {
            offset,
            len: blob.len(),
        });
    }
    if ty.is_dynamic() {
        budget.charge()?;
    }

    match ty {
        AbiType::Bytes => {
            let (payload, consumed) = read_payload(blob, offset)?;
            Ok((AbiValue::Bytes(Bytes::copy_from_slice(payload)), consumed))
        }
        AbiType::String => {
            let (payload, consumed) = read_payload(blob, offset)?;
            let s = std::str::from_utf8(payload)
                .map_err(|e| DecodeError::malformed(format!("invalid UTF-8 in string: {e}")))?;
            Ok((AbiValue::String(s.to_string()), consumed))
        }
        AbiType::Array(elem) => {
            let count = read_usize(word_at(blob, offset)?).ok_or(DecodeError::TruncatedData {
                needed: usize::MAX,
                available: blob.len(),
            })?;
            let region = &blob[offset + WORD_SIZE..];

            // Every element needs at least one slot; refuse counts the data cannot hold.
            let min_size = elem.head_size().max(WORD_SIZE);
            let needed = count.checked_mul(min_size).unwrap_or(usize::MAX);
            if needed > region.len() {
                return Err(DecodeError::TruncatedData {
                    needed: needed.saturating_add(offset + WORD_SIZE),
                    available: blob.len(),
                });
            }

            let (values, used) = decode_sequence(region, count, |_| elem.as_ref(), budget)?;
            Ok((AbiValue::Array(values), WORD_SIZE + used))
        }
        AbiType::FixedArray(elem, len) if ty.is_dynamic() => {
            let (values, used) =
                decode_sequence(&blob[offset..], *len, |_| elem.as_ref(), budget)?;
            Ok((AbiValue::Array(values), used))
        }
        AbiType::Tuple(members) if ty.is_dynamic() => {
            let (values, used) =
                decode_sequence(&blob[offset..], members.len(), |i| &members[i], budget)?;
            Ok((AbiValue::Tuple(values), used))
        }
        _ => Ok((decode_inline(ty, &blob[offset..], budget)?, ty.head_size())),
    }
}

/// Walk `count` heads in `region`, following offsets for dynamic entries.
///
/// Returns the values and the furthest byte read, relative to `region`.
fn decode_sequence<'t>(
    region: &[u8],
    count: usize,
    type_of: impl Fn(usize) -> &'t AbiType,
    budget: &mut Budget,
) -> Result<(Vec<AbiValue>, usize), DecodeError> {
    let mut values = Vec::with_capacity(count.min(region.len() / WORD_SIZE + 1));
    let mut head = 0usize;
    let mut end = 0usize;

    for i in 0..count {
        let ty = type_of(i);
        let head_end = head.saturating_add(ty.head_size());
        if head_end > region.len() {
            return Err(DecodeError::TruncatedData {
                needed: head_end,
                available: region.len(),
            });
        }

        if ty.is_dynamic() {
            let offset = read_usize(word_at(region, head)?).ok_or(DecodeError::OffsetOutOfRange {
                offset: usize::MAX,
                len: region.len(),
            })?;
            let (value, used) = dynamic_at(ty, region, offset, budget)?;
            end = end.max(offset.saturating_add(used));
            values.push(value);
        } else {
            values.push(decode_inline(ty, &region[head..head_end], budget)?);
        }
        head = head_end;
    }

    Ok((values, end.max(head)))
}

/// Decode a static value laid out in place.
///
/// Inline compounds are free when their members occupy words of their own.
fn decode_inline(ty: &AbiType, data: &[u8], budget: &mut Budget) -> Result<AbiValue, DecodeError> {
    match ty {
        AbiType::FixedArray(elem, len) => {
            if ty.head_size() == 0 {
                budget.charge()?;
            }
            decode_sequence(data, *len, |_| elem.as_ref(), budget).map(|(v, _)| AbiValue::Array(v))
        }
        AbiType::Tuple(members) => {
            if ty.head_size() == 0 {
                budget.charge()?;
            }
            decode_sequence(data, members.len(), |i| &members[i], budget)
                .map(|(v, _)| AbiValue::Tuple(v))
        }
        _ => {
            budget.charge()?;
            decode_static(ty, word_at(data, 0)?)
        }
    }
}

/// Length-prefixed payload of a `bytes` or `string` at `offset`.
fn read_payload(blob: &[u8], offset: usize) -> Result<(&[u8], usize), DecodeError> {
    let truncated = |needed| DecodeError::TruncatedData {
        needed,
        available: blob.len(),
    };
    let len = read_usize(word_at(blob, offset)?).ok_or(truncated(usize::MAX))?;
    let start = offset + WORD_SIZE;
    let padded = len
        .checked_add(WORD_SIZE - 1)
        .map(|n| n / WORD_SIZE * WORD_SIZE)
        .ok_or(truncated(usize::MAX))?;
    let needed = start.checked_add(padded).ok_or(truncated(usize::MAX))?;
    if needed > blob.len() {
        return Err(truncated(needed));
    }
    Ok((&blob[start..start + len], WORD_SIZE + padded))
}

fn word_at(data: &[u8], at: usize) -> Result<&[u8; WORD_SIZE], DecodeError> {
    at.checked_add(WORD_SIZE)
        .and_then(|end| data.get(at..end))
        .and_then(|slice| slice.try_into().ok())
        .ok_or(DecodeError::TruncatedData {
            needed: at.saturating_add(WORD_SIZE),
            available: data.len(),
        })
}

/// A length or offset word; `None` if it does not fit a `usize`.
fn read_usize(word: &[u8; WORD_SIZE]) -> Option<usize> {
    if word[..24].iter().any(|b| *b != 0) {
        return None;
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[24..]);
    usize::try_from(u64::from_be_bytes(low)).ok()
}
