//! ABI encoding, the inverse of `codec`.
//!
//! Values are converted to alloy's `DynSolValue` and laid out by
//! `alloy-dyn-abi`. Used to build logs for tests and benchmarks and to compute
//! expected topics for indexed arguments.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{B256, I256};
use chainlog_core::{types::WORD_SIZE, AbiType, AbiValue, EncodeError};

use crate::fingerprint::keccak256;

/// Encode a single-word static value into its 32-byte slot.
pub fn encode_word(ty: &AbiType, value: &AbiValue) -> Result<[u8; WORD_SIZE], EncodeError> {
    if !ty.is_word() {
        return Err(mismatch(ty, value));
    }
    to_dyn_value(ty, value)?
        .as_word()
        .map(|word| word.0)
        .ok_or_else(|| mismatch(ty, value))
}

/// Encode `values` as a tuple of `types`, e.g. the data blob of a log.
pub fn encode_tuple(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
    let tuple = AbiType::Tuple(types.to_vec());
    let encoded = to_dyn_value(&tuple, &AbiValue::Tuple(values.to_vec()))?;
    Ok(encoded.abi_encode_params())
}

/// The topic an indexed argument of `ty` is emitted as.
///
/// Word types are stored as-is; `string` and `bytes` as the keccak-256 of
/// their payload.
pub fn encode_topic(ty: &AbiType, value: &AbiValue) -> Result<B256, EncodeError> {
    match ty {
        AbiType::String | AbiType::Bytes => {
            Ok(keccak256(&to_dyn_value(ty, value)?.abi_encode_packed()))
        }
        _ if ty.is_word() => encode_word(ty, value).map(B256::from),
        _ => Err(EncodeError::UnsupportedTopic { ty: ty.to_string() }),
    }
}

/// Convert a value to alloy's dynamic representation of `ty`.
///
/// Integers must fit their declared width and fixed-size sequences their
/// declared length.
pub fn to_dyn_value(ty: &AbiType, value: &AbiValue) -> Result<DynSolValue, EncodeError> {
    if !ty.is_valid() {
        return Err(mismatch(ty, value));
    }
    match (ty, value) {
        (AbiType::Uint(bits), AbiValue::Uint(v)) if v.bit_len() <= *bits => {
            Ok(DynSolValue::Uint(*v, *bits))
        }
        (AbiType::Int(bits), AbiValue::Int(v)) if int_fits(*v, *bits) => {
            Ok(DynSolValue::Int(*v, *bits))
        }
        (AbiType::Bool, AbiValue::Bool(b)) => Ok(DynSolValue::Bool(*b)),
        (AbiType::Address, AbiValue::Address(a)) => Ok(DynSolValue::Address(*a)),
        (AbiType::FixedBytes(n), AbiValue::FixedBytes(b)) if b.len() == *n => {
            Ok(DynSolValue::FixedBytes(B256::right_padding_from(b), *n))
        }
        (AbiType::Bytes, AbiValue::Bytes(b)) => Ok(DynSolValue::Bytes(b.to_vec())),
        (AbiType::String, AbiValue::String(s)) => Ok(DynSolValue::String(s.clone())),
        (AbiType::Array(elem), AbiValue::Array(items)) => {
            convert_all(std::iter::repeat(elem.as_ref()), items).map(DynSolValue::Array)
        }
        (AbiType::FixedArray(elem, len), AbiValue::Array(items)) => {
            check_len(ty, *len, items.len())?;
            convert_all(std::iter::repeat(elem.as_ref()), items).map(DynSolValue::FixedArray)
        }
        (AbiType::Tuple(members), AbiValue::Tuple(items)) => {
            check_len(ty, members.len(), items.len())?;
            convert_all(members.iter(), items).map(DynSolValue::Tuple)
        }
        _ => Err(mismatch(ty, value)),
    }
}

fn convert_all<'a>(
    types: impl Iterator<Item = &'a AbiType>,
    values: &[AbiValue],
) -> Result<Vec<DynSolValue>, EncodeError> {
    types.zip(values).map(|(ty, v)| to_dyn_value(ty, v)).collect()
}

fn check_len(ty: &AbiType, expected: usize, got: usize) -> Result<(), EncodeError> {
    if expected == got {
        return Ok(());
    }
    Err(EncodeError::LengthMismatch {
        ty: ty.to_string(),
        expected,
        got,
    })
}

/// Whether `v` is representable as `int<bits>`; `bits` is a valid width.
fn int_fits(v: I256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    let high = v.asr(bits - 1);
    high == I256::ZERO || high == I256::MINUS_ONE
}

fn mismatch(ty: &AbiType, value: &AbiValue) -> EncodeError {
    EncodeError::TypeMismatch {
        ty: ty.to_string(),
        value: value.to_string(),
    }
}
