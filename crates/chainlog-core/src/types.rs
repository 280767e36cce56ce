//! ABI type and value model.
//!
//! `AbiType` is the closed set of Solidity ABI types an event parameter can
//! declare. `AbiValue` is the closed set of decoded native values. Callers
//! pattern-match on the variant tag rather than downcasting.

use crate::error::DescriptorError;
use alloy_primitives::{Address, Bytes, B256, I256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size of one ABI slot in bytes.
pub const WORD_SIZE: usize = 32;

/// A Solidity ABI type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbiType {
    /// `uint<M>`, width in bits.
    Uint(usize),
    /// `int<M>`, width in bits.
    Int(usize),
    Bool,
    Address,
    /// `bytes<N>`, length in bytes.
    FixedBytes(usize),
    /// Variable-length `bytes`.
    Bytes,
    String,
    /// `T[]`
    Array(Box<AbiType>),
    /// `T[k]`
    FixedArray(Box<AbiType>, usize),
    /// `(T1,T2,...)`
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Whether values of this type live in the tail region of an encoding.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(elem, _) => elem.is_dynamic(),
            AbiType::Tuple(members) => members.iter().any(AbiType::is_dynamic),
            _ => false,
        }
    }

    /// Whether the type is encoded in exactly one 32-byte slot.
    pub fn is_word(&self) -> bool {
        matches!(
            self,
            AbiType::Uint(_)
                | AbiType::Int(_)
                | AbiType::Bool
                | AbiType::Address
                | AbiType::FixedBytes(_)
        )
    }

    /// Bytes this type occupies in a head region.
    ///
    /// Dynamic types occupy one offset slot; static tuples and static fixed
    /// arrays are laid out inline.
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return WORD_SIZE;
        }
        match self {
            AbiType::FixedArray(elem, len) => elem.head_size().saturating_mul(*len),
            AbiType::Tuple(members) => members
                .iter()
                .fold(0usize, |acc, m| acc.saturating_add(m.head_size())),
            _ => WORD_SIZE,
        }
    }

    /// Whether the declared widths are within ABI limits.
    pub fn is_valid(&self) -> bool {
        match self {
            AbiType::Uint(bits) | AbiType::Int(bits) => valid_int_width(*bits),
            AbiType::FixedBytes(n) => (1..=32).contains(n),
            AbiType::Array(elem) | AbiType::FixedArray(elem, _) => elem.is_valid(),
            AbiType::Tuple(members) => members.iter().all(AbiType::is_valid),
            _ => true,
        }
    }
}

fn valid_int_width(bits: usize) -> bool {
    bits >= 8 && bits <= 256 && bits % 8 == 0
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::Bool => write!(f, "bool"),
            AbiType::Address => write!(f, "address"),
            AbiType::FixedBytes(n) => write!(f, "bytes{n}"),
            AbiType::Bytes => write!(f, "bytes"),
            AbiType::String => write!(f, "string"),
            AbiType::Array(elem) => write!(f, "{elem}[]"),
            AbiType::FixedArray(elem, len) => write!(f, "{elem}[{len}]"),
            AbiType::Tuple(members) => {
                write!(f, "(")?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{m}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl FromStr for AbiType {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let unknown = || DescriptorError::UnknownType(s.to_string());

        // Array suffixes bind last: `(uint8,bool)[2][]` is an array of `(uint8,bool)[2]`.
        if let Some(stripped) = s.strip_suffix(']') {
            let open = stripped.rfind('[').ok_or_else(unknown)?;
            let elem: AbiType = stripped[..open].parse()?;
            let len = stripped[open + 1..].trim();
            if len.is_empty() {
                return Ok(AbiType::Array(Box::new(elem)));
            }
            let len = parse_digits(len).ok_or_else(unknown)?;
            return Ok(AbiType::FixedArray(Box::new(elem), len));
        }

        let body = s.strip_prefix("tuple").unwrap_or(s);
        if let Some(inner) = body.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
            let members = split_top_level(inner)
                .ok_or_else(unknown)?
                .into_iter()
                .map(str::parse)
                .collect::<Result<Vec<AbiType>, _>>()?;
            return Ok(AbiType::Tuple(members));
        }

        let ty = match s {
            "bool" => AbiType::Bool,
            "address" => AbiType::Address,
            "string" => AbiType::String,
            "bytes" => AbiType::Bytes,
            "uint" => AbiType::Uint(256),
            "int" => AbiType::Int(256),
            "byte" => AbiType::FixedBytes(1),
            _ => {
                if let Some(bits) = s.strip_prefix("uint") {
                    AbiType::Uint(parse_digits(bits).ok_or_else(unknown)?)
                } else if let Some(bits) = s.strip_prefix("int") {
                    AbiType::Int(parse_digits(bits).ok_or_else(unknown)?)
                } else if let Some(len) = s.strip_prefix("bytes") {
                    AbiType::FixedBytes(parse_digits(len).ok_or_else(unknown)?)
                } else {
                    return Err(unknown());
                }
            }
        };

        if ty.is_valid() {
            Ok(ty)
        } else {
            Err(unknown())
        }
    }
}

fn parse_digits(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Split a comma-separated list at parenthesis depth zero.
///
/// Returns `None` when parentheses or brackets are unbalanced. An empty or
/// all-whitespace input yields an empty list. Parts are trimmed.
pub fn split_top_level(list: &str) -> Option<Vec<&str>> {
    if list.trim().is_empty() {
        return Some(Vec::new());
    }
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            ',' if depth == 0 => {
                parts.push(list[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(list[start..].trim());
    Some(parts)
}

/// A decoded ABI value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AbiValue {
    /// Unsigned integer of any width, kept at full 256-bit precision.
    Uint(U256),
    /// Signed integer of any width, two's complement over 256 bits.
    Int(I256),
    Bool(bool),
    /// `bytes<N>`; holds exactly N bytes.
    FixedBytes(Bytes),
    Bytes(Bytes),
    String(String),
    Address(Address),
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
    /// keccak-256 digest of an indexed reference-type argument.
    /// The original value cannot be recovered from a log.
    Hashed(B256),
}

impl AbiValue {
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            AbiValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    /// Raw bytes of a `bytes` or `bytes<N>` value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => Some(b.as_ref()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Tuple(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Returns `true` for an indexed argument that only survives as its digest.
    pub fn is_hashed(&self) -> bool {
        matches!(self, AbiValue::Hashed(_))
    }
}

impl From<U256> for AbiValue {
    fn from(v: U256) -> Self {
        AbiValue::Uint(v)
    }
}

impl From<I256> for AbiValue {
    fn from(v: I256) -> Self {
        AbiValue::Int(v)
    }
}

impl From<bool> for AbiValue {
    fn from(v: bool) -> Self {
        AbiValue::Bool(v)
    }
}

impl From<Address> for AbiValue {
    fn from(v: Address) -> Self {
        AbiValue::Address(v)
    }
}

impl From<String> for AbiValue {
    fn from(v: String) -> Self {
        AbiValue::String(v)
    }
}

impl From<&str> for AbiValue {
    fn from(v: &str) -> Self {
        AbiValue::String(v.to_string())
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Uint(v) => write!(f, "{v}"),
            AbiValue::Int(v) => write!(f, "{v}"),
            AbiValue::Bool(v) => write!(f, "{v}"),
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            AbiValue::String(s) => write!(f, "{s}"),
            AbiValue::Address(a) => write!(f, "{a}"),
            AbiValue::Array(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            AbiValue::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
            AbiValue::Hashed(h) => write!(f, "keccak({h})"),
        }
    }
}
