//! Error types for the ChainLog decode and scan pipeline.

use thiserror::Error;

/// A single log failed to decode after it matched.
///
/// Scoped to that log only: the scan drops it and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Malformed value: {reason}")]
    MalformedValue { reason: String },

    #[error("Truncated data: need {needed} bytes, have {available}")]
    TruncatedData { needed: usize, available: usize },

    #[error("Offset {offset} out of range for a {len}-byte region")]
    OffsetOutOfRange { offset: usize, len: usize },
}

impl DecodeError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedValue {
            reason: reason.into(),
        }
    }
}

/// The node could not supply a transaction, block or receipt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("{what} not found")]
    NotFound { what: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ResolutionError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }
}

/// An event declaration or ABI type string could not be turned into a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("Invalid event signature '{signature}': {reason}")]
    InvalidSignature { signature: String, reason: String },

    #[error("Unknown ABI type '{0}'")]
    UnknownType(String),

    #[error("Event '{event}' declares {count} indexed parameters (max {max})")]
    TooManyIndexed {
        event: String,
        count: usize,
        max: usize,
    },

    #[error("Event '{0}' not found in ABI")]
    EventNotFound(String),

    #[error("Invalid ABI JSON: {0}")]
    InvalidAbi(String),
}

/// A value could not be ABI-encoded as the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("Cannot encode {value} as {ty}")]
    TypeMismatch { ty: String, value: String },

    #[error("Length mismatch for {ty}: expected {expected} values, got {got}")]
    LengthMismatch {
        ty: String,
        expected: usize,
        got: usize,
    },

    #[error("Cannot derive a topic for {ty}")]
    UnsupportedTopic { ty: String },
}

/// Top-level error returned by parser entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    #[error("Resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Decode was attempted on a log that does not match the descriptor.
    #[error("Precondition failed: {reason}")]
    PreconditionFailed { reason: String },

    #[error("Invalid descriptor: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("Scan worker failed: {0}")]
    Worker(String),
}
