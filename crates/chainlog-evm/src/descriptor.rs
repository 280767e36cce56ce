//! Event descriptors and parser configuration.
//!
//! An `EventDescriptor` is the validated, immutable description of one
//! contract event. Its canonical signature and signature hash are computed
//! once at construction. A `ParserConfig` pairs a descriptor with the
//! optional contract address and chain the parser is bound to.

use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, B256};
use chainlog_core::{AbiType, ChainId, DescriptorError};
use serde::{Deserialize, Serialize};

use crate::fingerprint::event_signature_hash;
use crate::signature::{self, is_identifier};

/// Topics available for indexed arguments when topic 0 carries the hash.
pub const MAX_INDEXED: usize = 3;
/// Anonymous events may use all four topics for arguments.
pub const MAX_INDEXED_ANONYMOUS: usize = 4;

/// One declared event parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventParam {
    /// May be empty for unnamed parameters
    pub name: String,
    pub ty: AbiType,
    pub indexed: bool,
}

impl EventParam {
    pub fn new(name: impl Into<String>, ty: AbiType, indexed: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed,
        }
    }

    pub fn indexed(name: impl Into<String>, ty: AbiType) -> Self {
        Self::new(name, ty, true)
    }

    pub fn data(name: impl Into<String>, ty: AbiType) -> Self {
        Self::new(name, ty, false)
    }
}

/// A validated event definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDescriptor {
    name: String,
    signature: String,
    signature_hash: B256,
    params: Vec<EventParam>,
    indexed_count: usize,
    anonymous: bool,
}

impl EventDescriptor {
    /// Build a descriptor from its parts.
    ///
    /// Fails when the name is not an identifier, a type has an invalid
    /// width, or more parameters are indexed than the log has topics for.
    pub fn new(
        name: impl Into<String>,
        params: Vec<EventParam>,
        anonymous: bool,
    ) -> Result<Self, DescriptorError> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(DescriptorError::InvalidSignature {
                signature: name,
                reason: "event name is not an identifier".into(),
            });
        }
        if let Some(bad) = params.iter().find(|p| !p.ty.is_valid()) {
            return Err(DescriptorError::UnknownType(bad.ty.to_string()));
        }

        let indexed_count = params.iter().filter(|p| p.indexed).count();
        let max = if anonymous {
            MAX_INDEXED_ANONYMOUS
        } else {
            MAX_INDEXED
        };
        if indexed_count > max {
            return Err(DescriptorError::TooManyIndexed {
                event: name,
                count: indexed_count,
                max,
            });
        }

        let signature = canonical_signature(&name, &params);
        let signature_hash = event_signature_hash(&signature);
        Ok(Self {
            name,
            signature,
            signature_hash,
            params,
            indexed_count,
            anonymous,
        })
    }

    /// Parse a human-readable declaration, e.g.
    /// `event Transfer(address indexed from, address indexed to, uint256 value)`.
    pub fn parse(declaration: &str) -> Result<Self, DescriptorError> {
        let decl = signature::parse_event(declaration)?;
        Self::new(decl.name, decl.params, decl.anonymous)
    }

    /// Build from a Solidity JSON ABI event fragment.
    pub fn from_json_abi_event(event: &alloy_json_abi::Event) -> Result<Self, DescriptorError> {
        let params = event
            .inputs
            .iter()
            .map(|input| {
                let ty = json_param_type(&input.ty, &input.components)?;
                Ok(EventParam::new(input.name.clone(), ty, input.indexed))
            })
            .collect::<Result<Vec<_>, DescriptorError>>()?;
        Self::new(event.name.clone(), params, event.anonymous)
    }

    /// Find `event_name` in a full JSON ABI document and build its descriptor.
    ///
    /// For overloaded events the first declaration wins.
    pub fn from_abi_json(abi_json: &str, event_name: &str) -> Result<Self, DescriptorError> {
        let abi: JsonAbi =
            serde_json::from_str(abi_json).map_err(|e| DescriptorError::InvalidAbi(e.to_string()))?;
        let event = abi
            .events()
            .find(|e| e.name == event_name)
            .ok_or_else(|| DescriptorError::EventNotFound(event_name.to_string()))?;
        Self::from_json_abi_event(event)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical signature, e.g. `Transfer(address,address,uint256)`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn signature_hash(&self) -> B256 {
        self.signature_hash
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[EventParam] {
        &self.params
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn indexed_count(&self) -> usize {
        self.indexed_count
    }

    /// Number of topics a conforming log carries.
    pub fn expected_topic_count(&self) -> usize {
        if self.anonymous {
            self.indexed_count
        } else {
            self.indexed_count + 1
        }
    }

    pub fn indexed_params(&self) -> impl Iterator<Item = &EventParam> {
        self.params.iter().filter(|p| p.indexed)
    }

    pub fn data_params(&self) -> impl Iterator<Item = &EventParam> {
        self.params.iter().filter(|p| !p.indexed)
    }
}

fn canonical_signature(name: &str, params: &[EventParam]) -> String {
    let types: Vec<String> = params.iter().map(|p| p.ty.to_string()).collect();
    format!("{name}({})", types.join(","))
}

/// Resolve a JSON ABI type string, expanding `tuple` from its components.
fn json_param_type(
    ty: &str,
    components: &[alloy_json_abi::Param],
) -> Result<AbiType, DescriptorError> {
    let Some(suffix) = ty.strip_prefix("tuple") else {
        return ty.parse();
    };
    let members = components
        .iter()
        .map(|c| json_param_type(&c.ty, &c.components))
        .collect::<Result<Vec<_>, _>>()?;
    format!("{}{suffix}", AbiType::Tuple(members)).parse()
}

/// Everything a parser needs to recognise one event.
///
/// Built once by the caller and shared read-only across scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    descriptor: EventDescriptor,
    address: Option<Address>,
    chain: Option<ChainId>,
}

impl ParserConfig {
    /// Match the event from any contract.
    pub fn new(descriptor: EventDescriptor) -> Self {
        Self {
            descriptor,
            address: None,
            chain: None,
        }
    }

    /// Shorthand for `ParserConfig::new(EventDescriptor::parse(declaration)?)`.
    pub fn parse(declaration: &str) -> Result<Self, DescriptorError> {
        Ok(Self::new(EventDescriptor::parse(declaration)?))
    }

    /// Only match logs emitted by `address`.
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_chain(mut self, chain: ChainId) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn descriptor(&self) -> &EventDescriptor {
        &self.descriptor
    }

    /// `None` means any address.
    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn chain(&self) -> Option<ChainId> {
        self.chain
    }
}
