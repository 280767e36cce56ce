//! Network identifier carried as configuration context.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An EVM chain id (EIP-155).
///
/// Plain bounded-width integer; the decoder never does arithmetic on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const MAINNET: Self = Self(1);
    pub const OPTIMISM: Self = Self(10);
    pub const POLYGON: Self = Self(137);
    pub const BASE: Self = Self(8453);
    pub const HOLESKY: Self = Self(17_000);
    pub const ARBITRUM_ONE: Self = Self(42_161);
    pub const SEPOLIA: Self = Self(11_155_111);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }

    /// Human-readable slug for well-known networks.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::MAINNET => Some("ethereum"),
            Self::OPTIMISM => Some("optimism"),
            Self::POLYGON => Some("polygon"),
            Self::BASE => Some("base"),
            Self::HOLESKY => Some("holesky"),
            Self::ARBITRUM_ONE => Some("arbitrum"),
            Self::SEPOLIA => Some("sepolia"),
            _ => None,
        }
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "chain-{}", self.0),
        }
    }
}
