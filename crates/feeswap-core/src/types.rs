use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::fee::{MAX_PATH_LEN, MIN_PATH_LEN};

/// Value in atomic token units.
pub type TokenAmount = u128;

/// A 20-byte account or contract address.
///
/// `Address::ZERO` is the null address and is rejected wherever a real
/// account is required.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The null address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Build an address from raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Deterministic address whose last byte is `n`. Handy for fixtures.
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Fail with `ZeroAddress(field)` if this is the null address.
    pub fn require_non_zero(&self, field: &'static str) -> Result<Self, CoreError> {
        if self.is_zero() {
            Err(CoreError::ZeroAddress(field))
        } else {
            Ok(*self)
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed)
            .map_err(|e| CoreError::InvalidAddress(format!("{}: {}", s, e)))?;
        let arr: [u8; 20] = bytes.try_into().map_err(|v: Vec<u8>| {
            CoreError::InvalidAddress(format!("{}: expected 20 bytes, got {}", s, v.len()))
        })?;
        Ok(Self(arr))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One token-in/token-out swap within a batch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapLeg {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: TokenAmount,
    /// Minimum output passed through to the router.
    #[serde(default)]
    pub min_out: TokenAmount,
    /// Advisory deadline (unix seconds), enforced by the router.
    #[serde(default)]
    pub deadline: u64,
}

impl SwapLeg {
    pub fn new(
        token_in: Address,
        token_out: Address,
        amount_in: TokenAmount,
        min_out: TokenAmount,
        deadline: u64,
    ) -> Self {
        Self {
            token_in,
            token_out,
            amount_in,
            min_out,
            deadline,
        }
    }

    /// Two-token path for this leg.
    pub fn path(&self) -> Vec<Address> {
        vec![self.token_in, self.token_out]
    }
}

/// Accounting record for one completed swap. Emitted, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    pub swap_id: u64,
    pub trader: Address,
    pub token_in: Address,
    pub token_out: Address,
    #[serde(with = "crate::amount")]
    pub amount_in: TokenAmount,
    /// Observed balance delta at the recipient.
    #[serde(with = "crate::amount")]
    pub amount_out: TokenAmount,
    #[serde(with = "crate::amount")]
    pub fee: TokenAmount,
    /// Number of hops in the routed path.
    pub hops: usize,
}

/// Reconciliation snapshot sealed under an epoch id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochSnapshot {
    pub epoch_id: u64,
    /// Block height at sealing.
    pub height: u64,
    /// Global swap counter at sealing.
    pub swap_count: u64,
    pub sealed_at: DateTime<Utc>,
}

/// Validate a multi-hop token path: length within bounds, no null hops.
pub fn validate_path(path: &[Address]) -> Result<(), CoreError> {
    if path.len() < MIN_PATH_LEN || path.len() > MAX_PATH_LEN {
        return Err(CoreError::InvalidPathLength {
            len: path.len(),
            min: MIN_PATH_LEN,
            max: MAX_PATH_LEN,
        });
    }
    for hop in path {
        hop.require_non_zero("path")?;
    }
    Ok(())
}
