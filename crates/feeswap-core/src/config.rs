use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Address;

/// Domain tag mixed into the ledger's separation seed.
pub const DOMAIN_TAG: &[u8] = b"feeswap.ledger.v1";

/// Construction parameters for a swap settlement ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Address the ledger acts as when moving tokens.
    pub address: Address,
    /// Recipient of protocol fees.
    pub fee_collector: Address,
    /// Reference (quote) token.
    pub reference_token: Address,
    /// Chain identifier mixed into the domain seed.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
}

fn default_chain_id() -> u64 {
    1
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            address: Address::from_low_u64(0x5eed),
            fee_collector: Address::from_low_u64(0xfee),
            reference_token: Address::from_low_u64(0x1),
            chain_id: default_chain_id(),
        }
    }
}

/// Immutable ledger configuration, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub fee_collector: Address,
    pub reference_token: Address,
    /// `blake3(DOMAIN_TAG || chain_id_be || ledger_address)`.
    #[serde(with = "hex_seed")]
    pub domain_seed: [u8; 32],
    /// Block height at construction.
    pub genesis_height: u64,
}

impl LedgerConfig {
    /// Validate settings and derive the immutable configuration.
    pub fn derive(settings: &LedgerSettings, genesis_height: u64) -> Result<Self, CoreError> {
        let address = settings.address.require_non_zero("ledger address")?;
        let fee_collector = settings.fee_collector.require_non_zero("fee collector")?;
        let reference_token = settings.reference_token.require_non_zero("reference token")?;

        Ok(Self {
            fee_collector,
            reference_token,
            domain_seed: domain_seed(settings.chain_id, &address),
            genesis_height,
        })
    }
}

/// Compute the domain-separation seed for a ledger deployment.
pub fn domain_seed(chain_id: u64, ledger: &Address) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(DOMAIN_TAG);
    hasher.update(&chain_id.to_be_bytes());
    hasher.update(ledger.as_bytes());
    *hasher.finalize().as_bytes()
}

mod hex_seed {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(seed: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(seed))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(d)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("domain seed must be 32 bytes"))
    }
}
