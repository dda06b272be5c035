//! Decimal-string serde for `TokenAmount` fields.
//!
//! Use with `#[serde(with = "feeswap_core::amount")]`. Buffered serde
//! representations (internally tagged enums, flattened structs) cannot hold
//! a `u128`, so amounts travel as strings. Plain integers that fit in a
//! `u64` are accepted on input.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

use crate::types::TokenAmount;

pub fn serialize<S: Serializer>(amount: &TokenAmount, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(amount)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TokenAmount, D::Error> {
    deserializer.deserialize_any(AmountVisitor)
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = TokenAmount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a token amount as a decimal string or unsigned integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TokenAmount, E> {
        v.parse()
            .map_err(|e| E::custom(format!("invalid amount {:?}: {}", v, e)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TokenAmount, E> {
        Ok(TokenAmount::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<TokenAmount, E> {
        Ok(v)
    }
}
