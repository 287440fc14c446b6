//! Messages exchanged with the adaptor.
//!
//! Everything is snake_case JSON. Plain byte fields are hex strings, signed
//! records ([Squash], [Cheque]) travel as the hex of their canonical CBOR
//! encoding so the adaptor can check the signatures over the exact bytes.

use alloc::{string::String, vec::Vec};

use serde::{Deserialize, Serialize};

use crate::{cbor::VerificationKey, cheque::Cheque, squash::Squash};

/// What an adaptor advertises on `/info`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AdaptorInfo {
    #[serde(with = "hex::serde")]
    pub adaptor_key: VerificationKey,
    /// Milliseconds the adaptor has to respond after a close.
    pub close_period: u64,
    pub fee: u64,
    pub max_tag_length: u32,
    #[serde(with = "hex::serde")]
    pub deployer_vkey: VerificationKey,
    #[serde(with = "hex::serde")]
    pub script_hash: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub amount_msat: u64,
    /// Node id of the payee.
    #[serde(with = "hex::serde")]
    pub payee: Vec<u8>,
}

/// The terms under which the adaptor forwards a payment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteResponse {
    /// Amount the cheque has to carry, fees included.
    pub amount: u64,
    /// Milliseconds the cheque has to stay valid.
    pub relative_timeout: u64,
    pub routing_fee: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SquashRequest {
    #[serde(with = "cbor_hex")]
    pub squash: Squash,
}

/// Whether the adaptor holds unlocked cheques the submitted squash missed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SquashResponse {
    Complete,
    Incomplete,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PayRequest {
    #[serde(with = "cbor_hex")]
    pub cheque: Cheque,
    /// Lightning invoice to pay.
    pub invoice: String,
}

/// Outcome of a payment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum PayResult {
    /// Paid. Carries the secret revealed by the payee.
    Redeemed(#[serde(with = "hex::serde")] Vec<u8>),
    /// Will not be paid, with the reason given by the adaptor.
    Rejected(String),
    /// Still in flight, ask again later.
    Pending,
}

/// Hex of the canonical CBOR encoding.
mod cbor_hex {
    use alloc::vec::Vec;

    use serde::{de, ser, Deserializer, Serialize, Serializer};

    use crate::cbor::{self, Decode};

    pub fn serialize<T: Serialize, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
        let bytes = cbor::to_vec(value).map_err(ser::Error::custom)?;
        hex::serde::serialize(bytes, s)
    }

    pub fn deserialize<'de, T: Decode, D: Deserializer<'de>>(d: D) -> Result<T, D::Error> {
        let bytes: Vec<u8> = hex::serde::deserialize(d)?;
        cbor::from_slice(&bytes).map_err(de::Error::custom)
    }
}
