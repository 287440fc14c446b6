//! Squashes: the compacted, signed aggregate of every settled cheque.
//!
//! A [SquashBody] stores a high-water mark `index`, the total `amount` of
//! all settled cheques and the `exclude` list of indices at or below the
//! high-water mark that have not been settled (the gaps).

use alloc::vec::Vec;

use serde::Serialize;
use thiserror::Error;

use crate::{
    cbor::{self, Decode, Decoder, Signature},
    cheque::ChequeBody,
    sig::{self, Signer, Verifier},
};

/// The cheque index has already been folded into the squash.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cheque index {0} is already squashed")]
pub struct DuplicateIndex(pub u32);

/// Encoded as `[amount, index, [exclude..]]`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SquashBody {
    pub amount: u64,
    pub index: u32,
    pub exclude: Vec<u32>,
}

impl SquashBody {
    pub fn new(amount: u64, index: u32, exclude: Vec<u32>) -> Self {
        Self {
            amount,
            index,
            exclude,
        }
    }

    /// The initial body of every channel. Index 0 counts as squashed, so
    /// cheques start at index 1.
    pub fn zero() -> Self {
        Self::default()
    }

    /// The exclude list is strictly increasing and below `index`.
    pub fn verify(&self) -> bool {
        self.exclude.windows(2).all(|w| w[0] < w[1])
            && self.exclude.last().map_or(true, |&last| last < self.index)
    }

    pub fn is_index_squashed(&self, index: u32) -> bool {
        index <= self.index && !self.exclude.contains(&index)
    }

    /// Returns the body with `cheque` folded in, leaving `self` untouched.
    ///
    /// Cheques must be folded in ascending index order. Otherwise gaps below
    /// the new high-water mark are not recorded in the exclude list.
    pub fn squashed(&self, cheque: &ChequeBody) -> Result<Self, DuplicateIndex> {
        let mut next = self.clone();
        if let Some(pos) = next.exclude.iter().position(|&i| i == cheque.index) {
            next.exclude.remove(pos);
        } else if cheque.index > next.index {
            next.exclude.extend(next.index + 1..cheque.index);
            next.index = cheque.index;
        } else {
            return Err(DuplicateIndex(cheque.index));
        }
        next.amount = next.amount.saturating_add(cheque.amount);
        Ok(next)
    }

    /// In-place version of [squashed][Self::squashed]. On error `self` is
    /// unchanged.
    pub fn squash(&mut self, cheque: &ChequeBody) -> Result<(), DuplicateIndex> {
        *self = self.squashed(cheque)?;
        Ok(())
    }

    pub fn signed_message(&self, tag: &[u8]) -> Result<Vec<u8>, cbor::Error> {
        cbor::to_tagged_vec(tag, self)
    }
}

impl Decode for SquashBody {
    fn decode(d: &mut Decoder<'_>) -> cbor::Result<Self> {
        d.record(3, |d| {
            Ok(Self {
                amount: d.u64()?,
                index: d.u32()?,
                exclude: d.list(|d| d.u32())?,
            })
        })
    }
}

/// A [SquashBody] signed by the channel owner.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Squash {
    pub body: SquashBody,
    pub signature: Signature,
}

impl Squash {
    pub fn make<S: Signer>(signer: &S, tag: &[u8], body: SquashBody) -> Result<Self, cbor::Error> {
        let signature = signer.sign(&body.signed_message(tag)?);
        Ok(Self { body, signature })
    }

    /// Checks the shape of the body and the signature.
    pub fn verify<V: Verifier>(&self, key: &V, tag: &[u8]) -> Result<(), sig::Error> {
        if !self.body.verify() {
            return Err(sig::Error::InvalidSquashBody);
        }
        key.verify(&self.body.signed_message(tag)?, &self.signature)
    }

    pub fn index(&self) -> u32 {
        self.body.index
    }

    pub fn amount(&self) -> u64 {
        self.body.amount
    }

    pub fn is_index_squashed(&self, index: u32) -> bool {
        self.body.is_index_squashed(index)
    }
}

impl Decode for Squash {
    fn decode(d: &mut Decoder<'_>) -> cbor::Result<Self> {
        d.record(2, |d| {
            Ok(Self {
                body: SquashBody::decode(d)?,
                signature: Signature::decode(d)?,
            })
        })
    }
}
