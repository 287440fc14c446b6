//! Receipts: a squash together with the claims it does not cover yet.
//!
//! [MixedReceipt] is the working state of a channel and holds locked and
//! unlocked cheques. [Receipt] is the settlement view derived from it and
//! only contains the unlocked ones.

use alloc::vec::Vec;

use serde::Serialize;
use thiserror::Error;

use crate::{
    cbor::{self, Decode, Decoder},
    cheque::Unlocked,
    sig::{self, Verifier},
    squash::{DuplicateIndex, Squash},
};

mod mixed;
pub use mixed::MixedReceipt;

/// Maximum number of cheques a receipt holds next to its squash.
pub const MAX_UNSQUASHED: usize = 10;

/// Structural errors of [Receipt] and [MixedReceipt].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("more than {MAX_UNSQUASHED} unsquashed cheques")]
    TooManyUnsquashed,
    #[error("receipt already holds {MAX_UNSQUASHED} cheques")]
    ReceiptFull,
    #[error("cheque index {0} is already squashed")]
    AlreadySquashed(u32),
    #[error("duplicate cheque index {0}")]
    DuplicateIndex(u32),
}

/// Reasons a proposed squash is not accepted by [MixedReceipt::update].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    #[error("squash covers locked cheque {0}")]
    CannotSquashLockedCheque(u32),
    #[error("squash body was not reproduced from the unlocked cheques")]
    SquashNotReproduced,
    #[error("replaying the unlocked cheques failed")]
    Replay(#[from] DuplicateIndex),
}

/// Sorts `items` by index and checks the receipt invariants against `squash`.
fn check_entries<T>(squash: &Squash, items: &mut [T], index: impl Fn(&T) -> u32) -> Result<(), Error> {
    if items.len() > MAX_UNSQUASHED {
        return Err(Error::TooManyUnsquashed);
    }
    items.sort_by_key(&index);
    if let Some(i) = items.iter().map(&index).find(|&i| squash.is_index_squashed(i)) {
        return Err(Error::AlreadySquashed(i));
    }
    if let Some(w) = items.windows(2).find(|w| index(&w[0]) == index(&w[1])) {
        return Err(Error::DuplicateIndex(index(&w[0])));
    }
    Ok(())
}

/// A squash plus the unlocked cheques it does not cover, encoded as
/// `[squash, [unlocked..]]`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    squash: Squash,
    unlockeds: Vec<Unlocked>,
}

impl Receipt {
    pub fn new(squash: Squash, mut unlockeds: Vec<Unlocked>) -> Result<Self, Error> {
        check_entries(&squash, &mut unlockeds, Unlocked::index)?;
        Ok(Self { squash, unlockeds })
    }

    pub fn squash(&self) -> &Squash {
        &self.squash
    }

    pub fn unlockeds(&self) -> &[Unlocked] {
        &self.unlockeds
    }

    /// The redeemable amount: the squash plus every unlocked cheque.
    pub fn amount(&self) -> u64 {
        self.unlockeds
            .iter()
            .fold(self.squash.amount(), |sum, u| sum.saturating_add(u.amount()))
    }

    pub fn verify<V: Verifier>(&self, key: &V, tag: &[u8]) -> Result<(), sig::Error> {
        self.squash.verify(key, tag)?;
        self.unlockeds.iter().try_for_each(|u| u.verify(key, tag))
    }
}

impl Decode for Receipt {
    fn decode(d: &mut Decoder<'_>) -> cbor::Result<Self> {
        let (squash, unlockeds) =
            d.record(2, |d| Ok((Squash::decode(d)?, d.list(Unlocked::decode)?)))?;
        Receipt::new(squash, unlockeds).map_err(|_| cbor::Error::Invalid("receipt"))
    }
}
