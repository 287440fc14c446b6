use alloc::vec::Vec;

use serde::Serialize;
use tracing::debug;

use super::{check_entries, Error, Receipt, UpdateError, MAX_UNSQUASHED};
use crate::{
    cbor::{self, Decode, Decoder},
    cheque::{Cheque, MixedCheque, Unlocked},
    hashlock::{self, LockHasher},
    sig::{self, Verifier},
    squash::{DuplicateIndex, Squash, SquashBody},
};

/// The working state of a channel: the last accepted squash and every cheque
/// it does not cover yet, locked or unlocked.
///
/// Entries are sorted by index, have unique indices, are not covered by the
/// squash and there are at most [MAX_UNSQUASHED] of them. Every mutation
/// either succeeds or leaves the receipt untouched.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MixedReceipt {
    squash: Squash,
    mixed_cheques: Vec<MixedCheque>,
}

impl MixedReceipt {
    pub fn new(squash: Squash, mut mixed_cheques: Vec<MixedCheque>) -> Result<Self, Error> {
        check_entries(&squash, &mut mixed_cheques, MixedCheque::index)?;
        Ok(Self {
            squash,
            mixed_cheques,
        })
    }

    /// A receipt without any cheque. Always valid.
    pub fn from_squash(squash: Squash) -> Self {
        Self {
            squash,
            mixed_cheques: Vec::new(),
        }
    }

    pub fn squash(&self) -> &Squash {
        &self.squash
    }

    pub fn mixed_cheques(&self) -> &[MixedCheque] {
        &self.mixed_cheques
    }

    pub fn cheques(&self) -> impl Iterator<Item = &Cheque> {
        self.mixed_cheques.iter().filter_map(MixedCheque::as_cheque)
    }

    pub fn unlockeds(&self) -> impl Iterator<Item = &Unlocked> {
        self.mixed_cheques.iter().filter_map(MixedCheque::as_unlocked)
    }

    /// The highest index in use, by the squash or any cheque.
    pub fn max_index(&self) -> u32 {
        self.mixed_cheques
            .last()
            .map_or(self.squash.index(), |c| c.index().max(self.squash.index()))
    }

    /// Number of cheques that can still be inserted.
    pub fn capacity(&self) -> usize {
        MAX_UNSQUASHED.saturating_sub(self.mixed_cheques.len())
    }

    /// Squashed plus unlocked amount.
    pub fn amount(&self) -> u64 {
        self.unlockeds()
            .fold(self.squash.amount(), |sum, u| sum.saturating_add(u.amount()))
    }

    /// Squashed plus every cheque, locked or not.
    pub fn committed(&self) -> u64 {
        self.mixed_cheques
            .iter()
            .fold(self.squash.amount(), |sum, c| sum.saturating_add(c.amount()))
    }

    /// Derives the settlement view holding only the unlocked cheques.
    pub fn receipt(&self) -> Receipt {
        // The unlocked entries are a subset of ours and thus satisfy every
        // receipt invariant.
        Receipt {
            squash: self.squash.clone(),
            unlockeds: self.unlockeds().cloned().collect(),
        }
    }

    /// Adds a locked cheque at its sorted position.
    ///
    /// Neither the signature nor the channel balance is checked here.
    pub fn insert(&mut self, cheque: Cheque) -> Result<(), Error> {
        let index = cheque.index();
        if self.mixed_cheques.len() >= MAX_UNSQUASHED {
            return Err(Error::ReceiptFull);
        }
        if self.squash.is_index_squashed(index) {
            return Err(Error::AlreadySquashed(index));
        }
        match self
            .mixed_cheques
            .binary_search_by_key(&index, MixedCheque::index)
        {
            Ok(_) => Err(Error::DuplicateIndex(index)),
            Err(pos) => {
                debug!(index, amount = cheque.amount(), "insert cheque");
                self.mixed_cheques.insert(pos, cheque.into());
                Ok(())
            }
        }
    }

    /// Unlocks every locked cheque whose lock `secret` opens. Returns how many
    /// were unlocked.
    pub fn unlock(&mut self, secret: &[u8]) -> usize {
        self.unlock_with(&hashlock::Sha256, secret)
    }

    pub fn unlock_with<H: LockHasher>(&mut self, hasher: &H, secret: &[u8]) -> usize {
        let lock = hasher.lock(secret);
        let mut unlocked = 0;
        for entry in self.mixed_cheques.iter_mut() {
            let next = match entry {
                MixedCheque::Cheque(c) if c.body.lock == lock => {
                    Unlocked::new_with(hasher, c, secret).ok()
                }
                _ => None,
            };
            if let Some(u) = next {
                debug!(index = u.index(), "unlock cheque");
                *entry = u.into();
                unlocked += 1;
            }
        }
        unlocked
    }

    /// Drops the locked cheques with the given indices. Unlocked cheques are
    /// kept. Returns how many were dropped.
    pub fn expire(&mut self, indices: &[u32]) -> usize {
        let before = self.mixed_cheques.len();
        self.mixed_cheques
            .retain(|c| !(c.is_cheque() && indices.contains(&c.index())));
        let expired = before - self.mixed_cheques.len();
        if expired > 0 {
            debug!(expired, "expire cheques");
        }
        expired
    }

    /// The squash body obtained by folding every unlocked cheque into the
    /// current one.
    pub fn make_squash_body(&self) -> Result<SquashBody, DuplicateIndex> {
        let mut body = self.squash.body.clone();
        for u in self.unlockeds() {
            body.squash(u.body())?;
        }
        Ok(body)
    }

    /// Accepts `squash` if it is exactly the current squash with some of our
    /// unlocked cheques folded in.
    ///
    /// Returns true if no unlocked cheque remains afterwards.
    pub fn update(&mut self, squash: Squash) -> Result<bool, UpdateError> {
        let mut body = self.squash.body.clone();
        let mut remaining = Vec::with_capacity(self.mixed_cheques.len());
        for entry in &self.mixed_cheques {
            if !squash.is_index_squashed(entry.index()) {
                remaining.push(entry.clone());
                continue;
            }
            match entry {
                MixedCheque::Cheque(c) => {
                    return Err(UpdateError::CannotSquashLockedCheque(c.index()))
                }
                MixedCheque::Unlocked(u) => body.squash(u.body())?,
            }
        }
        if body != squash.body {
            return Err(UpdateError::SquashNotReproduced);
        }

        debug!(
            index = squash.index(),
            amount = squash.amount(),
            dropped = self.mixed_cheques.len() - remaining.len(),
            "squash accepted"
        );
        self.squash = squash;
        self.mixed_cheques = remaining;
        Ok(!self.mixed_cheques.iter().any(MixedCheque::is_unlocked))
    }

    /// Verifies the squash and every entry under `key`.
    pub fn verify<V: Verifier>(&self, key: &V, tag: &[u8]) -> Result<(), sig::Error> {
        self.squash.verify(key, tag)?;
        self.mixed_cheques.iter().try_for_each(|c| c.verify(key, tag))
    }
}

impl Decode for MixedReceipt {
    fn decode(d: &mut Decoder<'_>) -> cbor::Result<Self> {
        let (squash, cheques) =
            d.record(2, |d| Ok((Squash::decode(d)?, d.list(MixedCheque::decode)?)))?;
        MixedReceipt::new(squash, cheques).map_err(|_| cbor::Error::Invalid("mixed receipt"))
    }
}

#[cfg(test)]
mod tests;
