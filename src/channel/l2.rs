use alloc::vec::Vec;

use thiserror::Error;
use tracing::{debug, warn};

use super::{keytag, L1Channel, L2ChannelInfo};
use crate::{
    cbor::VerificationKey,
    cheque::Cheque,
    receipt::{self, MixedReceipt, UpdateError},
    sig,
    squash::{DuplicateIndex, Squash, SquashBody},
};

/// How far above the highest known index an incoming cheque may be. Every
/// skipped index ends up in the exclude list of the next squash.
pub const MAX_INDEX_GAP: u32 = 1024;

/// Reasons an incoming cheque is refused by [L2Channel::add_cheque].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddChequeError {
    #[error("bad cheque signature")]
    BadSignature(#[source] sig::Error),
    #[error("cheque times out at {timeout}, which is not after {now}")]
    ExpiresTooSoon { timeout: u64, now: u64 },
    #[error("no L1 channel")]
    NoL1Channel,
    #[error("L1 channel is not opened")]
    ChannelNotOpened,
    #[error("receipt not initiated")]
    ReceiptNotInitiated,
    #[error("cheque index {index} is more than {MAX_INDEX_GAP} above {max_index}")]
    IndexTooFar { index: u32, max_index: u32 },
    #[error("amount unavailable: cheque over {amount}, threshold {threshold}")]
    AmountUnavailable { amount: u64, threshold: u64 },
    #[error("receipt rejected the cheque")]
    Receipt(#[from] receipt::Error),
}

/// Reasons a squash is refused by [L2Channel::update_squash].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateSquashError {
    #[error("bad squash signature")]
    BadSignature(#[source] sig::Error),
    #[error("no L1 channel")]
    NoL1Channel,
    #[error("L1 channel is not opened")]
    ChannelNotOpened,
    #[error("mixed receipt rejected the squash")]
    MixedReceipt(#[source] UpdateError),
}

/// Off-chain state of one channel.
///
/// `l1` is the best on-chain record observed so far and `receipt` the
/// evidence of what is owed. Both are optional: a channel may be known before
/// its output is observed and before the first squash arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L2Channel {
    info: L2ChannelInfo,
    l1: Option<L1Channel>,
    receipt: Option<MixedReceipt>,
}

impl L2Channel {
    pub fn new(info: L2ChannelInfo, l1: Option<L1Channel>, receipt: Option<MixedReceipt>) -> Self {
        Self { info, l1, receipt }
    }

    /// A freshly opened channel with its initial squash.
    pub fn open(info: L2ChannelInfo, l1: L1Channel, squash: Squash) -> Self {
        Self::new(info, Some(l1), Some(MixedReceipt::from_squash(squash)))
    }

    /// Picks the opened channel with the largest deposit. On equal deposits
    /// the first one wins.
    pub fn from_channels(info: L2ChannelInfo, channels: impl IntoIterator<Item = L1Channel>) -> Self {
        let l1 = channels
            .into_iter()
            .filter(L1Channel::is_opened)
            .fold(None, |best: Option<L1Channel>, c| match best {
                Some(b) if b.amount >= c.amount => Some(b),
                _ => Some(c),
            });
        Self::new(info, l1, None)
    }

    pub fn info(&self) -> &L2ChannelInfo {
        &self.info
    }

    pub fn tag(&self) -> &[u8] {
        &self.info.tag
    }

    pub fn l1(&self) -> Option<&L1Channel> {
        self.l1.as_ref()
    }

    pub fn receipt(&self) -> Option<&MixedReceipt> {
        self.receipt.as_ref()
    }

    pub fn receipt_mut(&mut self) -> Option<&mut MixedReceipt> {
        self.receipt.as_mut()
    }

    /// The channel identifier towards the adaptor for the consumer `key`.
    pub fn keytag(&self, key: &VerificationKey) -> Vec<u8> {
        keytag(key, &self.info.tag)
    }

    /// Squashed plus unlocked amount, zero without a receipt.
    pub fn owed(&self) -> u64 {
        self.receipt.as_ref().map_or(0, MixedReceipt::amount)
    }

    /// Squashed plus every cheque, zero without a receipt.
    pub fn committed(&self) -> u64 {
        self.receipt.as_ref().map_or(0, MixedReceipt::committed)
    }

    /// How many cheques can still be issued, zero without a receipt.
    pub fn capacity(&self) -> usize {
        self.receipt.as_ref().map_or(0, MixedReceipt::capacity)
    }

    /// Funds of the opened L1 channel not yet committed to cheques.
    pub fn available(&self) -> u64 {
        let (Some(_), Some(l1)) = (&self.receipt, &self.l1) else {
            return 0;
        };
        let Some(subbed) = l1.stage.opened_subbed() else {
            return 0;
        };
        let committed = self.committed();
        // Both clamps are only hit if a counterfeit record is observed.
        if committed < subbed {
            return 0;
        }
        let rel_committed = committed - subbed;
        if rel_committed > l1.amount {
            return 0;
        }
        l1.amount - rel_committed
    }

    pub fn can_quote(&self, amount: u64) -> bool {
        self.capacity() > 0 && self.available() >= amount
    }

    /// Replaces `l1` with the opened channel maximizing first the claimable
    /// amount and then the deposit. Ties keep the record seen first, and
    /// without any opened channel `l1` is cleared.
    pub fn update_from_l1(&mut self, channels: impl IntoIterator<Item = L1Channel>) {
        let owed = self.owed();
        let mut best: Option<((u64, u64), L1Channel)> = None;
        for channel in channels {
            let Some(subbed) = channel.stage.opened_subbed() else {
                continue;
            };
            let key = if owed >= subbed {
                ((owed - subbed).min(channel.amount), channel.amount)
            } else {
                (0, 0)
            };
            if best.as_ref().map_or(true, |(best_key, _)| key > *best_key) {
                best = Some((key, channel));
            }
        }
        self.l1 = best.map(|(_, channel)| channel);
        debug!(l1 = ?self.l1, "l1 channel updated");
    }

    /// Accepts a cheque issued by the adaptor key of this channel.
    ///
    /// `now` is the current posix time in milliseconds.
    pub fn add_cheque(&mut self, cheque: Cheque, now: u64) -> Result<(), AddChequeError> {
        if let Err(e) = cheque.verify(&self.info.adaptor_key, &self.info.tag) {
            warn!(index = cheque.index(), "rejected cheque with bad signature");
            return Err(AddChequeError::BadSignature(e));
        }
        if cheque.body.timeout <= now {
            return Err(AddChequeError::ExpiresTooSoon {
                timeout: cheque.body.timeout,
                now,
            });
        }
        let l1 = self.l1.as_ref().ok_or(AddChequeError::NoL1Channel)?;
        let subbed = l1
            .stage
            .opened_subbed()
            .ok_or(AddChequeError::ChannelNotOpened)?;
        let receipt = self
            .receipt
            .as_mut()
            .ok_or(AddChequeError::ReceiptNotInitiated)?;
        let max_index = receipt.max_index();
        if cheque.index() > max_index.saturating_add(MAX_INDEX_GAP) {
            warn!(index = cheque.index(), max_index, "rejected cheque far above the receipt");
            return Err(AddChequeError::IndexTooFar {
                index: cheque.index(),
                max_index,
            });
        }

        // Kept as observed on the settlement side although it disagrees with
        // `available`: the threshold is the larger of the relative commitment
        // and the deposit.
        let committed = receipt.committed();
        let threshold = if committed > subbed {
            (committed - subbed).max(l1.amount)
        } else {
            0
        };
        if threshold > cheque.body.amount {
            return Err(AddChequeError::AmountUnavailable {
                amount: cheque.body.amount,
                threshold,
            });
        }

        receipt.insert(cheque)?;
        Ok(())
    }

    /// Accepts a squash signed by the adaptor key of this channel.
    ///
    /// The first squash starts the receipt. Later ones must be reproducible
    /// from the unlocked cheques, see [MixedReceipt::update]. Returns true if
    /// no unlocked cheque remains.
    pub fn update_squash(&mut self, squash: Squash) -> Result<bool, UpdateSquashError> {
        if let Err(e) = squash.verify(&self.info.adaptor_key, &self.info.tag) {
            warn!(index = squash.index(), "rejected squash with bad signature");
            return Err(UpdateSquashError::BadSignature(e));
        }
        let l1 = self.l1.as_ref().ok_or(UpdateSquashError::NoL1Channel)?;
        if !l1.is_opened() {
            return Err(UpdateSquashError::ChannelNotOpened);
        }

        match self.receipt.as_mut() {
            None => {
                debug!(index = squash.index(), "receipt started");
                self.receipt = Some(MixedReceipt::from_squash(squash));
                Ok(true)
            }
            Some(receipt) => receipt
                .update(squash)
                .map_err(UpdateSquashError::MixedReceipt),
        }
    }

    /// Unlocks the cheques opened by `secret`, returning how many.
    pub fn unlock(&mut self, secret: &[u8]) -> usize {
        self.receipt.as_mut().map_or(0, |r| r.unlock(secret))
    }

    /// Drops the locked cheques with the given indices, returning how many.
    pub fn expire(&mut self, indices: &[u32]) -> usize {
        self.receipt.as_mut().map_or(0, |r| r.expire(indices))
    }

    /// The squash body folding every unlocked cheque, `None` without a
    /// receipt.
    pub fn make_squash_body(&self) -> Option<Result<SquashBody, DuplicateIndex>> {
        self.receipt.as_ref().map(MixedReceipt::make_squash_body)
    }
}
