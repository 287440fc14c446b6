use core::fmt::Debug;

use alloc::vec::Vec;

use crate::channel::{L1Channel, OutputRef};

/// Access to the settlement ledger holding the channel outputs.
pub trait Ledger: Debug {
    type Error: Debug;

    /// Submits the transaction locking `amount` into a new channel for `tag`.
    fn open(&self, tag: &[u8], amount: u64) -> Result<OutputRef, Self::Error>;

    /// Every channel output currently observed for `tag`, in ledger order.
    fn channels(&self, tag: &[u8]) -> Result<Vec<L1Channel>, Self::Error>;
}
