//! On-chain (L1) channel records and the off-chain (L2) channel state built on
//! top of them.

mod info;
mod l1;
mod l2;
mod stage;

use alloc::vec::Vec;

use crate::cbor::VerificationKey;

pub use info::L2ChannelInfo;
pub use l1::{L1Channel, OutputRef, Phase};
pub use l2::{AddChequeError, L2Channel, UpdateSquashError, MAX_INDEX_GAP};
pub use stage::Stage;

/// Identifies a channel towards the adaptor: the consumer's verification key
/// followed by the channel tag.
pub fn keytag(key: &VerificationKey, tag: &[u8]) -> Vec<u8> {
    let mut keytag = Vec::with_capacity(VerificationKey::LEN + tag.len());
    keytag.extend_from_slice(&key.0);
    keytag.extend_from_slice(tag);
    keytag
}
