use alloc::{string::String, vec::Vec};

use serde::{Deserialize, Serialize};

use crate::{cbor::VerificationKey, messages::AdaptorInfo};

/// Static configuration of an L2 channel, fixed when the channel is opened.
///
/// Stored as JSON with hex encoded byte fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct L2ChannelInfo {
    /// Domain separation tag mixed into every signed message.
    #[serde(with = "hex::serde")]
    pub tag: Vec<u8>,
    /// Key the adaptor signs squashes (and, as holder, cheques) with.
    #[serde(with = "hex::serde")]
    pub adaptor_key: VerificationKey,
    /// Milliseconds the adaptor has to respond after a close.
    pub close_period: u64,
    pub adaptor_url: String,
    /// Flat fee the adaptor charges per payment.
    pub fee: u64,
}

impl L2ChannelInfo {
    /// Builds the info from what the adaptor advertises on `/info`.
    pub fn from_adaptor(tag: Vec<u8>, adaptor_url: String, info: &AdaptorInfo) -> Self {
        Self {
            tag,
            adaptor_key: info.adaptor_key,
            close_period: info.close_period,
            adaptor_url,
            fee: info.fee,
        }
    }
}
