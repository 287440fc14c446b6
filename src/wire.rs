mod encoding;

use core::fmt::Debug;

use alloc::vec::Vec;

pub use encoding::{EncodingError, JsonEncodingLayer};

use crate::{
    cheque::Cheque,
    messages::{AdaptorInfo, PayResult, QuoteRequest, QuoteResponse, SquashResponse},
    squash::Squash,
};

/// Low-Level abstraction over the HTTP connection to the adaptor.
///
/// Bodies are opaque bytes, see [JsonEncodingLayer] for what goes in them.
pub trait BytesBus: Debug {
    type Error: Debug;

    fn get(&self, endpoint: &str) -> Result<Vec<u8>, Self::Error>;

    /// `keytag` is the hex encoded keytag authenticating the channel, sent in
    /// the `konduit` header.
    fn post(&self, endpoint: &str, keytag: &str, body: &[u8]) -> Result<Vec<u8>, Self::Error>;
}

/// The requests a consumer sends to its adaptor.
///
/// Channel requests are authenticated by the channel keytag, see
/// [keytag][crate::channel::keytag].
pub trait AdaptorBus: Debug {
    type Error: Debug;

    fn info(&self) -> Result<AdaptorInfo, Self::Error>;
    fn quote(&self, keytag: &[u8], request: &QuoteRequest) -> Result<QuoteResponse, Self::Error>;
    fn squash(&self, keytag: &[u8], squash: &Squash) -> Result<SquashResponse, Self::Error>;
    fn pay(&self, keytag: &[u8], cheque: &Cheque, invoice: &str) -> Result<PayResult, Self::Error>;
}
