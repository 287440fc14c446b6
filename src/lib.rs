#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod cbor {
    //! Canonical CBOR as understood by the on-chain validator.
    //!
    //! Encoding is driven by `serde`, decoding by the hand written [Decode]
    //! implementations of the signed records.

    mod de;
    mod error;
    mod ser;

    pub mod as_bytes;
    pub mod types;

    pub use de::{from_slice, Decode, Decoder};
    pub use error::{Error, Result};
    pub use ser::{
        constructor_index, constructor_tag, to_tagged_vec, to_vec, to_writer, Serializer, Writer,
    };
    pub use types::{Hash, Signature, VerificationKey};

}

pub mod aiken;
pub mod channel;
pub mod cheque;
mod client;
pub mod hashlock;
pub mod ledger;
pub mod messages;
pub mod receipt;
pub mod sig;
pub mod squash;
pub mod wire;

pub use cbor::{Hash, Signature, VerificationKey};
pub use client::{Client, ClientError};
