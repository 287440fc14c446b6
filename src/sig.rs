//! Handles the creation and verification of the Ed25519 signatures carried by
//! cheques and squashes.
//!
//! The signed message is always `tag ‖ encode(body)`, see
//! [to_tagged_vec][crate::cbor::to_tagged_vec].

use thiserror::Error;

use crate::cbor::{self, Signature, VerificationKey};

mod ed25519;
pub use self::ed25519::Keypair;

#[cfg(test)]
mod tests;

/// Reasons a signed record can fail verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("failed to encode the signed message")]
    Encoding(#[from] cbor::Error),
    #[error("signature does not verify under the given key")]
    BadSignature,
    #[error("verification key is not a valid curve point")]
    MalformedKey,
    #[error("secret does not hash to the cheque lock")]
    SecretMismatch,
    #[error("squash body is malformed")]
    InvalidSquashBody,
}

/// Something that can sign messages and tells which key verifies them.
pub trait Signer {
    fn verification_key(&self) -> VerificationKey;
    fn sign(&self, msg: &[u8]) -> Signature;
}

/// Something that can check a signature over a message.
pub trait Verifier {
    fn verify(&self, msg: &[u8], sig: &Signature) -> Result<(), Error>;
}
