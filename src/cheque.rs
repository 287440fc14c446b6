//! Cheques: signed, hash-locked claims against a channel.

use alloc::vec::Vec;

use serde::Serialize;

use crate::{
    cbor::{self, Decode, Decoder, Hash, Signature},
    sig::{self, Signer, Verifier},
};

mod mixed;
mod unlocked;

pub use mixed::MixedCheque;
pub use unlocked::Unlocked;

/// Terms of a single claim. Encoded as `[index, amount, timeout, lock]`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChequeBody {
    pub index: u32,
    pub amount: u64,
    /// Posix time in milliseconds after which the claim can no longer be
    /// redeemed.
    pub timeout: u64,
    pub lock: Hash,
}

impl ChequeBody {
    pub fn new(index: u32, amount: u64, timeout: u64, lock: Hash) -> Self {
        Self {
            index,
            amount,
            timeout,
            lock,
        }
    }

    /// The message covered by the cheque signature.
    pub fn signed_message(&self, tag: &[u8]) -> Result<Vec<u8>, cbor::Error> {
        cbor::to_tagged_vec(tag, self)
    }
}

impl Decode for ChequeBody {
    fn decode(d: &mut Decoder<'_>) -> cbor::Result<Self> {
        d.record(4, |d| {
            Ok(Self {
                index: d.u32()?,
                amount: d.u64()?,
                timeout: d.u64()?,
                lock: Hash::decode(d)?,
            })
        })
    }
}

/// A locked claim: a [ChequeBody] together with the issuer's signature.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Cheque {
    pub body: ChequeBody,
    pub signature: Signature,
}

impl Cheque {
    /// Signs `body` for the channel identified by `tag`.
    pub fn make<S: Signer>(signer: &S, tag: &[u8], body: ChequeBody) -> Result<Self, cbor::Error> {
        let signature = signer.sign(&body.signed_message(tag)?);
        Ok(Self { body, signature })
    }

    pub fn verify<V: Verifier>(&self, key: &V, tag: &[u8]) -> Result<(), sig::Error> {
        key.verify(&self.body.signed_message(tag)?, &self.signature)
    }

    pub fn index(&self) -> u32 {
        self.body.index
    }

    pub fn amount(&self) -> u64 {
        self.body.amount
    }
}

impl Decode for Cheque {
    fn decode(d: &mut Decoder<'_>) -> cbor::Result<Self> {
        d.record(2, |d| {
            Ok(Self {
                body: ChequeBody::decode(d)?,
                signature: Signature::decode(d)?,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hashlock,
        sig::{Error, Keypair},
        tests::{serialize_and_compare, TAG},
    };

    pub(crate) fn body() -> ChequeBody {
        ChequeBody::new(1, 9999, 0x792f1a100, Hash([0x22; 32]))
    }

    #[test]
    fn body_encoding() {
        let expected = "
            9f            begin ChequeBody
            01            index
            19270f        amount (9999)
            1b0000000792f1a100
                          timeout, above 2^30 and thus wide
            5820          lock, 32 bytes
            2222222222222222222222222222222222222222222222222222222222222222
            ff            end ChequeBody
        ";
        serialize_and_compare(&body(), expected);
    }

    #[test]
    fn small_timeout_is_compact() {
        let body = ChequeBody::new(24, 23, 1 << 30, Hash([0; 32]));
        let expected = "
            9f 1818 17 1a40000000
            5820 0000000000000000000000000000000000000000000000000000000000000000
            ff
        ";
        serialize_and_compare(&body, expected);
    }

    #[test]
    fn sign_and_verify() {
        let signer = Keypair::from_secret([0; 32]);
        let cheque = Cheque::make(&signer, TAG, body()).unwrap();

        assert_eq!(cheque.verify(&signer.verification_key(), TAG), Ok(()));
        assert_eq!(
            cheque.verify(&signer.verification_key(), b"other channel"),
            Err(Error::BadSignature)
        );
    }

    #[test]
    fn tampered_amount_is_rejected() {
        let signer = Keypair::from_secret([0; 32]);
        let mut cheque = Cheque::make(&signer, TAG, body()).unwrap();
        cheque.body.amount += 1;

        assert_eq!(
            cheque.verify(&signer.verification_key(), TAG),
            Err(Error::BadSignature)
        );
    }

    #[test]
    fn decode_roundtrip() {
        let signer = Keypair::from_secret([3; 32]);
        let body = ChequeBody::new(7, 1_000_000, 1_700_000_000_000, hashlock::lock(b"x"));
        let cheque = Cheque::make(&signer, TAG, body).unwrap();

        let bytes = cbor::to_vec(&cheque).unwrap();
        assert_eq!(cbor::from_slice::<Cheque>(&bytes), Ok(cheque));
    }
}
