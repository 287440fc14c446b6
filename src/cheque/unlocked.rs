use alloc::vec::Vec;

use serde::Serialize;

use super::{Cheque, ChequeBody};
use crate::{
    cbor::{self, as_bytes, Decode, Decoder, Signature},
    hashlock::{self, LockHasher},
    sig::{self, Signer, Verifier},
};

/// A cheque whose secret is known. Encoded as `[body, signature, secret]`.
///
/// Only constructed with a secret that opens the lock.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Unlocked {
    body: ChequeBody,
    signature: Signature,
    #[serde(with = "as_bytes")]
    secret: Vec<u8>,
}

impl Unlocked {
    /// Unlocks `cheque` with `secret` using the default lock hash.
    pub fn new(cheque: &Cheque, secret: &[u8]) -> Result<Self, sig::Error> {
        Self::new_with(&hashlock::Sha256, cheque, secret)
    }

    pub fn new_with<H: LockHasher>(
        hasher: &H,
        cheque: &Cheque,
        secret: &[u8],
    ) -> Result<Self, sig::Error> {
        if !hasher.opens(secret, &cheque.body.lock) {
            return Err(sig::Error::SecretMismatch);
        }
        Ok(Self {
            body: cheque.body,
            signature: cheque.signature,
            secret: secret.to_vec(),
        })
    }

    /// Derives the lock from `secret`, then builds and signs the body.
    pub fn make<S: Signer>(
        signer: &S,
        tag: &[u8],
        index: u32,
        amount: u64,
        timeout: u64,
        secret: &[u8],
    ) -> Result<Self, cbor::Error> {
        let body = ChequeBody::new(index, amount, timeout, hashlock::lock(secret));
        let cheque = Cheque::make(signer, tag, body)?;
        Ok(Self {
            body: cheque.body,
            signature: cheque.signature,
            secret: secret.to_vec(),
        })
    }

    /// Checks the signature and that the secret opens the lock.
    pub fn verify<V: Verifier>(&self, key: &V, tag: &[u8]) -> Result<(), sig::Error> {
        self.verify_with(&hashlock::Sha256, key, tag)
    }

    pub fn verify_with<H: LockHasher, V: Verifier>(
        &self,
        hasher: &H,
        key: &V,
        tag: &[u8],
    ) -> Result<(), sig::Error> {
        key.verify(&self.body.signed_message(tag)?, &self.signature)?;
        if !hasher.opens(&self.secret, &self.body.lock) {
            return Err(sig::Error::SecretMismatch);
        }
        Ok(())
    }

    pub fn body(&self) -> &ChequeBody {
        &self.body
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn index(&self) -> u32 {
        self.body.index
    }

    pub fn amount(&self) -> u64 {
        self.body.amount
    }

    /// The locked cheque this was unlocked from.
    pub fn cheque(&self) -> Cheque {
        Cheque {
            body: self.body,
            signature: self.signature,
        }
    }
}

// The secret is not checked against the lock here, decoded values come from
// the counterparty and go through `verify` before they are trusted.
impl Decode for Unlocked {
    fn decode(d: &mut Decoder<'_>) -> cbor::Result<Self> {
        d.record(3, |d| {
            Ok(Self {
                body: ChequeBody::decode(d)?,
                signature: Signature::decode(d)?,
                secret: d.byte_vec()?,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cbor::Hash,
        sig::{Error, Keypair},
        tests::TAG,
    };

    fn cheque(signer: &Keypair) -> Cheque {
        let body = ChequeBody::new(1, 9999, 0x792f1a100, hashlock::lock(&[0x22; 32]));
        Cheque::make(signer, TAG, body).unwrap()
    }

    #[test]
    fn new_checks_secret() {
        let signer = Keypair::from_secret([0; 32]);
        let cheque = cheque(&signer);

        assert_eq!(
            Unlocked::new(&cheque, &[0x23; 32]),
            Err(Error::SecretMismatch)
        );

        let unlocked = Unlocked::new(&cheque, &[0x22; 32]).unwrap();
        assert_eq!(unlocked.cheque(), cheque);
        assert_eq!(unlocked.secret(), &[0x22; 32]);
        assert_eq!(unlocked.verify(&signer.verification_key(), TAG), Ok(()));
    }

    #[test]
    fn make_matches_manual_unlock() {
        let signer = Keypair::from_secret([0; 32]);
        let made = Unlocked::make(&signer, TAG, 1, 9999, 0x792f1a100, &[0x22; 32]).unwrap();
        let manual = Unlocked::new(&cheque(&signer), &[0x22; 32]).unwrap();

        assert_eq!(made, manual);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let signer = Keypair::from_secret([0; 32]);
        let cheque = Cheque::make(
            &signer,
            TAG,
            ChequeBody::new(2, 10, 100, Hash([0; 32])),
        )
        .unwrap();
        // Decoding does not check the secret, verification does.
        let bytes = cbor::to_vec(&Unlocked {
            body: cheque.body,
            signature: cheque.signature,
            secret: alloc::vec![1, 2, 3],
        })
        .unwrap();
        let decoded: Unlocked = cbor::from_slice(&bytes).unwrap();

        assert_eq!(
            decoded.verify(&signer.verification_key(), TAG),
            Err(Error::SecretMismatch)
        );
    }
}
