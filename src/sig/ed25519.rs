//! Signer using the ed25519-dalek crate.

use core::fmt::Debug;

use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};

use super::{Error, Signer, Verifier};
use crate::cbor::{Signature, VerificationKey};

pub struct Keypair {
    key: SigningKey,
    vkey: VerificationKey,
}

impl Keypair {
    pub fn new<R: rand::RngCore + rand::CryptoRng>(rng: &mut R) -> Self {
        Self::from_secret(SigningKey::generate(rng).to_bytes())
    }

    /// Restores a keypair from its 32 byte secret seed.
    pub fn from_secret(secret: [u8; 32]) -> Self {
        let key = SigningKey::from_bytes(&secret);
        let vkey = VerificationKey(key.verifying_key().to_bytes());
        Self { key, vkey }
    }
}

// Only the public half is printed.
impl Debug for Keypair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Keypair").field("vkey", &self.vkey).finish()
    }
}

impl Signer for Keypair {
    fn verification_key(&self) -> VerificationKey {
        self.vkey
    }

    fn sign(&self, msg: &[u8]) -> Signature {
        Signature(self.key.sign(msg).to_bytes())
    }
}

impl Verifier for VerificationKey {
    fn verify(&self, msg: &[u8], sig: &Signature) -> Result<(), Error> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|_| Error::MalformedKey)?;
        let sig = ed25519_dalek::Signature::from_bytes(&sig.0);
        key.verify(msg, &sig).map_err(|_| Error::BadSignature)
    }
}
