//! Hash locks: a cheque is locked to `H(secret)` and unlocked by revealing
//! the secret.

use sha2::Digest;

use crate::cbor::Hash;

/// Hash function used to derive and check cheque locks.
pub trait LockHasher {
    fn lock(&self, secret: &[u8]) -> Hash;

    fn opens(&self, secret: &[u8], lock: &Hash) -> bool {
        self.lock(secret) == *lock
    }
}

/// The default lock hash, matching Lightning payment hashes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256;

impl LockHasher for Sha256 {
    fn lock(&self, secret: &[u8]) -> Hash {
        Hash(sha2::Sha256::digest(secret).into())
    }
}

/// Shorthand for [Sha256::lock].
pub fn lock(secret: &[u8]) -> Hash {
    Sha256.lock(secret)
}
