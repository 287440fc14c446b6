use super::{Error, Keypair, Signer, Verifier};
use crate::cbor::Signature;
use hex::ToHex;
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn zero_secret_verification_key() {
    // Widely published public key of the all-zero Ed25519 seed.
    let signer = Keypair::from_secret([0; 32]);
    assert_eq!(
        signer.verification_key().0.encode_hex::<String>(),
        "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29"
    );
}

#[test]
fn sign_and_verify() {
    // Do not use that on any real device, this is just for testing.
    let mut rng = StdRng::seed_from_u64(0);
    let signer = Keypair::new(&mut rng);
    let msg = b"\xa1\xa2\xa3\xa4";
    let sig = signer.sign(msg);

    assert_eq!(signer.verification_key().verify(msg, &sig), Ok(()));
}

#[test]
fn signature_is_deterministic() {
    let signer = Keypair::from_secret([7; 32]);
    assert_eq!(signer.sign(b"konduit"), signer.sign(b"konduit"));
}

#[test]
fn other_key_is_rejected() {
    let mut rng = StdRng::seed_from_u64(0);
    let signer = Keypair::new(&mut rng);
    let other = Keypair::new(&mut rng);
    let sig = signer.sign(b"msg");

    assert_eq!(
        other.verification_key().verify(b"msg", &sig),
        Err(Error::BadSignature)
    );
}

#[test]
fn tampered_message_is_rejected() {
    let signer = Keypair::from_secret([1; 32]);
    let sig = signer.sign(b"msg");

    assert_eq!(
        signer.verification_key().verify(b"msg!", &sig),
        Err(Error::BadSignature)
    );
    assert_eq!(
        signer
            .verification_key()
            .verify(b"msg", &Signature([0; 64])),
        Err(Error::BadSignature)
    );
}
