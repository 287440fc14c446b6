use super::*;
use crate::{
    cbor::Hash,
    cheque::ChequeBody,
    sig::{Keypair, Signer},
    tests::{serialize_and_compare, TAG},
};
use alloc::vec;

fn signer() -> Keypair {
    Keypair::from_secret([0; 32])
}

fn secret(index: u32) -> [u8; 32] {
    let mut secret = [0xa5; 32];
    secret[..4].copy_from_slice(&index.to_be_bytes());
    secret
}

fn cheque(index: u32, amount: u64) -> Cheque {
    let body = ChequeBody::new(index, amount, 0x792f1a100, hashlock::lock(&secret(index)));
    Cheque::make(&signer(), TAG, body).unwrap()
}

fn unlocked(index: u32, amount: u64) -> MixedCheque {
    Unlocked::new(&cheque(index, amount), &secret(index))
        .unwrap()
        .into()
}

fn squash(amount: u64, index: u32, exclude: Vec<u32>) -> Squash {
    Squash::make(&signer(), TAG, SquashBody::new(amount, index, exclude)).unwrap()
}

fn indices(receipt: &MixedReceipt) -> Vec<u32> {
    receipt.mixed_cheques().iter().map(MixedCheque::index).collect()
}

fn assert_conservation(receipt: &MixedReceipt) {
    let squashed = receipt.squash().amount();
    let all: u64 = receipt.mixed_cheques().iter().map(MixedCheque::amount).sum();
    let unlocked: u64 = receipt.unlockeds().map(Unlocked::amount).sum();
    assert_eq!(receipt.committed(), squashed + all);
    assert_eq!(receipt.amount(), squashed + unlocked);
}

#[test]
fn make_squash_body_fills_gap() {
    let receipt = MixedReceipt::new(
        squash(1000, 16, vec![2, 5, 12, 15]),
        vec![unlocked(12, 100)],
    )
    .unwrap();
    let before = receipt.clone();

    assert_eq!(
        receipt.make_squash_body(),
        Ok(SquashBody::new(1100, 16, vec![2, 5, 15]))
    );
    assert_eq!(receipt, before);
}

#[test]
fn make_squash_body_skips_locked() {
    let receipt = MixedReceipt::new(
        squash(0, 0, vec![]),
        vec![unlocked(1, 1), cheque(2, 2).into(), unlocked(3, 3)],
    )
    .unwrap();
    assert_eq!(
        receipt.make_squash_body(),
        Ok(SquashBody::new(4, 3, vec![2]))
    );
}

#[test]
fn insert_keeps_order() {
    let mut receipt = MixedReceipt::new(
        squash(1000, 11, vec![]),
        vec![cheque(18, 1).into(), cheque(12, 1).into(), unlocked(15, 1)],
    )
    .unwrap();
    assert_eq!(indices(&receipt), [12, 15, 18]);

    receipt.insert(cheque(16, 1)).unwrap();
    assert_eq!(indices(&receipt), [12, 15, 16, 18]);

    let before = receipt.clone();
    assert_eq!(receipt.insert(cheque(15, 1)), Err(Error::DuplicateIndex(15)));
    assert_eq!(receipt.insert(cheque(11, 1)), Err(Error::AlreadySquashed(11)));
    assert_eq!(receipt, before);
}

#[test]
fn insert_fills_squash_gap() {
    let mut receipt = MixedReceipt::new(squash(10, 5, vec![3]), vec![]).unwrap();
    receipt.insert(cheque(3, 1)).unwrap();
    assert_eq!(receipt.max_index(), 5);
    receipt.insert(cheque(6, 1)).unwrap();
    assert_eq!(receipt.max_index(), 6);
}

#[test]
fn receipt_full() {
    let mut receipt = MixedReceipt::new(squash(0, 0, vec![]), vec![]).unwrap();
    for i in 1..=MAX_UNSQUASHED as u32 {
        receipt.insert(cheque(i, 1)).unwrap();
    }
    assert_eq!(receipt.capacity(), 0);
    assert_eq!(receipt.insert(cheque(11, 1)), Err(Error::ReceiptFull));
}

#[test]
fn new_rejects() {
    let too_many = (1..=11).map(|i| cheque(i, 1).into()).collect();
    assert_eq!(
        MixedReceipt::new(squash(0, 0, vec![]), too_many),
        Err(Error::TooManyUnsquashed)
    );
    assert_eq!(
        MixedReceipt::new(squash(0, 3, vec![]), vec![cheque(2, 1).into()]),
        Err(Error::AlreadySquashed(2))
    );
    assert_eq!(
        MixedReceipt::new(
            squash(0, 0, vec![]),
            vec![cheque(4, 1).into(), unlocked(4, 1)]
        ),
        Err(Error::DuplicateIndex(4))
    );
}

#[test]
fn unlock() {
    let mut receipt = MixedReceipt::new(
        squash(0, 0, vec![]),
        vec![cheque(1, 10).into(), cheque(2, 20).into()],
    )
    .unwrap();
    assert_eq!(receipt.amount(), 0);
    assert_eq!(receipt.committed(), 30);

    assert_eq!(receipt.unlock(&secret(2)), 1);
    assert!(receipt.mixed_cheques()[1].is_unlocked());
    assert_eq!(receipt.amount(), 20);
    assert_eq!(receipt.committed(), 30);

    // Idempotent, and unknown secrets do nothing.
    assert_eq!(receipt.unlock(&secret(2)), 0);
    assert_eq!(receipt.unlock(b"unknown"), 0);
    assert_eq!(receipt.amount(), 20);
    assert_conservation(&receipt);
}

#[test]
fn unlock_matches_all_entries_with_the_lock() {
    let lock = hashlock::lock(b"shared");
    let make = |index| {
        Cheque::make(&signer(), TAG, ChequeBody::new(index, 5, 1, lock)).unwrap()
    };
    let mut receipt =
        MixedReceipt::new(squash(0, 0, vec![]), vec![make(1).into(), make(2).into()]).unwrap();
    assert_eq!(receipt.unlock(b"shared"), 2);
    assert_eq!(receipt.unlockeds().count(), 2);
}

#[test]
fn expire_only_drops_locked() {
    let mut receipt = MixedReceipt::new(
        squash(0, 0, vec![]),
        vec![cheque(1, 10).into(), unlocked(2, 20), cheque(3, 30).into()],
    )
    .unwrap();

    assert_eq!(receipt.expire(&[2, 3, 7]), 1);
    assert_eq!(indices(&receipt), [1, 2]);
    assert_eq!(receipt.committed(), 30);
    assert_conservation(&receipt);
}

#[test]
fn update_accepts_reproduced_squash() {
    let mut receipt = MixedReceipt::new(
        squash(1000, 16, vec![2, 5, 12, 15]),
        vec![unlocked(12, 100), cheque(17, 5).into()],
    )
    .unwrap();
    let next = squash(1100, 16, vec![2, 5, 15]);

    assert_eq!(receipt.update(next.clone()), Ok(true));
    assert_eq!(receipt.squash(), &next);
    assert_eq!(indices(&receipt), [17]);
    assert_eq!(receipt.committed(), 1105);
    assert_conservation(&receipt);
}

#[test]
fn update_partial() {
    let mut receipt = MixedReceipt::new(
        squash(0, 0, vec![]),
        vec![unlocked(1, 1), unlocked(2, 2), unlocked(3, 3)],
    )
    .unwrap();

    // Only the first two are covered, the third stays.
    assert_eq!(receipt.update(squash(3, 2, vec![])), Ok(false));
    assert_eq!(indices(&receipt), [3]);
    assert_eq!(receipt.amount(), 6);
}

#[test]
fn update_with_gap() {
    let mut receipt = MixedReceipt::new(
        squash(0, 0, vec![]),
        vec![cheque(1, 1).into(), unlocked(2, 2)],
    )
    .unwrap();

    // Index 1 is excluded and therefore not covered.
    assert_eq!(receipt.update(squash(2, 2, vec![1])), Ok(true));
    assert_eq!(indices(&receipt), [1]);
}

#[test]
fn update_rejects_locked_cheque() {
    let mut receipt = MixedReceipt::new(
        squash(0, 0, vec![]),
        vec![cheque(1, 1).into(), unlocked(2, 2)],
    )
    .unwrap();
    let before = receipt.clone();

    assert_eq!(
        receipt.update(squash(3, 2, vec![])),
        Err(UpdateError::CannotSquashLockedCheque(1))
    );
    assert_eq!(receipt, before);
}

#[test]
fn update_rejects_divergence() {
    let mut receipt = MixedReceipt::new(
        squash(1000, 16, vec![2, 5, 12, 15]),
        vec![unlocked(12, 100)],
    )
    .unwrap();
    let before = receipt.clone();

    // Wrong amount.
    assert_eq!(
        receipt.update(squash(1101, 16, vec![2, 5, 15])),
        Err(UpdateError::SquashNotReproduced)
    );
    // Wrong exclude set, 5 was never unlocked.
    assert_eq!(
        receipt.update(squash(1100, 16, vec![2, 15])),
        Err(UpdateError::SquashNotReproduced)
    );
    // Higher index without any cheque to back it.
    assert_eq!(
        receipt.update(squash(1100, 17, vec![2, 5, 15])),
        Err(UpdateError::SquashNotReproduced)
    );
    assert_eq!(receipt, before);
}

#[test]
fn update_to_same_squash() {
    let current = squash(10, 3, vec![2]);
    let mut receipt = MixedReceipt::new(current.clone(), vec![cheque(2, 1).into()]).unwrap();
    assert_eq!(receipt.update(current), Ok(true));
    assert_eq!(indices(&receipt), [2]);
}

#[test]
fn derived_receipt() {
    let receipt = MixedReceipt::new(
        squash(50, 2, vec![1]),
        vec![unlocked(1, 10), cheque(3, 30).into(), unlocked(4, 40)],
    )
    .unwrap();
    let settled = receipt.receipt();

    let settled_indices: Vec<u32> = settled.unlockeds().iter().map(Unlocked::index).collect();
    assert_eq!(settled_indices, [1, 4]);
    assert_eq!(settled.amount(), receipt.amount());
    assert_eq!(settled.amount(), 100);
    assert_eq!(receipt.cheques().count(), 1);
}

#[test]
fn verify() {
    let receipt = MixedReceipt::new(
        squash(0, 0, vec![]),
        vec![unlocked(1, 10), cheque(2, 30).into()],
    )
    .unwrap();
    assert_eq!(receipt.verify(&signer().verification_key(), TAG), Ok(()));

    let other = Keypair::from_secret([1; 32]);
    assert_eq!(
        receipt.verify(&other.verification_key(), TAG),
        Err(sig::Error::BadSignature)
    );
}

#[test]
fn encoding() {
    let receipt = MixedReceipt::new(
        squash(0, 0, vec![]),
        vec![Cheque::make(
            &signer(),
            TAG,
            ChequeBody::new(1, 9999, 0x792f1a100, Hash([0x22; 32])),
        )
        .unwrap()
        .into()],
    )
    .unwrap();
    let expected = "
        9f      begin MixedReceipt
        9f 9f 00 00 9f ff ff 5840
        2d05bff0aabedd860fc9936827bb3a11d50348e32b03a629d95386fadee7209a
        8f7f862943f9276f2939388240464ca06cf72548a340ecba1728cea538163b0a
        ff      end Squash
        9f      mixed cheques
        d87a 9f 9f 01 19270f 1b0000000792f1a100
        5820 2222222222222222222222222222222222222222222222222222222222222222
        ff 5840
        1ad3303b02e6e45dc8ddf3c7f95d746120785a6bd0067198696d07a5dfbc343b
        dbcb7fe0bdbe232cd4498fdcd35c242e5ba49bed5c0eaa9fd04ffb90aa2da004
        ff
        ff      end mixed cheques
        ff      end MixedReceipt
    ";
    serialize_and_compare(&receipt, expected);
}

#[test]
fn decode_roundtrip() {
    let receipt = MixedReceipt::new(
        squash(7, 3, vec![1]),
        vec![unlocked(1, 1), cheque(4, 2).into(), unlocked(6, 3)],
    )
    .unwrap();
    let bytes = cbor::to_vec(&receipt).unwrap();
    assert_eq!(cbor::from_slice::<MixedReceipt>(&bytes), Ok(receipt));
}
