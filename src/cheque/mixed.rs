use core::cmp::Ordering;

use serde::Serialize;

use super::{Cheque, ChequeBody, Unlocked};
use crate::{
    cbor::{self, constructor_index, Decode, Decoder},
    sig::{self, Verifier},
};

/// Either a locked [Cheque] or an [Unlocked] one.
///
/// Encoded as the constructor tag (121 for `Unlocked`, 122 for `Cheque`)
/// directly followed by the record.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub enum MixedCheque {
    Unlocked(Unlocked),
    Cheque(Cheque),
}

impl MixedCheque {
    pub fn body(&self) -> &ChequeBody {
        match self {
            MixedCheque::Unlocked(u) => u.body(),
            MixedCheque::Cheque(c) => &c.body,
        }
    }

    pub fn index(&self) -> u32 {
        self.body().index
    }

    pub fn amount(&self) -> u64 {
        self.body().amount
    }

    pub fn is_cheque(&self) -> bool {
        matches!(self, MixedCheque::Cheque(_))
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, MixedCheque::Unlocked(_))
    }

    pub fn as_cheque(&self) -> Option<&Cheque> {
        match self {
            MixedCheque::Cheque(c) => Some(c),
            MixedCheque::Unlocked(_) => None,
        }
    }

    pub fn as_unlocked(&self) -> Option<&Unlocked> {
        match self {
            MixedCheque::Unlocked(u) => Some(u),
            MixedCheque::Cheque(_) => None,
        }
    }

    pub fn verify<V: Verifier>(&self, key: &V, tag: &[u8]) -> Result<(), sig::Error> {
        match self {
            MixedCheque::Unlocked(u) => u.verify(key, tag),
            MixedCheque::Cheque(c) => c.verify(key, tag),
        }
    }

    /// Receipt order: ascending index, a locked cheque before an unlocked one
    /// with the same index.
    pub fn cmp_by_index(&self, other: &Self) -> Ordering {
        fn rank(c: &MixedCheque) -> u8 {
            match c {
                MixedCheque::Cheque(_) => 0,
                MixedCheque::Unlocked(_) => 1,
            }
        }
        self.index()
            .cmp(&other.index())
            .then_with(|| rank(self).cmp(&rank(other)))
    }
}

impl From<Cheque> for MixedCheque {
    fn from(c: Cheque) -> Self {
        MixedCheque::Cheque(c)
    }
}

impl From<Unlocked> for MixedCheque {
    fn from(u: Unlocked) -> Self {
        MixedCheque::Unlocked(u)
    }
}

impl Decode for MixedCheque {
    fn decode(d: &mut Decoder<'_>) -> cbor::Result<Self> {
        let tag = d.tag()?;
        match constructor_index(tag) {
            Some(0) => Ok(MixedCheque::Unlocked(Unlocked::decode(d)?)),
            Some(1) => Ok(MixedCheque::Cheque(Cheque::decode(d)?)),
            _ => Err(cbor::Error::UnknownTag(tag)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cbor::Hash,
        cheque::tests::body,
        sig::{Keypair, Signer},
        tests::{serialize_and_compare, TAG},
    };

    // Signed with the all-zero secret key and an empty tag.
    const CHEQUE: &str = "
        d87a    tag 122: Cheque
        9f      begin Cheque
        9f 01 19270f 1b0000000792f1a100
        5820 2222222222222222222222222222222222222222222222222222222222222222
        ff      end ChequeBody
        5840    signature, 64 bytes
        1ad3303b02e6e45dc8ddf3c7f95d746120785a6bd0067198696d07a5dfbc343b
        dbcb7fe0bdbe232cd4498fdcd35c242e5ba49bed5c0eaa9fd04ffb90aa2da004
        ff      end Cheque
    ";

    const UNLOCKED: &str = "
        d879    tag 121: Unlocked
        9f      begin Unlocked
        9f 01 19270f 1b0000000792f1a100
        5820 9f72ea0cf49536e3c66c787f705186df9a4378083753ae9536d65b3ad7fcddc4
        ff      end ChequeBody
        5840    signature, 64 bytes
        29c0bc24c2068aa96f4dc99ac072aa73338d06130ef7b38c3936079c433b4a41
        b3bd59e1e5db36aae1a6708b0e1855ac9fc182f08e9053d2f6c7be147b6cba02
        5820    secret
        2222222222222222222222222222222222222222222222222222222222222222
        ff      end Unlocked
    ";

    fn signer() -> Keypair {
        Keypair::from_secret([0; 32])
    }

    fn cheque() -> MixedCheque {
        Cheque::make(&signer(), TAG, body()).unwrap().into()
    }

    fn unlocked() -> MixedCheque {
        Unlocked::make(&signer(), TAG, 1, 9999, 0x792f1a100, &[0x22; 32])
            .unwrap()
            .into()
    }

    #[test]
    fn cheque_vector() {
        serialize_and_compare(&cheque(), CHEQUE);
    }

    #[test]
    fn unlocked_vector() {
        serialize_and_compare(&unlocked(), UNLOCKED);
    }

    #[test]
    fn decode_dispatches_on_tag() {
        for mixed in [cheque(), unlocked()] {
            let bytes = cbor::to_vec(&mixed).unwrap();
            let decoded: MixedCheque = cbor::from_slice(&bytes).unwrap();
            assert_eq!(decoded, mixed);
            assert_eq!(
                decoded.verify(&signer().verification_key(), TAG),
                Ok(())
            );
        }
    }

    #[test]
    fn unknown_tag() {
        let mut bytes = cbor::to_vec(&cheque()).unwrap();
        // d87a -> d87b
        bytes[1] = 0x7b;
        assert_eq!(
            cbor::from_slice::<MixedCheque>(&bytes),
            Err(cbor::Error::UnknownTag(123))
        );
    }

    #[test]
    fn ordering() {
        let signer = signer();
        let at = |index| -> MixedCheque {
            Cheque::make(&signer, TAG, ChequeBody::new(index, 1, 1, Hash([0; 32])))
                .unwrap()
                .into()
        };

        assert_eq!(at(1).cmp_by_index(&at(2)), Ordering::Less);
        assert_eq!(at(3).cmp_by_index(&at(2)), Ordering::Greater);
        assert_eq!(cheque().cmp_by_index(&unlocked()), Ordering::Less);
        assert_eq!(unlocked().cmp_by_index(&cheque()), Ordering::Greater);
        assert_eq!(cheque().cmp_by_index(&cheque()), Ordering::Equal);
    }
}
