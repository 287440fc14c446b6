use core::fmt::Debug;

use rand::{distributions::Standard, prelude::Distribution};
use serde::Serialize;

use super::de::{Decode, Decoder};
use super::Result;

macro_rules! impl_hex_debug {
    ($T:ident) => {
        impl Debug for $T {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str("0x")?;
                for b in self.0 {
                    f.write_fmt(format_args!("{:02x}", b))?;
                }
                Ok(())
            }
        }
    };
}

macro_rules! bytesN {
    ( $T:ident, $N:literal ) => {
        #[derive(PartialEq, Eq, Copy, Clone)]
        pub struct $T(pub [u8; $N]);

        impl $T {
            pub const LEN: usize = $N;
        }

        impl Serialize for $T {
            fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_bytes(&self.0)
            }
        }

        impl Decode for $T {
            fn decode(d: &mut Decoder<'_>) -> Result<Self> {
                Ok($T(d.byte_array()?))
            }
        }

        impl Distribution<$T> for Standard {
            fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> $T {
                $T(rng.gen())
            }
        }

        impl Default for $T {
            fn default() -> Self {
                Self([0; $N])
            }
        }

        impl AsRef<[u8]> for $T {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $N]> for $T {
            fn from(bytes: [u8; $N]) -> Self {
                Self(bytes)
            }
        }

        // Allows the JSON layer to use `#[serde(with = "hex::serde")]`.
        impl hex::FromHex for $T {
            type Error = hex::FromHexError;

            fn from_hex<H: AsRef<[u8]>>(hex: H) -> core::result::Result<Self, Self::Error> {
                let mut bytes = [0u8; $N];
                hex::decode_to_slice(hex, &mut bytes)?;
                Ok(Self(bytes))
            }
        }

        impl_hex_debug!($T);
    };
}

bytesN!(Hash, 32);
bytesN!(Signature, 64);
bytesN!(VerificationKey, 32);
