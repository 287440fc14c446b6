//! Serialize any `&[u8]` as a CBOR byte string (major type 2).
//!
//! Without this, serde hands a `Vec<u8>` or `[u8; N]` to the serializer
//! element by element and it would end up as an array of small integers.
//!
//! # Example usage
//! ```
//! # use serde::Serialize;
//! # use konduit::cbor::as_bytes;
//!
//! #[derive(Serialize, Debug)]
//! pub struct Preimage {
//!     #[serde(with = "as_bytes")]
//!     pub secret: Vec<u8>,
//! }
//!
//! let bytes = konduit::cbor::to_vec(&Preimage { secret: vec![0xaa; 2] }).unwrap();
//! assert_eq!(bytes, [0x9f, 0x42, 0xaa, 0xaa, 0xff]);
//! ```

use serde::Serializer;

pub fn serialize<T, S>(v: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]> + ?Sized,
    S: Serializer,
{
    serializer.serialize_bytes(v.as_ref())
}
