//! Error type and Return values used by the canonical encoding.

use alloc::string::{String, ToString};
use core::fmt::Display;

use serde::ser;
use thiserror::Error;

/// Represents all possible errors that can happen while encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The type has no representation in the on-chain data format.
    ///
    /// For example floating point numbers, options and maps. Only integers,
    /// byte strings, lists and constructors have an on-chain form.
    #[error("type is not representable in the canonical encoding: {0}")]
    TypeNotRepresentable(&'static str),
    /// Although the type is representable (currently only `char`), the
    /// Serializer does not implement this functionality.
    #[error("type is not yet implemented: {0}")]
    TypeNotYetSupported(&'static str),
    /// Enum variant index that has no constructor tag.
    #[error("constructor index {0} has no tag")]
    ConstructorOutOfRange(u32),
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEnd(usize),
    #[error("unexpected byte {found:#04x} at offset {offset}, expected {expected}")]
    Unexpected {
        offset: usize,
        found: u8,
        expected: &'static str,
    },
    #[error("integer does not fit into {0}")]
    IntegerOverflow(&'static str),
    #[error("expected {expected} bytes, got {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("unknown constructor tag {0}")]
    UnknownTag(u64),
    #[error("{0} trailing bytes after the encoded value")]
    TrailingBytes(usize),
    /// The bytes are well-formed but describe a value that breaks an
    /// invariant of the decoded type.
    #[error("invalid value: {0}")]
    Invalid(&'static str),
    #[error("{0}")]
    Custom(String),
}

impl ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Custom(msg.to_string())
    }
}

/// Alias for `Result` using the [Error] returned by the codec.
pub type Result<T> = core::result::Result<T, Error>;
