//! Decoding of the canonical encoding.
//!
//! Encoding goes through serde, decoding is done by hand: the records are
//! small and the decoder has to be more lenient than the encoder. Integers
//! are accepted with any head width and as tag 2 bignums, arrays may have a
//! definite or an indefinite length.

use alloc::vec::Vec;

use super::error::{Error, Result};
use super::ser::BREAK;

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_BYTES: u8 = 2;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_TAG: u8 = 6;

/// Tag of a positive bignum (a byte string holding a big endian integer).
const TAG_POSITIVE_BIGNUM: u64 = 2;

/// Types that can be read back from their canonical encoding.
pub trait Decode: Sized {
    fn decode(d: &mut Decoder<'_>) -> Result<Self>;
}

/// Decodes exactly one value from `bytes`, rejecting trailing data.
pub fn from_slice<T: Decode>(bytes: &[u8]) -> Result<T> {
    let mut d = Decoder::new(bytes);
    let value = T::decode(&mut d)?;
    d.finish()?;
    Ok(value)
}

/// Length information of an array head.
#[derive(Clone, Copy)]
enum Length {
    Definite(usize),
    Indefinite,
}

pub struct Decoder<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    /// Fails unless the whole input was consumed.
    pub fn finish(&self) -> Result<()> {
        match self.input.len() - self.offset {
            0 => Ok(()),
            n => Err(Error::TrailingBytes(n)),
        }
    }

    fn peek(&self) -> Result<u8> {
        self.input
            .get(self.offset)
            .copied()
            .ok_or(Error::UnexpectedEnd(self.offset))
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|&end| end <= self.input.len())
            .ok_or(Error::UnexpectedEnd(self.input.len()))?;
        let slice = &self.input[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    /// Reads the initial byte and argument of a data item of the given major
    /// type. Indefinite lengths are reported as `None`.
    fn head(&mut self, major: u8, expected: &'static str) -> Result<Option<u64>> {
        let offset = self.offset;
        let initial = self.peek()?;
        if initial >> 5 != major {
            return Err(Error::Unexpected {
                offset,
                found: initial,
                expected,
            });
        }
        self.offset += 1;
        let arg = match initial & 0x1f {
            v @ 0..=23 => Some(v as u64),
            24 => Some(u8::from_be_bytes(self.take_array()?) as u64),
            25 => Some(u16::from_be_bytes(self.take_array()?) as u64),
            26 => Some(u32::from_be_bytes(self.take_array()?) as u64),
            27 => Some(u64::from_be_bytes(self.take_array()?)),
            31 => None,
            _ => {
                return Err(Error::Unexpected {
                    offset,
                    found: initial,
                    expected,
                })
            }
        };
        Ok(arg)
    }

    fn definite_head(&mut self, major: u8, expected: &'static str) -> Result<u64> {
        let offset = self.offset;
        match self.head(major, expected)? {
            Some(v) => Ok(v),
            None => Err(Error::Unexpected {
                offset,
                found: self.input[offset],
                expected,
            }),
        }
    }

    fn array_head(&mut self) -> Result<Length> {
        match self.head(MAJOR_ARRAY, "array")? {
            Some(n) => usize::try_from(n)
                .map(Length::Definite)
                .map_err(|_| Error::IntegerOverflow("usize")),
            None => Ok(Length::Indefinite),
        }
    }

    fn at_break(&self) -> Result<bool> {
        Ok(self.peek()? == BREAK)
    }

    pub fn u64(&mut self) -> Result<u64> {
        if self.peek()? >> 5 == MAJOR_TAG {
            let offset = self.offset;
            let tag = self.tag()?;
            if tag != TAG_POSITIVE_BIGNUM {
                return Err(Error::Unexpected {
                    offset,
                    found: self.input[offset],
                    expected: "unsigned integer",
                });
            }
            let bytes = self.bytes()?;
            let significant: &[u8] = match bytes.iter().position(|&b| b != 0) {
                Some(start) => &bytes[start..],
                None => &[],
            };
            if significant.len() > 8 {
                return Err(Error::IntegerOverflow("u64"));
            }
            let mut buf = [0u8; 8];
            buf[8 - significant.len()..].copy_from_slice(significant);
            return Ok(u64::from_be_bytes(buf));
        }
        self.definite_head(MAJOR_UNSIGNED, "unsigned integer")
    }

    pub fn u32(&mut self) -> Result<u32> {
        u32::try_from(self.u64()?).map_err(|_| Error::IntegerOverflow("u32"))
    }

    pub fn tag(&mut self) -> Result<u64> {
        self.definite_head(MAJOR_TAG, "tag")
    }

    /// Borrows a definite length byte string from the input.
    pub fn bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.definite_head(MAJOR_BYTES, "byte string")?;
        let len = usize::try_from(len).map_err(|_| Error::IntegerOverflow("usize"))?;
        self.take(len)
    }

    pub fn byte_vec(&mut self) -> Result<Vec<u8>> {
        Ok(self.bytes()?.to_vec())
    }

    pub fn byte_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.bytes()?;
        <[u8; N]>::try_from(bytes).map_err(|_| Error::LengthMismatch {
            expected: N,
            found: bytes.len(),
        })
    }

    /// Decodes a record of exactly `fields` fields using `f`.
    pub fn record<T, F>(&mut self, fields: usize, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let length = self.array_head()?;
        if let Length::Definite(n) = length {
            if n != fields {
                return Err(Error::LengthMismatch {
                    expected: fields,
                    found: n,
                });
            }
        }
        let value = f(self)?;
        if let Length::Indefinite = length {
            let offset = self.offset;
            let found = self.peek()?;
            if found != BREAK {
                return Err(Error::Unexpected {
                    offset,
                    found,
                    expected: "end of record",
                });
            }
            self.offset += 1;
        }
        Ok(value)
    }

    /// Decodes a homogeneous list, calling `f` once per element.
    pub fn list<T, F>(&mut self, mut f: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        let mut items = Vec::new();
        match self.array_head()? {
            Length::Definite(n) => {
                for _ in 0..n {
                    items.push(f(self)?);
                }
            }
            Length::Indefinite => {
                while !self.at_break()? {
                    items.push(f(self)?);
                }
                self.offset += 1;
            }
        }
        Ok(items)
    }
}

impl Decode for u64 {
    fn decode(d: &mut Decoder<'_>) -> Result<Self> {
        d.u64()
    }
}

impl Decode for u32 {
    fn decode(d: &mut Decoder<'_>) -> Result<Self> {
        d.u32()
    }
}
