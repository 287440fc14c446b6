use alloc::vec::Vec;

use super::error::{Error, Result};
use serde::{
    ser::{
        self, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant, SerializeTuple,
        SerializeTupleStruct, SerializeTupleVariant,
    },
    Serialize,
};
use tracing::trace;

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TAG: u8 = 6;

/// Start of an indefinite-length array.
pub const BEGIN_INDEFINITE: u8 = 0x9f;
/// "break" stop code closing an indefinite-length array.
pub const BREAK: u8 = 0xff;

/// Integers with a larger magnitude are always written with the 8 byte head.
///
/// The on-chain encoder represents anything above this bound as an arbitrary
/// precision integer, which ends up as the full 64 bit form. We have to
/// produce the same bytes or signatures will not verify.
pub const WIDE_THRESHOLD: u64 = 1 << 30;

/// Constructor tags of the first seven variants start here.
const CONSTR_TAG_BASE: u64 = 121;
/// Constructor tags of variant 7 and above start here.
const CONSTR_TAG_EXTENDED_BASE: u64 = 1280;
const CONSTR_MAX_INDEX: u32 = 127;

/// Maps an enum variant index to the CBOR tag marking its constructor.
pub fn constructor_tag(index: u32) -> Result<u64> {
    match index {
        0..=6 => Ok(CONSTR_TAG_BASE + index as u64),
        7..=CONSTR_MAX_INDEX => Ok(CONSTR_TAG_EXTENDED_BASE + (index - 7) as u64),
        _ => Err(Error::ConstructorOutOfRange(index)),
    }
}

/// Inverse of [constructor_tag].
pub fn constructor_index(tag: u64) -> Option<u32> {
    match tag {
        121..=127 => Some((tag - CONSTR_TAG_BASE) as u32),
        1280..=1400 => Some((tag - CONSTR_TAG_EXTENDED_BASE) as u32 + 7),
        _ => None,
    }
}

pub trait Writer {
    fn write(&mut self, bytes: &[u8]);
}

impl Writer for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

pub struct Serializer<'a, W>
where
    W: Writer,
{
    writer: &'a mut W,
}

pub fn to_writer<T, W>(value: &T, writer: &mut W) -> Result<()>
where
    T: Serialize + ?Sized,
    W: Writer,
{
    let mut serializer = Serializer { writer };
    value.serialize(&mut serializer)
}

pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::new();
    to_writer(value, &mut buf)?;
    Ok(buf)
}

/// Encodes `value` behind `tag`. This is the message covered by cheque and
/// squash signatures.
pub fn to_tagged_vec<T>(tag: &[u8], value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::from(tag);
    to_writer(value, &mut buf)?;
    Ok(buf)
}

impl<'a, W> Serializer<'a, W>
where
    W: Writer,
{
    fn write_head(&mut self, major: u8, v: u64) {
        let m = major << 5;
        if v < 24 {
            self.writer.write(&[m | v as u8]);
        } else if v <= u8::MAX as u64 {
            self.writer.write(&[m | 24, v as u8]);
        } else if v <= u16::MAX as u64 {
            self.writer.write(&[m | 25]);
            self.writer.write(&(v as u16).to_be_bytes());
        } else if v <= u32::MAX as u64 {
            self.writer.write(&[m | 26]);
            self.writer.write(&(v as u32).to_be_bytes());
        } else {
            self.write_wide(major, v);
        }
    }

    fn write_wide(&mut self, major: u8, v: u64) {
        self.writer.write(&[major << 5 | 27]);
        self.writer.write(&v.to_be_bytes());
    }

    // Integer heads, unlike length and tag heads, switch to the wide form
    // above WIDE_THRESHOLD.
    fn write_integer(&mut self, major: u8, v: u64) {
        if v > WIDE_THRESHOLD {
            self.write_wide(major, v)
        } else {
            self.write_head(major, v)
        }
    }

    fn write_signed(&mut self, v: i64) {
        if v < 0 {
            // -1 - v cannot overflow for negative v.
            self.write_integer(MAJOR_NEGATIVE, (-1 - v) as u64)
        } else {
            self.write_integer(MAJOR_UNSIGNED, v as u64)
        }
    }

    fn write_constructor(&mut self, variant_index: u32) -> Result<()> {
        let tag = constructor_tag(variant_index)?;
        trace!(variant_index, tag, "constructor");
        self.write_head(MAJOR_TAG, tag);
        Ok(())
    }

    fn begin_array(&mut self) {
        self.writer.write(&[BEGIN_INDEFINITE]);
    }

    fn end_array(&mut self) {
        self.writer.write(&[BREAK]);
    }
}

impl<'a, 'b, W> ser::Serializer for &'a mut Serializer<'b, W>
where
    W: Writer,
{
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, v: bool) -> Result<()> {
        // False and True are the first two constructors without fields.
        self.serialize_unit_variant("bool", v as u32, "")
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.write_signed(v as i64);
        Ok(())
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.write_signed(v as i64);
        Ok(())
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.write_signed(v as i64);
        Ok(())
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.write_signed(v);
        Ok(())
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        let v = i64::try_from(v).map_err(|_| Error::IntegerOverflow("i64"))?;
        self.serialize_i64(v)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.write_integer(MAJOR_UNSIGNED, v);
        Ok(())
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        let v = u64::try_from(v).map_err(|_| Error::IntegerOverflow("u64"))?;
        self.serialize_u64(v)
    }

    fn serialize_f32(self, _: f32) -> Result<()> {
        Err(Error::TypeNotRepresentable("f32"))
    }

    fn serialize_f64(self, _: f64) -> Result<()> {
        Err(Error::TypeNotRepresentable("f64"))
    }

    fn serialize_char(self, _: char) -> Result<()> {
        Err(Error::TypeNotYetSupported("char"))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        // There are no text strings on-chain, only bytes.
        self.serialize_bytes(v.as_bytes())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.write_head(MAJOR_BYTES, v.len() as u64);
        self.writer.write(v);
        Ok(())
    }

    fn serialize_none(self) -> Result<()> {
        Err(Error::TypeNotRepresentable("Option"))
    }

    fn serialize_some<T: ?Sized>(self, _: &T) -> Result<()>
    where
        T: Serialize,
    {
        Err(Error::TypeNotRepresentable("Option"))
    }

    fn serialize_unit(self) -> Result<()> {
        Err(Error::TypeNotRepresentable("()"))
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<()> {
        self.begin_array();
        self.end_array();
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        variant_index: u32,
        _: &'static str,
    ) -> Result<()> {
        self.write_constructor(variant_index)?;
        self.begin_array();
        self.end_array();
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized>(self, _: &'static str, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        value.serialize(self)
    }

    // The tag is directly followed by the inner value, which is how
    // MixedCheque wraps its Cheque or Unlocked record.
    fn serialize_newtype_variant<T: ?Sized>(
        self,
        _: &'static str,
        variant_index: u32,
        _: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: Serialize,
    {
        self.write_constructor(variant_index)?;
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq> {
        self.begin_array();
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple> {
        self.begin_array();
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.begin_array();
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        variant_index: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        self.write_constructor(variant_index)?;
        self.begin_array();
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::TypeNotRepresentable("map"))
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self::SerializeStruct> {
        self.begin_array();
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        variant_index: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant> {
        self.write_constructor(variant_index)?;
        self.begin_array();
        Ok(self)
    }

    fn collect_str<T: ?Sized>(self, _value: &T) -> Result<()>
    where
        T: core::fmt::Display,
    {
        Err(Error::TypeNotYetSupported("collect_str"))
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

impl<'a, 'b, W> SerializeSeq for &'a mut Serializer<'b, W>
where
    W: Writer,
{
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        self.end_array();
        Ok(())
    }
}

impl<'a, 'b, W> SerializeTuple for &'a mut Serializer<'b, W>
where
    W: Writer,
{
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        self.end_array();
        Ok(())
    }
}

impl<'a, 'b, W> SerializeTupleStruct for &'a mut Serializer<'b, W>
where
    W: Writer,
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        self.end_array();
        Ok(())
    }
}

impl<'a, 'b, W> SerializeTupleVariant for &'a mut Serializer<'b, W>
where
    W: Writer,
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        self.end_array();
        Ok(())
    }
}

impl<'a, 'b, W> SerializeMap for &'a mut Serializer<'b, W>
where
    W: Writer,
{
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: ?Sized>(&mut self, _key: &T) -> Result<()>
    where
        T: Serialize,
    {
        Err(Error::TypeNotRepresentable("map"))
    }

    fn serialize_value<T: ?Sized>(&mut self, _value: &T) -> Result<()>
    where
        T: Serialize,
    {
        Err(Error::TypeNotRepresentable("map"))
    }

    fn end(self) -> Result<()> {
        Err(Error::TypeNotRepresentable("map"))
    }
}

impl<'a, 'b, W> SerializeStruct for &'a mut Serializer<'b, W>
where
    W: Writer,
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, _key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        self.end_array();
        Ok(())
    }
}

impl<'a, 'b, W> SerializeStructVariant for &'a mut Serializer<'b, W>
where
    W: Writer,
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, _key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        self.end_array();
        Ok(())
    }
}
