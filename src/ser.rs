//! Serializer shared by both wire formats.
//!
//! The [`Serializer`] is generic over any [`Writer`] sink: a growable
//! `Vec<u8>`, a bounded [`SliceWriter`], or a [`SizeCounter`] that only
//! measures.
//!
//! ## Wire format summary
//! - Integers and floats: little-endian, fixed width
//! - Bool: 1 byte, 0 or 1
//! - Options: 1-byte presence tag (0=None, 1=Some) + optional value
//! - Sequences, strings, bytes, maps: length prefix of the configured width + elements
//! - Tuples, arrays, structs: fields encoded consecutively, no prefix
//! - Enums: discriminant of the configured width (variant index) + payload

use crate::config::{Config, LengthPrefix, TagWidth};
use crate::cursor::{SizeCounter, SliceWriter, Writer};
use crate::error::{Error, Result};
use serde::ser::{self, Serialize};
use tracing::{debug, trace};

// ── Public entry points ────────────────────────────────────────────────────

/// Serialize `value` into a `Vec<u8>` sized exactly to the encoding.
pub fn to_vec<T: Serialize + ?Sized>(value: &T, config: Config) -> Result<Vec<u8>> {
    let size = serialized_size(value, config)?;
    let mut ser = Serializer::new(Vec::with_capacity(size), config);
    value.serialize(&mut ser)?;
    Ok(ser.into_writer())
}

/// Serialize `value` into `buf`, returning the number of bytes written.
///
/// Fails with [`Error::BufferTooSmall`] as soon as a write would cross the
/// end of `buf`; bytes before that point have been written.
pub fn to_slice<T: Serialize + ?Sized>(value: &T, config: Config, buf: &mut [u8]) -> Result<usize> {
    let mut ser = Serializer::new(SliceWriter::new(buf), config);
    if let Err(err) = value.serialize(&mut ser) {
        if let Error::BufferTooSmall { offset, requested, capacity } = err {
            debug!(offset, requested, capacity, "destination buffer exhausted");
        }
        return Err(err);
    }
    Ok(ser.into_writer().position())
}

/// Compute the exact number of bytes `value` encodes to under `config`.
///
/// Runs the same traversal as [`to_vec`], so the same validation errors
/// (NaN, length overflow, tag overflow) are reported.
pub fn serialized_size<T: Serialize + ?Sized>(value: &T, config: Config) -> Result<usize> {
    let mut ser = Serializer::new(SizeCounter::new(), config);
    value.serialize(&mut ser)?;
    Ok(ser.into_writer().total())
}

// ── Serializer ─────────────────────────────────────────────────────────────

/// The serializer. Generic over any `W: Writer`.
///
/// ```rust
/// use chain_codec::{Config, ser::Serializer};
/// use serde::Serialize;
///
/// let mut buf = Vec::new();
/// let mut ser = Serializer::new(&mut buf, Config::BINCODE);
/// vec![7u8].serialize(&mut ser).unwrap();
/// assert_eq!(buf, [1, 0, 0, 0, 0, 0, 0, 0, 7]);
/// ```
pub struct Serializer<W: Writer> {
    writer: W,
    config: Config,
}

impl<W: Writer> Serializer<W> {
    pub fn new(writer: W, config: Config) -> Self {
        Serializer { writer, config }
    }

    /// Consume the serializer and return the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    pub fn config(&self) -> Config {
        self.config
    }

    // ── Internal helpers ───────────────────────────────────────────────────

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)
    }

    /// Length prefix of the configured width.
    fn write_length(&mut self, len: usize) -> Result<()> {
        let len = len as u64;
        let max = self.config.len_limit();
        if len > max {
            return Err(Error::LengthOverflow { len, max });
        }
        match self.config.length_prefix() {
            LengthPrefix::U32 => self.write_all(&(len as u32).to_le_bytes()),
            LengthPrefix::U64 => self.write_all(&len.to_le_bytes()),
        }
    }

    /// Enum discriminant of the configured width.
    fn write_tag(&mut self, variant_index: u32) -> Result<()> {
        match self.config.tag_width() {
            TagWidth::U8 => {
                let tag = u8::try_from(variant_index)
                    .map_err(|_| Error::InvalidEnumTag(variant_index))?;
                self.write_all(&[tag])
            }
            TagWidth::U32 => self.write_all(&variant_index.to_le_bytes()),
        }
    }

    fn check_nan(&self, is_nan: bool) -> Result<()> {
        if is_nan && !self.config.allow_nan() {
            trace!("rejecting NaN float");
            return Err(Error::NanNotAllowed);
        }
        Ok(())
    }

    /// Sequence / string / bytes body: prefix + raw bytes.
    fn write_prefixed_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_length(bytes.len())?;
        self.write_all(bytes)
    }
}

// ── serde::Serializer impl ─────────────────────────────────────────────────

impl<'a, W: Writer> ser::Serializer for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = CountedSerializer<'a, W>;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = CountedSerializer<'a, W>;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn is_human_readable(&self) -> bool {
        false
    }

    // ── Primitives ─────────────────────────────────────────────────────────

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.write_all(&[v as u8])
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }
    fn serialize_i16(self, v: i16) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }
    fn serialize_i32(self, v: i32) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }
    fn serialize_i64(self, v: i64) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }
    fn serialize_i128(self, v: i128) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.write_all(&[v])
    }
    fn serialize_u16(self, v: u16) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }
    fn serialize_u32(self, v: u32) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }
    fn serialize_u64(self, v: u64) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }
    fn serialize_u128(self, v: u128) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.check_nan(v.is_nan())?;
        self.write_all(&v.to_le_bytes())
    }
    fn serialize_f64(self, v: f64) -> Result<()> {
        self.check_nan(v.is_nan())?;
        self.write_all(&v.to_le_bytes())
    }

    /// char → its UTF-8 bytes, no prefix
    fn serialize_char(self, v: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.write_all(v.encode_utf8(&mut buf).as_bytes())
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.write_prefixed_bytes(v.as_bytes())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.write_prefixed_bytes(v)
    }

    fn serialize_none(self) -> Result<()> {
        self.write_all(&[0])
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        self.write_all(&[1])?;
        value.serialize(self)
    }

    /// Unit and unit structs occupy zero bytes
    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
    ) -> Result<()> {
        self.write_tag(variant_index)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<()> {
        self.write_tag(variant_index)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        let len = len.ok_or(Error::LengthRequired)?;
        self.write_length(len)?;
        Ok(CountedSerializer::new(self, len))
    }

    /// Fixed-length array / tuple — elements without a length prefix
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(self)
    }
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        self.write_tag(variant_index)?;
        Ok(self)
    }

    /// Map → pair count prefix + alternating key/value pairs
    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        let len = len.ok_or(Error::LengthRequired)?;
        self.write_length(len)?;
        Ok(CountedSerializer::new(self, len))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        self.write_tag(variant_index)?;
        Ok(self)
    }
}

// ── Compound serializer impls ──────────────────────────────────────────────

macro_rules! forward_serialize_element {
    ($t:ty) => {
        impl<'a, W: Writer> $t for &'a mut Serializer<W> {
            type Ok = ();
            type Error = Error;
            fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
                value.serialize(&mut **self)
            }
            fn end(self) -> Result<()> {
                Ok(())
            }
        }
    };
}

macro_rules! forward_serialize_field {
    ($t:ty) => {
        impl<'a, W: Writer> $t for &'a mut Serializer<W> {
            type Ok = ();
            type Error = Error;
            fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
                value.serialize(&mut **self)
            }
            fn end(self) -> Result<()> {
                Ok(())
            }
        }
    };
}

macro_rules! forward_serialize_named_field {
    ($t:ty) => {
        impl<'a, W: Writer> $t for &'a mut Serializer<W> {
            type Ok = ();
            type Error = Error;
            fn serialize_field<T: Serialize + ?Sized>(
                &mut self,
                _key: &'static str,
                value: &T,
            ) -> Result<()> {
                value.serialize(&mut **self)
            }
            fn end(self) -> Result<()> {
                Ok(())
            }
        }
    };
}

forward_serialize_element!(ser::SerializeTuple);
forward_serialize_field!(ser::SerializeTupleStruct);
forward_serialize_field!(ser::SerializeTupleVariant);
forward_serialize_named_field!(ser::SerializeStruct);
forward_serialize_named_field!(ser::SerializeStructVariant);

// ── CountedSerializer ──────────────────────────────────────────────────────
//
// Sequences and maps commit to a length prefix before their elements are
// written; this wrapper checks that the elements actually produced match it.

pub struct CountedSerializer<'a, W: Writer> {
    ser: &'a mut Serializer<W>,
    expected: usize,
    actual: usize,
}

impl<'a, W: Writer> CountedSerializer<'a, W> {
    fn new(ser: &'a mut Serializer<W>, expected: usize) -> Self {
        CountedSerializer {
            ser,
            expected,
            actual: 0,
        }
    }

    fn finish(self) -> Result<()> {
        if self.actual != self.expected {
            return Err(Error::SequenceLengthMismatch {
                expected: self.expected,
                actual: self.actual,
            });
        }
        Ok(())
    }
}

impl<W: Writer> ser::SerializeSeq for CountedSerializer<'_, W> {
    type Ok = ();
    type Error = Error;
    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.actual += 1;
        value.serialize(&mut *self.ser)
    }
    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<W: Writer> ser::SerializeMap for CountedSerializer<'_, W> {
    type Ok = ();
    type Error = Error;
    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.actual += 1;
        key.serialize(&mut *self.ser)
    }
    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut *self.ser)
    }
    fn end(self) -> Result<()> {
        self.finish()
    }
}
