//! Deserializer shared by both wire formats.

use crate::config::{Config, LengthPrefix, TagWidth};
use crate::cursor::SliceReader;
use crate::error::{Error, Result};
use crate::short_vec;
use serde::de::{self, Deserialize, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};
use tracing::{debug, trace};

/// Deserialize a value from the front of `input`. Returns the value and the
/// number of bytes consumed; trailing bytes are left alone.
pub fn from_slice<'de, T: Deserialize<'de>>(input: &'de [u8], config: Config) -> Result<(T, usize)> {
    let mut de = Deserializer::new(input, config);
    let value = T::deserialize(&mut de)?;
    Ok((value, de.position()))
}

/// Deserialize a value that must occupy all of `input`.
pub fn from_slice_exact<'de, T: Deserialize<'de>>(input: &'de [u8], config: Config) -> Result<T> {
    let (value, consumed) = from_slice(input, config)?;
    let extra = input.len() - consumed;
    if extra != 0 {
        debug!(consumed, extra, "trailing bytes after exact deserialization");
        return Err(Error::ExtraDataAfterDeserialize(extra));
    }
    Ok(value)
}

/// The deserializer. Reads from a byte slice through a bounded cursor.
pub struct Deserializer<'de> {
    reader: SliceReader<'de>,
    config: Config,
}

impl<'de> Deserializer<'de> {
    pub fn new(input: &'de [u8], config: Config) -> Self {
        Deserializer {
            reader: SliceReader::new(input),
            config,
        }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Returns the unconsumed portion of the input buffer.
    pub fn remaining(&self) -> &'de [u8] {
        self.reader.remaining()
    }

    /// Read a length prefix of the configured width and check it against
    /// the configured limit.
    fn read_length(&mut self) -> Result<usize> {
        let len = match self.config.length_prefix() {
            LengthPrefix::U32 => u32::from_le_bytes(self.reader.read_array()?) as u64,
            LengthPrefix::U64 => u64::from_le_bytes(self.reader.read_array()?),
        };
        let max = self.config.len_limit().min(usize::MAX as u64);
        if len > max {
            return Err(Error::LengthOverflow { len, max });
        }
        Ok(len as usize)
    }

    /// Read an enum discriminant of the configured width.
    fn read_tag(&mut self) -> Result<u32> {
        Ok(match self.config.tag_width() {
            TagWidth::U8 => self.reader.read_u8()? as u32,
            TagWidth::U32 => u32::from_le_bytes(self.reader.read_array()?),
        })
    }

    fn check_nan(&self, is_nan: bool) -> Result<()> {
        if is_nan && !self.config.allow_nan() {
            trace!(position = self.position(), "rejecting decoded NaN float");
            return Err(Error::NanNotAllowed);
        }
        Ok(())
    }

    /// After an element of a length-prefixed collection that consumed no
    /// input, the elements still declared must not outnumber the unread bytes.
    fn check_progress(&self, start: usize, declared: usize, left: usize) -> Result<()> {
        let unread = self.reader.remaining().len();
        if self.position() == start && left > unread {
            debug!(declared, left, unread, "zero-sized elements exceed remaining input");
            return Err(Error::LengthOverflow {
                len: declared as u64,
                max: unread as u64,
            });
        }
        Ok(())
    }

    fn read_prefixed_bytes(&mut self) -> Result<&'de [u8]> {
        let len = self.read_length()?;
        self.reader.take(len)
    }

    fn read_str(&mut self) -> Result<&'de str> {
        let bytes = self.read_prefixed_bytes()?;
        std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
    }

    /// A char is its UTF-8 encoding; the lead byte determines the width.
    fn read_char(&mut self) -> Result<char> {
        let mut buf = [0u8; 4];
        buf[0] = self.reader.read_u8()?;
        let width = match buf[0] {
            0x00..=0x7F => 1,
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Err(Error::InvalidChar),
        };
        buf[1..width].copy_from_slice(self.reader.take(width - 1)?);
        std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or(Error::InvalidChar)
    }
}

macro_rules! impl_deserialize_le {
    ($method:ident, $visit:ident, $ty:ty) => {
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            visitor.$visit(<$ty>::from_le_bytes(self.reader.read_array()?))
        }
    };
}

// ── Main Deserializer impl ─────────────────────────────────────────────────

impl<'de> de::Deserializer<'de> for &mut Deserializer<'de> {
    type Error = Error;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::Unsupported(
            "deserialize_any (format is not self-describing)",
        ))
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.reader.read_u8()? {
            0 => visitor.visit_bool(false),
            1 => visitor.visit_bool(true),
            v => Err(Error::InvalidBool(v)),
        }
    }

    impl_deserialize_le!(deserialize_i8, visit_i8, i8);
    impl_deserialize_le!(deserialize_i16, visit_i16, i16);
    impl_deserialize_le!(deserialize_i32, visit_i32, i32);
    impl_deserialize_le!(deserialize_i64, visit_i64, i64);
    impl_deserialize_le!(deserialize_i128, visit_i128, i128);
    impl_deserialize_le!(deserialize_u8, visit_u8, u8);
    impl_deserialize_le!(deserialize_u16, visit_u16, u16);
    impl_deserialize_le!(deserialize_u32, visit_u32, u32);
    impl_deserialize_le!(deserialize_u64, visit_u64, u64);
    impl_deserialize_le!(deserialize_u128, visit_u128, u128);

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let v = f32::from_le_bytes(self.reader.read_array()?);
        self.check_nan(v.is_nan())?;
        visitor.visit_f32(v)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let v = f64::from_le_bytes(self.reader.read_array()?);
        self.check_nan(v.is_nan())?;
        visitor.visit_f64(v)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_char(self.read_char()?)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_borrowed_str(self.read_str()?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_str(self, visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_borrowed_bytes(self.read_prefixed_bytes()?)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_bytes(self, visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.reader.read_u8()? {
            0 => visitor.visit_none(),
            1 => visitor.visit_some(self),
            v => Err(Error::InvalidOptionTag(v)),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        if name == short_vec::SHORT_U16_TOKEN {
            // Decode the compact length directly so its errors stay typed.
            let (value, consumed) = short_vec::decode(self.reader.remaining())?;
            self.reader.take(consumed)?;
            visitor.visit_u16(value)
        } else {
            visitor.visit_newtype_struct(self)
        }
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let count = self.read_length()?;
        visitor.visit_seq(SeqDeserializer::prefixed(self, count))
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        // Fixed-length: no count prefix
        visitor.visit_seq(SeqDeserializer::new(self, len))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_seq(SeqDeserializer::new(self, len))
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let count = self.read_length()?;
        visitor.visit_map(MapDeserializer::new(self, count))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        // Fields in declared order, no count prefix
        visitor.visit_seq(SeqDeserializer::new(self, fields.len()))
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_enum(EnumDeserializer::new(self, variants.len()))
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::Unsupported(
            "deserialize_identifier (variants are decoded by index)",
        ))
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::Unsupported(
            "deserialize_ignored_any (format is not self-describing)",
        ))
    }
}

// ── SeqDeserializer: fixed count ───────────────────────────────────────────

struct SeqDeserializer<'a, 'de: 'a> {
    de: &'a mut Deserializer<'de>,
    remaining: usize,
    /// Count read from a length prefix; `None` when the type fixes it.
    declared: Option<usize>,
}

impl<'a, 'de> SeqDeserializer<'a, 'de> {
    fn new(de: &'a mut Deserializer<'de>, count: usize) -> Self {
        SeqDeserializer {
            de,
            remaining: count,
            declared: None,
        }
    }

    fn prefixed(de: &'a mut Deserializer<'de>, count: usize) -> Self {
        SeqDeserializer {
            de,
            remaining: count,
            declared: Some(count),
        }
    }
}

impl<'de> SeqAccess<'de> for SeqDeserializer<'_, 'de> {
    type Error = Error;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        let start = self.de.position();
        let value = seed.deserialize(&mut *self.de)?;
        if let Some(declared) = self.declared {
            self.de.check_progress(start, declared, self.remaining)?;
        }
        Ok(Some(value))
    }

    fn size_hint(&self) -> Option<usize> {
        // Never hint more elements than there are input bytes left.
        Some(self.remaining.min(self.de.remaining().len()))
    }
}

// ── MapDeserializer ────────────────────────────────────────────────────────

struct MapDeserializer<'a, 'de: 'a> {
    de: &'a mut Deserializer<'de>,
    remaining: usize,
    declared: usize,
    entry_start: usize,
}

impl<'a, 'de> MapDeserializer<'a, 'de> {
    fn new(de: &'a mut Deserializer<'de>, count: usize) -> Self {
        let entry_start = de.position();
        MapDeserializer {
            de,
            remaining: count,
            declared: count,
            entry_start,
        }
    }
}

impl<'de> MapAccess<'de> for MapDeserializer<'_, 'de> {
    type Error = Error;

    fn next_key_seed<K: de::DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        self.entry_start = self.de.position();
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn next_value_seed<V: de::DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let value = seed.deserialize(&mut *self.de)?;
        self.de.check_progress(self.entry_start, self.declared, self.remaining)?;
        Ok(value)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining.min(self.de.remaining().len()))
    }
}

// ── EnumDeserializer ───────────────────────────────────────────────────────

struct EnumDeserializer<'a, 'de: 'a> {
    de: &'a mut Deserializer<'de>,
    variant_count: usize,
}

impl<'a, 'de> EnumDeserializer<'a, 'de> {
    fn new(de: &'a mut Deserializer<'de>, variant_count: usize) -> Self {
        EnumDeserializer { de, variant_count }
    }
}

impl<'de, 'a> EnumAccess<'de> for EnumDeserializer<'a, 'de> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: de::DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant)> {
        let variant_index = self.de.read_tag()?;
        if variant_index as usize >= self.variant_count {
            return Err(Error::InvalidEnumTag(variant_index));
        }
        let val = seed.deserialize(de::value::U32Deserializer::<Error>::new(variant_index))?;
        Ok((val, self))
    }
}

impl<'de> VariantAccess<'de> for EnumDeserializer<'_, 'de> {
    type Error = Error;

    /// Unit variant — no data follows the discriminant
    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T: de::DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(self.de)
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        visitor.visit_seq(SeqDeserializer::new(self.de, len))
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_seq(SeqDeserializer::new(self.de, fields.len()))
    }
}
