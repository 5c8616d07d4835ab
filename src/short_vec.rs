//! Compact `u16` length encoding ("short_vec").
//!
//! Transaction messages prefix their account and instruction lists with a
//! 1–3 byte little-endian base-128 varint instead of a fixed-width length.
//! Each byte carries 7 value bits; the high bit says another byte follows.
//! The third byte may only carry the remaining 2 bits and never continues.
//!
//! Exactly one encoding is valid per value. A zero byte anywhere but the
//! first position would mean the value fit in fewer bytes, so it is rejected
//! as an [`Alias`](ShortU16Error::Alias).
//!
//! | value   | bytes              |
//! |---------|--------------------|
//! | 0       | `00`               |
//! | 127     | `7f`               |
//! | 128     | `80 01`            |
//! | 16383   | `ff 7f`            |
//! | 16384   | `80 80 01`         |
//! | 65535   | `ff ff 03`         |
//!
//! # Usage
//!
//! Annotate a `Vec<T>` field with `#[serde(with = "chain_codec::short_vec")]`:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use chain_codec::bincode;
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct CompiledInstruction {
//!     program_id_index: u8,
//!     #[serde(with = "chain_codec::short_vec")]
//!     accounts: Vec<u8>,
//!     #[serde(with = "chain_codec::short_vec")]
//!     data: Vec<u8>,
//! }
//!
//! let ix = CompiledInstruction { program_id_index: 2, accounts: vec![0, 1], data: vec![9] };
//! let bytes = bincode::to_vec(&ix).unwrap();
//! assert_eq!(bytes, [2, 2, 0, 1, 1, 9]);
//! assert_eq!(bincode::from_slice_exact::<CompiledInstruction>(&bytes).unwrap(), ix);
//! ```

use crate::error::ShortU16Error;
use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{self, Serialize, SerializeTuple, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

/// Longest valid encoding, in bytes.
pub const MAX_ENCODING_LENGTH: usize = 3;

/// Newtype name our deserializer recognizes to decode a [`ShortU16`] in one
/// step with typed errors. Other deserializers see a plain tuple of bytes.
pub(crate) const SHORT_U16_TOKEN: &str = "$chain_codec::private::ShortU16";

const DATA_BITS_PER_BYTE: usize = 7;
const DATA_BITS_MASK: u8 = 0x7F;
const CONTINUATION_BIT_MASK: u8 = 0x80;

/// The 1–3 byte encoding of a `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    bytes: [u8; MAX_ENCODING_LENGTH],
    len: usize,
}

impl Deref for Encoded {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl AsRef<[u8]> for Encoded {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

/// Encode `value` in its canonical (shortest) form.
pub fn encode(value: u16) -> Encoded {
    let mut bytes = [0u8; MAX_ENCODING_LENGTH];
    let mut len = 0;
    let mut rem = value;
    loop {
        let elem = (rem as u8) & DATA_BITS_MASK;
        rem >>= DATA_BITS_PER_BYTE;
        if rem == 0 {
            bytes[len] = elem;
            len += 1;
            break;
        }
        bytes[len] = elem | CONTINUATION_BIT_MASK;
        len += 1;
    }
    Encoded { bytes, len }
}

/// Decode a value from the front of `bytes`, returning it together with the
/// number of bytes consumed.
pub fn decode(bytes: &[u8]) -> Result<(u16, usize), ShortU16Error> {
    let mut val = 0;
    for nth_byte in 0..MAX_ENCODING_LENGTH {
        let elem = *bytes.get(nth_byte).ok_or(ShortU16Error::TooShort)?;
        match visit_byte(elem, val, nth_byte)? {
            VisitStatus::Done(v) => return Ok((v, nth_byte + 1)),
            VisitStatus::More(v) => val = v,
        }
    }
    Err(ShortU16Error::ByteThreeContinues)
}

enum VisitStatus {
    Done(u16),
    More(u16),
}

/// Fold the `nth_byte` of an encoding into the running value.
fn visit_byte(elem: u8, val: u16, nth_byte: usize) -> Result<VisitStatus, ShortU16Error> {
    if elem == 0 && nth_byte != 0 {
        return Err(ShortU16Error::Alias);
    }
    if nth_byte >= MAX_ENCODING_LENGTH {
        return Err(ShortU16Error::TooLong);
    }
    let done = elem & CONTINUATION_BIT_MASK == 0;
    if nth_byte == MAX_ENCODING_LENGTH - 1 && !done {
        return Err(ShortU16Error::ByteThreeContinues);
    }

    let shift = nth_byte * DATA_BITS_PER_BYTE;
    let combined = u32::from(val) | (u32::from(elem & DATA_BITS_MASK) << shift);
    let val = u16::try_from(combined).map_err(|_| ShortU16Error::Overflow)?;
    Ok(if done {
        VisitStatus::Done(val)
    } else {
        VisitStatus::More(val)
    })
}

// ── ShortU16 ───────────────────────────────────────────────────────────────

/// A `u16` that serializes in the compact form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortU16(pub u16);

/// Raw bytes written as a prefix-less tuple of `u8`.
struct RawBytes<'a>(&'a [u8]);

impl Serialize for RawBytes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_tuple(self.0.len())?;
        for byte in self.0 {
            seq.serialize_element(byte)?;
        }
        seq.end()
    }
}

impl Serialize for ShortU16 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(SHORT_U16_TOKEN, &RawBytes(&encode(self.0)))
    }
}

struct ShortU16Visitor;

impl<'de> Visitor<'de> for ShortU16Visitor {
    type Value = ShortU16;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a compact u16 encoding of 1 to 3 bytes")
    }

    /// Our own deserializer has already decoded the value.
    fn visit_u16<E: de::Error>(self, v: u16) -> Result<ShortU16, E> {
        Ok(ShortU16(v))
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(self, de: D) -> Result<ShortU16, D::Error> {
        de.deserialize_tuple(MAX_ENCODING_LENGTH, self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ShortU16, A::Error> {
        let mut val = 0;
        for nth_byte in 0..MAX_ENCODING_LENGTH {
            let elem: u8 = seq
                .next_element()?
                .ok_or_else(|| de::Error::custom(ShortU16Error::TooShort))?;
            match visit_byte(elem, val, nth_byte).map_err(de::Error::custom)? {
                VisitStatus::Done(v) => return Ok(ShortU16(v)),
                VisitStatus::More(v) => val = v,
            }
        }
        Err(de::Error::custom(ShortU16Error::TooLong))
    }
}

impl<'de> Deserialize<'de> for ShortU16 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_newtype_struct(SHORT_U16_TOKEN, ShortU16Visitor)
    }
}

// ── serde `with` module functions ─────────────────────────────────────────

/// Serialize `elements` as a compact length followed by each element.
pub fn serialize<S: Serializer, T: Serialize>(
    elements: &[T],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let len = u16::try_from(elements.len())
        .map_err(|_| ser::Error::custom(ShortU16Error::Overflow))?;
    let mut seq = serializer.serialize_tuple(1 + elements.len())?;
    seq.serialize_element(&ShortU16(len))?;
    for element in elements {
        seq.serialize_element(element)?;
    }
    seq.end()
}

/// Deserialize a compact length followed by that many elements.
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    deserializer.deserialize_tuple(usize::MAX, ShortVecVisitor(PhantomData))
}

struct ShortVecVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for ShortVecVisitor<T> {
    type Value = Vec<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a vec with a compact u16 length prefix")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<T>, A::Error> {
        let ShortU16(len) = seq
            .next_element::<ShortU16>()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let len = usize::from(len);
        let mut out = Vec::with_capacity(len.min(seq.size_hint().unwrap_or(0)));
        for i in 0..len {
            let element = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i + 1, &self))?;
            out.push(element);
        }
        Ok(out)
    }
}

/// A `Vec<T>` that serializes with a compact length prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortVec<T>(pub Vec<T>);

impl<T: Serialize> Serialize for ShortVec<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize(&self.0, serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ShortVec<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize(deserializer).map(ShortVec)
    }
}
