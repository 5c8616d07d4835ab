use serde::{de, ser};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the compact `short_vec` length codec.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortU16Error {
    /// A fourth byte would be needed
    #[error("short_u16 encoding is longer than 3 bytes")]
    TooLong,

    /// Input ended while the continuation bit was still set
    #[error("short_u16 encoding ended before its final byte")]
    TooShort,

    /// The accumulated value does not fit in a u16
    #[error("short_u16 value overflows u16")]
    Overflow,

    /// A zero byte after the first position: a non-canonical encoding
    #[error("short_u16 encoding is an alias of a shorter encoding")]
    Alias,

    /// The third byte had its continuation bit set
    #[error("third byte of short_u16 encoding has the continuation bit set")]
    ByteThreeContinues,
}

/// Errors that can occur during serialization or deserialization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A custom error message from serde
    #[error("{0}")]
    Message(String),

    /// Attempted to read past the end of the input buffer
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    /// The destination buffer cannot hold the next chunk of output
    #[error("buffer too small: {requested} bytes requested at offset {offset}, capacity {capacity}")]
    BufferTooSmall {
        offset: usize,
        requested: usize,
        capacity: usize,
    },

    /// An exact deserialization left unconsumed bytes behind
    #[error("{0} bytes of extra data after deserialization")]
    ExtraDataAfterDeserialize(usize),

    /// The boolean encoding was neither 0 nor 1
    #[error("invalid boolean encoding: {0} (must be 0 or 1)")]
    InvalidBool(u8),

    /// An optional value had an invalid presence tag (must be 0 or 1)
    #[error("invalid option tag: {0} (must be 0 or 1)")]
    InvalidOptionTag(u8),

    /// The discriminant does not name a declared variant, or does not fit the tag width
    #[error("invalid enum tag: {0}")]
    InvalidEnumTag(u32),

    /// A string was not valid UTF-8
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// A char was not a valid UTF-8 encoded scalar value
    #[error("invalid char encoding")]
    InvalidChar,

    /// A float NaN was encountered under a format that rejects it
    #[error("NaN is not allowed by this format")]
    NanNotAllowed,

    /// A sequence length does not fit the length prefix or the configured limit
    #[error("length {len} exceeds maximum {max}")]
    LengthOverflow { len: u64, max: u64 },

    /// A sequence or map produced a different number of elements than it declared
    #[error("sequence declared {expected} elements but produced {actual}")]
    SequenceLengthMismatch { expected: usize, actual: usize },

    /// A sequence or map length was not known ahead of time
    #[error("sequence length must be known before serialization")]
    LengthRequired,

    /// The encoded size of a value does not fit in `usize`
    #[error("encoded size overflows usize: {total} bytes counted, {requested} more requested")]
    SizeOverflow { total: usize, requested: usize },

    /// The format does not support this serde data model type
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    /// The compact length codec rejected its input
    #[error(transparent)]
    ShortU16(#[from] ShortU16Error),
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
