//! # chain-codec
//!
//! Byte-exact implementations of the two binary encodings a blockchain
//! runtime uses for accounts and instructions, plus the compact `short_vec`
//! length used inside transaction messages, all built on `serde`.
//!
//! ## Overview
//!
//! One serializer and one deserializer walk any `serde` type. A [`Config`]
//! supplies the only things that differ between the formats:
//!
//! | Construct | [`borsh`] | [`bincode`] |
//! |-----------|-----------|-------------|
//! | integer / float | little-endian, fixed width | little-endian, fixed width |
//! | `bool` | 1 byte (0/1) | 1 byte (0/1) |
//! | `Option<T>` | 1-byte tag + payload | 1-byte tag + payload |
//! | tuple, `[T; N]`, struct | fields in order, no prefix | fields in order, no prefix |
//! | `Vec<T>`, `String`, bytes, map | 4-byte length prefix | 8-byte length prefix |
//! | enum discriminant | 1 byte | 4 bytes |
//! | NaN | rejected (encode and decode) | accepted |
//!
//! `()` and unit structs encode to zero bytes, newtype structs are
//! transparent and `char` is written as its UTF-8 bytes.
//!
//! ## Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use chain_codec::{bincode, borsh};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! enum Instruction {
//!     Initialize,
//!     Transfer { lamports: u64 },
//!     Memo(String),
//! }
//!
//! let ix = Instruction::Transfer { lamports: 1_000_000_000 };
//!
//! let a = borsh::to_vec(&ix).unwrap();
//! assert_eq!(a, [1, 0, 202, 154, 59, 0, 0, 0, 0]);
//!
//! let b = bincode::to_vec(&ix).unwrap();
//! assert_eq!(b, [1, 0, 0, 0, 0, 202, 154, 59, 0, 0, 0, 0]);
//!
//! assert_eq!(borsh::from_slice_exact::<Instruction>(&a).unwrap(), ix);
//! assert_eq!(bincode::serialized_size(&ix).unwrap(), b.len());
//! ```

pub mod config;
pub mod cursor;
pub mod de;
pub mod error;
pub mod fixed_bytes;
pub mod ser;
pub mod short_vec;

pub use config::{Config, LengthPrefix, TagWidth};
pub use de::{Deserializer, from_slice, from_slice_exact};
pub use error::{Error, Result, ShortU16Error};
pub use ser::{Serializer, serialized_size, to_slice, to_vec};

pub use serde::{Deserialize, Serialize};

/// Entry points with a fixed rule set.
macro_rules! format_entry_points {
    ($config:expr) => {
        use crate::{Config, Result};
        use serde::{Deserialize, Serialize};

        /// The rule set every function in this module uses.
        pub const CONFIG: Config = $config;

        /// Serialize `value` into a `Vec<u8>` of exactly
        /// [`serialized_size`] bytes.
        pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
            crate::ser::to_vec(value, CONFIG)
        }

        /// Serialize `value` into `buf`, returning the number of bytes written.
        pub fn to_slice<T: Serialize + ?Sized>(value: &T, buf: &mut [u8]) -> Result<usize> {
            crate::ser::to_slice(value, CONFIG, buf)
        }

        /// Exact encoded size of `value`.
        pub fn serialized_size<T: Serialize + ?Sized>(value: &T) -> Result<usize> {
            crate::ser::serialized_size(value, CONFIG)
        }

        /// Deserialize from the front of `input`, returning the value and the
        /// number of bytes read.
        pub fn from_slice<'de, T: Deserialize<'de>>(input: &'de [u8]) -> Result<(T, usize)> {
            crate::de::from_slice(input, CONFIG)
        }

        /// Deserialize a value that must occupy all of `input`.
        pub fn from_slice_exact<'de, T: Deserialize<'de>>(input: &'de [u8]) -> Result<T> {
            crate::de::from_slice_exact(input, CONFIG)
        }
    };
}

/// Borsh-compatible encoding: 4-byte length prefixes, 1-byte enum tags,
/// NaN rejected.
pub mod borsh {
    format_entry_points!(Config::BORSH);
}

/// Bincode-compatible encoding (legacy fixed-int layout): 8-byte length
/// prefixes, 4-byte enum tags, NaN admitted.
pub mod bincode {
    format_entry_points!(Config::BINCODE);
}
