//! Serde helper module for fixed-length byte arrays of any length.
//!
//! serde only implements `Serialize`/`Deserialize` for arrays up to 32
//! elements, but on-chain layouts routinely carry 64-byte signatures and
//! larger fixed blobs. This module encodes any `[u8; N]` as a fixed array:
//! the raw bytes with **no length prefix**, in both formats.
//!
//! # Usage
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use chain_codec::borsh;
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! pub struct SignedDigest {
//!     pub slot: u64,
//!     #[serde(with = "chain_codec::fixed_bytes")]
//!     pub signature: [u8; 64],
//! }
//!
//! let sd = SignedDigest { slot: 7, signature: [9; 64] };
//! let bytes = borsh::to_vec(&sd).unwrap();
//! assert_eq!(bytes.len(), 8 + 64);
//! assert_eq!(&bytes[8..], [9; 64]);
//! assert_eq!(borsh::from_slice_exact::<SignedDigest>(&bytes).unwrap(), sd);
//! ```

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeTuple, Serializer};
use std::fmt;

/// Serialize `value` as `N` raw bytes. No length prefix is written.
pub fn serialize<const N: usize, S: Serializer>(
    value: &[u8; N],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_tuple(N)?;
    for byte in value {
        seq.serialize_element(byte)?;
    }
    seq.end()
}

/// Deserialize exactly `N` raw bytes. No length prefix is read.
pub fn deserialize<'de, const N: usize, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<[u8; N], D::Error> {
    deserializer.deserialize_tuple(N, FixedBytesVisitor::<N>)
}

struct FixedBytesVisitor<const N: usize>;

impl<'de, const N: usize> Visitor<'de> for FixedBytesVisitor<N> {
    type Value = [u8; N];

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a fixed array of {} bytes", N)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<[u8; N], A::Error> {
        let mut out = [0u8; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
        }
        Ok(out)
    }

    // Fallback for self-describing formats that hand over a byte string.
    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<[u8; N], E> {
        v.try_into()
            .map_err(|_| E::invalid_length(v.len(), &self))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Config, Error, de::from_slice, ser::to_vec};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Blob(#[serde(with = "crate::fixed_bytes")] [u8; 40]);

    #[test]
    fn test_no_prefix_either_format() {
        let blob = Blob([3; 40]);
        for config in [Config::BORSH, Config::BINCODE] {
            let bytes = to_vec(&blob, config).unwrap();
            assert_eq!(bytes, [3; 40]);
            assert_eq!(from_slice::<Blob>(&bytes, config).unwrap(), (blob.clone(), 40));
        }
    }

    #[test]
    fn test_truncated_input() {
        assert_eq!(
            from_slice::<Blob>(&[0; 39], Config::BORSH),
            Err(Error::UnexpectedEndOfInput)
        );
    }
}
