//! Format rule sets.
//!
//! Both wire formats share one serializer and one deserializer. Everything
//! that differs between them lives in a [`Config`]: the width of sequence
//! length prefixes, the width of enum discriminants and whether NaN floats
//! are admitted.

/// Width of the unsigned little-endian prefix written before every
/// variable-length sequence, string, byte buffer and map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
    /// 4-byte prefix (borsh)
    U32,
    /// 8-byte prefix (bincode)
    U64,
}

impl LengthPrefix {
    /// Number of bytes the prefix occupies on the wire.
    pub const fn width(self) -> usize {
        match self {
            LengthPrefix::U32 => 4,
            LengthPrefix::U64 => 8,
        }
    }

    /// Largest length the prefix can carry.
    pub const fn max(self) -> u64 {
        match self {
            LengthPrefix::U32 => u32::MAX as u64,
            LengthPrefix::U64 => u64::MAX,
        }
    }
}

/// Width of the unsigned little-endian discriminant written before an enum
/// variant's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagWidth {
    /// 1-byte tag (borsh)
    U8,
    /// 4-byte tag (bincode)
    U32,
}

impl TagWidth {
    pub const fn width(self) -> usize {
        match self {
            TagWidth::U8 => 1,
            TagWidth::U32 => 4,
        }
    }

    pub const fn max(self) -> u32 {
        match self {
            TagWidth::U8 => u8::MAX as u32,
            TagWidth::U32 => u32::MAX,
        }
    }
}

/// An immutable rule set, chosen once per call.
///
/// ```rust
/// use chain_codec::{Config, LengthPrefix, TagWidth};
///
/// let config = Config::BORSH.with_max_len(1024);
/// assert_eq!(config.length_prefix(), LengthPrefix::U32);
/// assert_eq!(config.tag_width(), TagWidth::U8);
/// assert!(!config.allow_nan());
/// assert_eq!(config.max_len(), Some(1024));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    length_prefix: LengthPrefix,
    tag_width: TagWidth,
    allow_nan: bool,
    max_len: Option<u64>,
}

impl Config {
    /// Borsh: 4-byte length prefixes, 1-byte tags, NaN rejected.
    pub const BORSH: Config = Config::new(LengthPrefix::U32, TagWidth::U8, false);

    /// Bincode (legacy fixint): 8-byte length prefixes, 4-byte tags, NaN admitted.
    pub const BINCODE: Config = Config::new(LengthPrefix::U64, TagWidth::U32, true);

    pub const fn new(length_prefix: LengthPrefix, tag_width: TagWidth, allow_nan: bool) -> Self {
        Config {
            length_prefix,
            tag_width,
            allow_nan,
            max_len: None,
        }
    }

    pub const fn with_length_prefix(mut self, length_prefix: LengthPrefix) -> Self {
        self.length_prefix = length_prefix;
        self
    }

    pub const fn with_tag_width(mut self, tag_width: TagWidth) -> Self {
        self.tag_width = tag_width;
        self
    }

    pub const fn with_allow_nan(mut self, allow_nan: bool) -> Self {
        self.allow_nan = allow_nan;
        self
    }

    /// Caps every sequence, string, byte buffer and map length accepted on
    /// encode or decode. The cap never exceeds what the prefix can carry.
    pub const fn with_max_len(mut self, max_len: u64) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub const fn length_prefix(&self) -> LengthPrefix {
        self.length_prefix
    }

    pub const fn tag_width(&self) -> TagWidth {
        self.tag_width
    }

    pub const fn allow_nan(&self) -> bool {
        self.allow_nan
    }

    pub const fn max_len(&self) -> Option<u64> {
        self.max_len
    }

    /// The effective upper bound for a sequence length.
    pub(crate) fn len_limit(&self) -> u64 {
        match self.max_len {
            Some(max) => max.min(self.length_prefix.max()),
            None => self.length_prefix.max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_borsh_rules() {
        let c = Config::BORSH;
        assert_eq!(c.length_prefix().width(), 4);
        assert_eq!(c.tag_width().width(), 1);
        assert!(!c.allow_nan());
        assert_eq!(c.len_limit(), u32::MAX as u64);
    }

    #[test]
    fn test_bincode_rules() {
        let c = Config::BINCODE;
        assert_eq!(c.length_prefix().width(), 8);
        assert_eq!(c.tag_width().width(), 4);
        assert!(c.allow_nan());
        assert_eq!(c.len_limit(), u64::MAX);
    }

    #[test]
    fn test_max_len_is_clamped_to_prefix() {
        let c = Config::BORSH.with_max_len(u64::MAX);
        assert_eq!(c.len_limit(), u32::MAX as u64);
        let c = Config::BINCODE.with_max_len(16);
        assert_eq!(c.len_limit(), 16);
    }

    #[test]
    fn test_builders_override() {
        let c = Config::BORSH
            .with_length_prefix(LengthPrefix::U64)
            .with_tag_width(TagWidth::U32)
            .with_allow_nan(true);
        assert_eq!(c, Config::BINCODE);
    }
}
