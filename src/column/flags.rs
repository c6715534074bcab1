//! Column definition flags.

/// Bit flags from a MySQL column definition.
///
/// These come straight from the server. MySQL is known to report inaccurate
/// schema metadata in places, so treat the key and NOT NULL bits as hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldFlags(u16);

impl FieldFlags {
    pub const NOT_NULL: FieldFlags = FieldFlags(1 << 0);
    pub const PRIMARY_KEY: FieldFlags = FieldFlags(1 << 1);
    pub const UNIQUE_KEY: FieldFlags = FieldFlags(1 << 2);
    pub const MULTIPLE_KEY: FieldFlags = FieldFlags(1 << 3);
    pub const BLOB: FieldFlags = FieldFlags(1 << 4);
    pub const UNSIGNED: FieldFlags = FieldFlags(1 << 5);
    pub const ZERO_FILL: FieldFlags = FieldFlags(1 << 6);
    pub const BINARY: FieldFlags = FieldFlags(1 << 7);
    pub const ENUM: FieldFlags = FieldFlags(1 << 8);
    pub const AUTO_INCREMENT: FieldFlags = FieldFlags(1 << 9);
    pub const TIMESTAMP: FieldFlags = FieldFlags(1 << 10);
    pub const SET: FieldFlags = FieldFlags(1 << 11);

    /// No flags set.
    pub const fn empty() -> Self {
        FieldFlags(0)
    }

    /// Wrap a raw flag word.
    pub const fn from_bits(bits: u16) -> Self {
        FieldFlags(bits)
    }

    /// The raw flag word.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: FieldFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of both flag sets.
    pub const fn with(self, other: FieldFlags) -> Self {
        FieldFlags(self.0 | other.0)
    }
}

impl std::ops::BitOr for FieldFlags {
    type Output = FieldFlags;

    fn bitor(self, rhs: FieldFlags) -> FieldFlags {
        self.with(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let flags = FieldFlags::NOT_NULL | FieldFlags::UNSIGNED;
        assert!(flags.contains(FieldFlags::NOT_NULL));
        assert!(flags.contains(FieldFlags::UNSIGNED));
        assert!(!flags.contains(FieldFlags::ZERO_FILL));
        assert!(!flags.contains(FieldFlags::NOT_NULL | FieldFlags::BINARY));
        assert_eq!(flags.bits(), 0b10_0001);
        assert_eq!(FieldFlags::from_bits(0x0200), FieldFlags::AUTO_INCREMENT);
    }
}
