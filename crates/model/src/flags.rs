//! crates/model/src/flags.rs
//!
//! Inheritance and audit flags carried by every entry.
//!
//! The values coincide with both the NFSv4 ACE flags and FreeBSD's
//! `ACL_ENTRY_*` constants. Bit `0x40` is never a member: the NFSv4 wire
//! format uses it to mark group identifiers and decoding strips it.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use crate::AclError;

/// A single named flag bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Flag {
    /// Inherited by files created in the directory.
    FileInherit = 0x0001,
    /// Inherited by subdirectories.
    DirectoryInherit = 0x0002,
    /// Inheritance stops after one level.
    NoPropagateInherit = 0x0004,
    /// Only used for inheritance, not for access checks on this object.
    InheritOnly = 0x0008,
    /// Audit/alarm on successful access.
    SuccessfulAccess = 0x0010,
    /// Audit/alarm on failed access.
    FailedAccess = 0x0020,
    /// Entry was inherited from a parent directory.
    Inherited = 0x0080,
}

impl Flag {
    /// Every flag in canonical display order.
    pub const ALL: [Self; 7] = [
        Self::FileInherit,
        Self::DirectoryInherit,
        Self::InheritOnly,
        Self::NoPropagateInherit,
        Self::SuccessfulAccess,
        Self::FailedAccess,
        Self::Inherited,
    ];

    /// Returns the bit this flag occupies in [`Flags`].
    #[must_use]
    pub const fn bit(self) -> u32 {
        self as u32
    }

    /// Returns the character used in the symbolic flag run.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::FileInherit => 'f',
            Self::DirectoryInherit => 'd',
            Self::InheritOnly => 'i',
            Self::NoPropagateInherit => 'n',
            Self::SuccessfulAccess => 'S',
            Self::FailedAccess => 'F',
            Self::Inherited => 'I',
        }
    }

    /// Returns the long lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FileInherit => "file_inherit",
            Self::DirectoryInherit => "directory_inherit",
            Self::InheritOnly => "inherit_only",
            Self::NoPropagateInherit => "no_propagate_inherit",
            Self::SuccessfulAccess => "successful_access",
            Self::FailedAccess => "failed_access",
            Self::Inherited => "inherited",
        }
    }

    /// Looks a flag up by its symbolic character.
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.symbol() == symbol)
    }
}

/// Set of [`Flag`] bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flags(u32);

impl Flags {
    /// Union of every named bit.
    pub const ALL_BITS: u32 = 0x0001 | 0x0002 | 0x0004 | 0x0008 | 0x0010 | 0x0020 | 0x0080;

    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates a set from raw bits, dropping bits outside the vocabulary.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value & Self::ALL_BITS)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// Checks if a flag is set.
    #[must_use]
    pub const fn contains(self, flag: Flag) -> bool {
        (self.0 & flag.bit()) != 0
    }

    /// Returns a copy with `flag` added.
    #[must_use]
    pub const fn with(self, flag: Flag) -> Self {
        Self(self.0 | flag.bit())
    }

    /// Adds a flag.
    pub const fn insert(&mut self, flag: Flag) {
        self.0 |= flag.bit();
    }

    /// Removes a flag.
    pub const fn remove(&mut self, flag: Flag) {
        self.0 &= !flag.bit();
    }

    /// Clears every flag.
    pub const fn clear(&mut self) {
        self.0 = 0;
    }

    /// Returns true when no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the set members in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Flag> {
        Flag::ALL.into_iter().filter(move |flag| self.contains(*flag))
    }

    /// Renders the 7-character symbolic run, `-` for unset bits.
    #[must_use]
    pub fn to_symbolic(self) -> String {
        Flag::ALL
            .iter()
            .map(|flag| {
                if self.contains(*flag) {
                    flag.symbol()
                } else {
                    '-'
                }
            })
            .collect()
    }
}

impl From<Flag> for Flags {
    fn from(flag: Flag) -> Self {
        Self(flag.bit())
    }
}

impl FromIterator<Flag> for Flags {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl BitOr<Flag> for Flags {
    type Output = Self;

    fn bitor(self, rhs: Flag) -> Self {
        self.with(rhs)
    }
}

impl BitOr for Flag {
    type Output = Flags;

    fn bitor(self, rhs: Self) -> Flags {
        Flags::from(self).with(rhs)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_symbolic())
    }
}

/// Parses a symbolic run such as `fd-----` or a compact `fd`.
impl FromStr for Flags {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Self::empty();
        for c in s.chars() {
            if c == '-' {
                continue;
            }
            let flag = Flag::from_symbol(c)
                .ok_or_else(|| AclError::invalid(format!("unknown flag character '{c}'")))?;
            flags.insert(flag);
        }
        Ok(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbolic_run_is_seven_wide() {
        assert_eq!(Flags::empty().to_symbolic(), "-------");
        let flags = Flag::FileInherit | Flag::Inherited;
        assert_eq!(flags.to_symbolic(), "f-----I");
    }

    #[test]
    fn identifier_group_bit_is_not_a_member() {
        let flags = Flags::from_raw(0x0040 | 0x0002);
        assert_eq!(flags, Flags::from(Flag::DirectoryInherit));
    }

    #[test]
    fn all_bits_matches_variants() {
        let union = Flag::ALL.iter().fold(0, |acc, flag| acc | flag.bit());
        assert_eq!(union, Flags::ALL_BITS);
    }

    #[test]
    fn parse_and_iterate() {
        let flags: Flags = "di".parse().expect("parse");
        assert_eq!(
            flags.iter().collect::<Vec<_>>(),
            vec![Flag::DirectoryInherit, Flag::InheritOnly]
        );
        assert!("dx".parse::<Flags>().is_err());
    }

    #[test]
    fn insert_and_remove() {
        let mut flags = Flags::empty();
        flags.insert(Flag::FailedAccess);
        assert!(flags.contains(Flag::FailedAccess));
        flags.remove(Flag::FailedAccess);
        assert!(flags.is_empty());
    }
}
