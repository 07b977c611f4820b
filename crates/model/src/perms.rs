//! crates/model/src/perms.rs
//!
//! Permission vocabulary and the permission set carried by every entry.
//!
//! Bit values follow the host's native layout where a direct mapping exists
//! (FreeBSD `<sys/acl.h>`), and the NFSv4 access-mask layout everywhere else.
//! Code that talks to a different layout translates through
//! [`Permission::ALL`] rather than reinterpreting raw bits.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use crate::AclError;

#[cfg(target_os = "freebsd")]
mod bits {
    pub const EXECUTE: u32 = 0x0001;
    pub const READ_DATA: u32 = 0x0008;
    pub const WRITE_DATA: u32 = 0x0010;
    pub const APPEND_DATA: u32 = 0x0020;
    pub const READ_NAMED_ATTRS: u32 = 0x0040;
    pub const WRITE_NAMED_ATTRS: u32 = 0x0080;
    pub const DELETE_CHILD: u32 = 0x0100;
    pub const READ_ATTRIBUTES: u32 = 0x0200;
    pub const WRITE_ATTRIBUTES: u32 = 0x0400;
    pub const DELETE: u32 = 0x0800;
    pub const READ_ACL: u32 = 0x1000;
    pub const WRITE_ACL: u32 = 0x2000;
    pub const WRITE_OWNER: u32 = 0x4000;
    pub const SYNCHRONIZE: u32 = 0x8000;
}

#[cfg(not(target_os = "freebsd"))]
mod bits {
    pub const READ_DATA: u32 = 0x0001;
    pub const WRITE_DATA: u32 = 0x0002;
    pub const APPEND_DATA: u32 = 0x0004;
    pub const READ_NAMED_ATTRS: u32 = 0x0008;
    pub const WRITE_NAMED_ATTRS: u32 = 0x0010;
    pub const EXECUTE: u32 = 0x0020;
    pub const DELETE_CHILD: u32 = 0x0040;
    pub const READ_ATTRIBUTES: u32 = 0x0080;
    pub const WRITE_ATTRIBUTES: u32 = 0x0100;
    pub const DELETE: u32 = 0x10000;
    pub const READ_ACL: u32 = 0x20000;
    pub const WRITE_ACL: u32 = 0x40000;
    pub const WRITE_OWNER: u32 = 0x80000;
    pub const SYNCHRONIZE: u32 = 0x100000;
}

/// A single named permission bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Permission {
    /// Read file data / list directory.
    ReadData = bits::READ_DATA,
    /// Write file data / add file to directory.
    WriteData = bits::WRITE_DATA,
    /// Execute file / search directory.
    Execute = bits::EXECUTE,
    /// Append data / add subdirectory.
    AppendData = bits::APPEND_DATA,
    /// Delete the object itself.
    Delete = bits::DELETE,
    /// Delete a child of a directory.
    DeleteChild = bits::DELETE_CHILD,
    /// Read basic attributes.
    ReadAttributes = bits::READ_ATTRIBUTES,
    /// Write basic attributes.
    WriteAttributes = bits::WRITE_ATTRIBUTES,
    /// Read extended (named) attributes.
    ReadNamedAttrs = bits::READ_NAMED_ATTRS,
    /// Write extended (named) attributes.
    WriteNamedAttrs = bits::WRITE_NAMED_ATTRS,
    /// Read the ACL.
    ReadAcl = bits::READ_ACL,
    /// Write the ACL.
    WriteAcl = bits::WRITE_ACL,
    /// Change the owner.
    WriteOwner = bits::WRITE_OWNER,
    /// Synchronous access.
    Synchronize = bits::SYNCHRONIZE,
}

impl Permission {
    /// Every permission in canonical display order.
    pub const ALL: [Self; 14] = [
        Self::ReadData,
        Self::WriteData,
        Self::Execute,
        Self::AppendData,
        Self::Delete,
        Self::DeleteChild,
        Self::ReadAttributes,
        Self::WriteAttributes,
        Self::ReadNamedAttrs,
        Self::WriteNamedAttrs,
        Self::ReadAcl,
        Self::WriteAcl,
        Self::WriteOwner,
        Self::Synchronize,
    ];

    /// Returns the bit this permission occupies in [`Permissions`].
    #[must_use]
    pub const fn bit(self) -> u32 {
        self as u32
    }

    /// Returns the character used in the symbolic permission run.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::ReadData => 'r',
            Self::WriteData => 'w',
            Self::Execute => 'x',
            Self::AppendData => 'p',
            Self::Delete => 'd',
            Self::DeleteChild => 'D',
            Self::ReadAttributes => 'a',
            Self::WriteAttributes => 'A',
            Self::ReadNamedAttrs => 'R',
            Self::WriteNamedAttrs => 'W',
            Self::ReadAcl => 'c',
            Self::WriteAcl => 'C',
            Self::WriteOwner => 'o',
            Self::Synchronize => 's',
        }
    }

    /// Returns the long lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ReadData => "read_data",
            Self::WriteData => "write_data",
            Self::Execute => "execute",
            Self::AppendData => "append_data",
            Self::Delete => "delete",
            Self::DeleteChild => "delete_child",
            Self::ReadAttributes => "read_attributes",
            Self::WriteAttributes => "write_attributes",
            Self::ReadNamedAttrs => "read_named_attrs",
            Self::WriteNamedAttrs => "write_named_attrs",
            Self::ReadAcl => "read_acl",
            Self::WriteAcl => "write_acl",
            Self::WriteOwner => "write_owner",
            Self::Synchronize => "synchronize",
        }
    }

    /// Looks a permission up by its symbolic character.
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|perm| perm.symbol() == symbol)
    }

    /// Looks a permission up by its long name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|perm| perm.name() == name)
    }
}

/// Set of [`Permission`] bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permissions(u32);

impl Permissions {
    /// Union of every named bit.
    pub const ALL_BITS: u32 = bits::READ_DATA
        | bits::WRITE_DATA
        | bits::EXECUTE
        | bits::APPEND_DATA
        | bits::DELETE
        | bits::DELETE_CHILD
        | bits::READ_ATTRIBUTES
        | bits::WRITE_ATTRIBUTES
        | bits::READ_NAMED_ATTRS
        | bits::WRITE_NAMED_ATTRS
        | bits::READ_ACL
        | bits::WRITE_ACL
        | bits::WRITE_OWNER
        | bits::SYNCHRONIZE;

    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every named permission.
    #[must_use]
    pub const fn all() -> Self {
        Self(Self::ALL_BITS)
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

    /// Checks if a permission is set.
    #[must_use]
    pub const fn contains(self, perm: Permission) -> bool {
        (self.0 & perm.bit()) != 0
    }

    /// Returns a copy with `perm` added.
    #[must_use]
    pub const fn with(self, perm: Permission) -> Self {
        Self(self.0 | perm.bit())
    }

    /// Adds a permission.
    pub const fn insert(&mut self, perm: Permission) {
        self.0 |= perm.bit();
    }

    /// Removes a permission.
    pub const fn remove(&mut self, perm: Permission) {
        self.0 &= !perm.bit();
    }

    /// Clears every permission.
    pub const fn clear(&mut self) {
        self.0 = 0;
    }

    /// Returns true when no permission is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the set members in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Permission> {
        Permission::ALL
            .into_iter()
            .filter(move |perm| self.contains(*perm))
    }

    /// Renders the 14-character symbolic run, `-` for unset bits.
    #[must_use]
    pub fn to_symbolic(self) -> String {
        Permission::ALL
            .iter()
            .map(|perm| {
                if self.contains(*perm) {
                    perm.symbol()
                } else {
                    '-'
                }
            })
            .collect()
    }
}

impl From<Permission> for Permissions {
    fn from(perm: Permission) -> Self {
        Self(perm.bit())
    }
}

impl FromIterator<Permission> for Permissions {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl BitOr<Permission> for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Permission) -> Self {
        self.with(rhs)
    }
}

impl BitOr for Permission {
    type Output = Permissions;

    fn bitor(self, rhs: Self) -> Permissions {
        Permissions::from(self).with(rhs)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_symbolic())
    }
}

/// Parses a symbolic run such as `r-x-----------` or a compact `rwx`.
///
/// `-` is a placeholder and ignored; every other character must be a
/// permission symbol.
impl FromStr for Permissions {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut perms = Self::empty();
        for c in s.chars() {
            if c == '-' {
                continue;
            }
            let perm = Permission::from_symbol(c)
                .ok_or_else(|| AclError::invalid(format!("unknown permission character '{c}'")))?;
            perms.insert(perm);
        }
        Ok(perms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_and_execute_render_canonically() {
        let perms = Permission::ReadData | Permission::Execute;
        assert_eq!(perms.to_symbolic(), "r-x-----------");
    }

    #[test]
    fn full_set_renders_every_symbol() {
        assert_eq!(Permissions::all().to_symbolic(), "rwxpdDaARWcCos");
        assert_eq!(Permissions::empty().to_string(), "-".repeat(14));
    }

    #[test]
    fn bits_are_distinct() {
        let mut seen = 0u32;
        for perm in Permission::ALL {
            assert_eq!(perm.bit().count_ones(), 1, "{perm:?}");
            assert_eq!(seen & perm.bit(), 0, "{perm:?} overlaps");
            seen |= perm.bit();
        }
        assert_eq!(seen, Permissions::ALL_BITS);
    }

    #[test]
    fn from_raw_drops_unknown_bits() {
        let perms = Permissions::from_raw(Permission::WriteAcl.bit() | 0x8000_0000);
        assert_eq!(perms.iter().collect::<Vec<_>>(), vec![Permission::WriteAcl]);
    }

    #[test]
    fn insert_remove_clear() {
        let mut perms = Permissions::empty();
        perms.insert(Permission::Delete);
        perms.insert(Permission::Synchronize);
        assert!(perms.contains(Permission::Delete));
        perms.remove(Permission::Delete);
        assert!(!perms.contains(Permission::Delete));
        assert!(perms.contains(Permission::Synchronize));
        perms.clear();
        assert!(perms.is_empty());
    }

    #[test]
    fn parse_accepts_positional_and_compact_forms() {
        let positional: Permissions = "r-x-----------".parse().expect("positional");
        let compact: Permissions = "xr".parse().expect("compact");
        assert_eq!(positional, compact);
        assert_eq!(positional, Permission::ReadData | Permission::Execute);
    }

    #[test]
    fn parse_rejects_unknown_symbols() {
        assert!("rwz".parse::<Permissions>().is_err());
    }

    #[test]
    fn symbolic_round_trips_through_parse() {
        let perms: Permissions = [Permission::AppendData, Permission::ReadAcl, Permission::WriteOwner]
            .into_iter()
            .collect();
        let parsed: Permissions = perms.to_symbolic().parse().expect("parse");
        assert_eq!(parsed, perms);
    }

    #[test]
    fn names_and_symbols_are_unique() {
        for perm in Permission::ALL {
            assert_eq!(Permission::from_symbol(perm.symbol()), Some(perm));
            assert_eq!(Permission::from_name(perm.name()), Some(perm));
        }
    }
}
