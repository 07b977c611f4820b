//! crates/render/src/tokens.rs
//!
//! Windows-style permission and flag abbreviations shared by the Samba and
//! icacls styles.

use model::{Flag, Flags, Permission, Permissions};

/// Permission abbreviations in emission order.
pub(crate) const PERMISSION_TOKENS: [(Permission, &str); 14] = [
    (Permission::ReadData, "R"),
    (Permission::WriteData, "W"),
    (Permission::Execute, "X"),
    (Permission::Delete, "D"),
    (Permission::WriteAcl, "P"),
    (Permission::WriteOwner, "O"),
    (Permission::ReadAttributes, "RA"),
    (Permission::WriteAttributes, "WA"),
    (Permission::DeleteChild, "DC"),
    (Permission::AppendData, "AD"),
    (Permission::ReadNamedAttrs, "REA"),
    (Permission::WriteNamedAttrs, "WEA"),
    (Permission::Synchronize, "S"),
    (Permission::ReadAcl, "AS"),
];

/// Flag abbreviations in emission order.
pub(crate) const FLAG_TOKENS: [(Flag, &str); 7] = [
    (Flag::FileInherit, "OI"),
    (Flag::DirectoryInherit, "CI"),
    (Flag::Inherited, "I"),
    (Flag::NoPropagateInherit, "NP"),
    (Flag::InheritOnly, "IO"),
    (Flag::SuccessfulAccess, "S"),
    (Flag::FailedAccess, "F"),
];

pub(crate) fn permission_tokens(permissions: Permissions) -> impl Iterator<Item = &'static str> {
    PERMISSION_TOKENS
        .into_iter()
        .filter(move |(perm, _)| permissions.contains(*perm))
        .map(|(_, token)| token)
}

pub(crate) fn flag_tokens(flags: Flags) -> impl Iterator<Item = &'static str> {
    FLAG_TOKENS
        .into_iter()
        .filter(move |(flag, _)| flags.contains(*flag))
        .map(|(_, token)| token)
}

/// Joins tokens with `separator`, yielding an empty string for none.
pub(crate) fn join<'a>(tokens: impl Iterator<Item = &'a str>, separator: &str) -> String {
    tokens.collect::<Vec<_>>().join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_cover_every_bit_once() {
        let perms: Permissions = PERMISSION_TOKENS.iter().map(|(perm, _)| *perm).collect();
        assert_eq!(perms, Permissions::all());
        let flags: Flags = FLAG_TOKENS.iter().map(|(flag, _)| *flag).collect();
        assert_eq!(flags.as_raw(), Flags::ALL_BITS);
    }

    #[test]
    fn tokens_follow_table_order() {
        let perms = Permission::ReadAcl | Permission::ReadData | Permission::Execute;
        assert_eq!(join(permission_tokens(perms), "|"), "R|X|AS");

        let flags = Flag::Inherited | Flag::FileInherit;
        assert_eq!(join(flag_tokens(flags), ","), "OI,I");
        assert_eq!(join(flag_tokens(Flags::empty()), "|"), "");
    }
}
