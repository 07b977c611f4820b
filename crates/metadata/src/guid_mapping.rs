//! crates/metadata/src/guid_mapping.rs
//!
//! Translation tables and identity-token resolution for macOS extended ACLs.
//!
//! macOS entries name their principal with a 16-byte GUID rather than a uid
//! or gid, and their permission and flag bits live at private positions. Both
//! are translated through explicit tables; GUIDs go through a
//! [`MembershipResolver`].

use std::io;

use model::{AclError, AclResult, EntryKind, Flag, Flags, Permission, Permissions, Principal, TagType};

use crate::identity::IdentityLookup;

/// Opaque identity token stored in an entry qualifier.
pub(crate) type Guid = [u8; 16];

pub(crate) const ACL_EXTENDED_ALLOW: u32 = 1;
pub(crate) const ACL_EXTENDED_DENY: u32 = 2;

/// macOS `acl_perm_t` bit for each generic permission.
pub(crate) const PERMISSION_BITS: [(Permission, u32); 14] = [
    (Permission::ReadData, 1 << 1),
    (Permission::WriteData, 1 << 2),
    (Permission::Execute, 1 << 3),
    (Permission::Delete, 1 << 4),
    (Permission::AppendData, 1 << 5),
    (Permission::DeleteChild, 1 << 6),
    (Permission::ReadAttributes, 1 << 7),
    (Permission::WriteAttributes, 1 << 8),
    (Permission::ReadNamedAttrs, 1 << 9),
    (Permission::WriteNamedAttrs, 1 << 10),
    (Permission::ReadAcl, 1 << 11),
    (Permission::WriteAcl, 1 << 12),
    (Permission::WriteOwner, 1 << 13),
    (Permission::Synchronize, 1 << 20),
];

/// macOS `acl_flag_t` bit for each expressible generic flag.
///
/// Audit flags have no extended-ACL counterpart.
pub(crate) const FLAG_BITS: [(Flag, u32); 5] = [
    (Flag::Inherited, 1 << 4),
    (Flag::FileInherit, 1 << 5),
    (Flag::DirectoryInherit, 1 << 6),
    (Flag::NoPropagateInherit, 1 << 7),
    (Flag::InheritOnly, 1 << 8),
];

/// Namespace a GUID resolved into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IdKind {
    User,
    Group,
}

/// Converts between GUIDs and numeric ids.
pub(crate) trait MembershipResolver {
    /// Resolves a GUID to an id and its namespace; `Ok(None)` for other kinds.
    fn guid_to_id(&self, guid: &Guid) -> io::Result<Option<(u32, IdKind)>>;

    /// Returns the GUID of a uid.
    fn uid_to_guid(&self, uid: u32) -> io::Result<Guid>;

    /// Returns the GUID of a gid.
    fn gid_to_guid(&self, gid: u32) -> io::Result<Guid>;
}

/// Collects generic permissions by probing each native bit.
pub(crate) fn permissions_from_native(mut has: impl FnMut(u32) -> bool) -> Permissions {
    PERMISSION_BITS
        .iter()
        .filter(|(_, bit)| has(*bit))
        .map(|(perm, _)| *perm)
        .collect()
}

/// Native permission bits to set for `permissions`.
pub(crate) fn native_permission_bits(permissions: Permissions) -> impl Iterator<Item = u32> {
    PERMISSION_BITS
        .into_iter()
        .filter(move |(perm, _)| permissions.contains(*perm))
        .map(|(_, bit)| bit)
}

/// Collects generic flags by probing each native bit.
pub(crate) fn flags_from_native(mut has: impl FnMut(u32) -> bool) -> Flags {
    FLAG_BITS
        .iter()
        .filter(|(_, bit)| has(*bit))
        .map(|(flag, _)| *flag)
        .collect()
}

/// Native flag bits to set for `flags`; flags without a native bit are dropped.
pub(crate) fn native_flag_bits(flags: Flags) -> impl Iterator<Item = u32> {
    FLAG_BITS
        .into_iter()
        .filter(move |(flag, _)| flags.contains(*flag))
        .map(|(_, bit)| bit)
}

pub(crate) fn kind_from_tag(tag: u32) -> AclResult<EntryKind> {
    match tag {
        ACL_EXTENDED_ALLOW => Ok(EntryKind::Allow),
        ACL_EXTENDED_DENY => Ok(EntryKind::Deny),
        other => Err(AclError::invalid(format!("unexpected extended ACL tag {other}"))),
    }
}

pub(crate) fn tag_for_kind(kind: EntryKind) -> AclResult<u32> {
    match kind {
        EntryKind::Allow => Ok(ACL_EXTENDED_ALLOW),
        EntryKind::Deny => Ok(ACL_EXTENDED_DENY),
        other => Err(AclError::invalid(format!(
            "{other} entries cannot be stored in an extended ACL"
        ))),
    }
}

/// Resolves an entry qualifier to a named principal.
pub(crate) fn principal_from_guid(
    guid: &Guid,
    resolver: &impl MembershipResolver,
    lookup: &impl IdentityLookup,
    context: &impl Fn(io::Error) -> AclError,
) -> AclResult<Principal> {
    let (id, kind) = resolver
        .guid_to_id(guid)
        .map_err(context)?
        .ok_or_else(|| AclError::unsupported("qualifier is neither a user nor a group"))?;
    let (tag, group) = match kind {
        IdKind::User => (TagType::User, false),
        IdKind::Group => (TagType::Group, true),
    };
    let name = lookup.name_for(id, group).unwrap_or_else(|| id.to_string());
    Ok(Principal::new(tag, Some(id), name))
}

/// Returns the qualifier GUID for an explicit user or group principal.
pub(crate) fn guid_for_principal(
    principal: &Principal,
    resolver: &impl MembershipResolver,
    context: &impl Fn(io::Error) -> AclError,
) -> AclResult<Guid> {
    let id = match principal.tag {
        TagType::User | TagType::Group => principal.id.ok_or_else(|| {
            AclError::invalid(format!("principal '{}' has no numeric id", principal.name))
        })?,
        other => {
            return Err(AclError::invalid(format!(
                "{other:?} principals cannot be stored in an extended ACL"
            )));
        }
    };
    let guid = if principal.tag == TagType::Group {
        resolver.gid_to_guid(id)
    } else {
        resolver.uid_to_guid(id)
    };
    guid.map_err(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticIdentity;
    use model::AclErrorKind;
    use std::path::Path;

    /// Encodes the namespace in byte 0 and the id in bytes 12..16.
    struct FakeMembership;

    impl MembershipResolver for FakeMembership {
        fn guid_to_id(&self, guid: &Guid) -> io::Result<Option<(u32, IdKind)>> {
            let id = u32::from_be_bytes([guid[12], guid[13], guid[14], guid[15]]);
            Ok(match guid[0] {
                b'u' => Some((id, IdKind::User)),
                b'g' => Some((id, IdKind::Group)),
                b'x' => return Err(io::Error::from_raw_os_error(libc::EIO)),
                _ => None,
            })
        }

        fn uid_to_guid(&self, uid: u32) -> io::Result<Guid> {
            Ok(fake_guid(b'u', uid))
        }

        fn gid_to_guid(&self, gid: u32) -> io::Result<Guid> {
            Ok(fake_guid(b'g', gid))
        }
    }

    fn fake_guid(kind: u8, id: u32) -> Guid {
        let mut guid = [0u8; 16];
        guid[0] = kind;
        guid[12..].copy_from_slice(&id.to_be_bytes());
        guid
    }

    fn context(err: io::Error) -> AclError {
        AclError::io("resolve qualifier", Path::new("/tmp/x"), err)
    }

    #[test]
    fn permission_table_is_a_bijection() {
        let bits: Vec<u32> = native_permission_bits(Permissions::all()).collect();
        assert_eq!(bits.len(), 14);
        let back = permissions_from_native(|bit| bits.contains(&bit));
        assert_eq!(back, Permissions::all());

        let read_exec = Permission::ReadData | Permission::Execute;
        let raw: u32 = native_permission_bits(read_exec).fold(0, |acc, bit| acc | bit);
        assert_eq!(raw, (1 << 1) | (1 << 3));
    }

    #[test]
    fn audit_flags_are_dropped() {
        let flags = Flag::FileInherit | Flag::FailedAccess | Flag::NoPropagateInherit;
        let raw: u32 = native_flag_bits(flags).fold(0, |acc, bit| acc | bit);
        assert_eq!(raw, (1 << 5) | (1 << 7));
        let back = flags_from_native(|bit| raw & bit != 0);
        assert_eq!(back, Flag::FileInherit | Flag::NoPropagateInherit);
    }

    #[test]
    fn only_allow_and_deny_are_expressible() {
        assert_eq!(tag_for_kind(EntryKind::Allow).expect("allow"), ACL_EXTENDED_ALLOW);
        assert_eq!(kind_from_tag(ACL_EXTENDED_DENY).expect("deny"), EntryKind::Deny);
        for kind in [EntryKind::Audit, EntryKind::Alarm] {
            assert_eq!(
                tag_for_kind(kind).expect_err("audit").kind(),
                AclErrorKind::InvalidArgument
            );
        }
        assert!(kind_from_tag(0).is_err());
    }

    #[test]
    fn guids_resolve_to_named_principals() {
        let ids = StaticIdentity::new().user(501, "alice").group(20, "staff");
        let user = principal_from_guid(&fake_guid(b'u', 501), &FakeMembership, &ids, &context)
            .expect("user");
        assert_eq!((user.tag, user.id, user.name.as_str()), (TagType::User, Some(501), "alice"));

        let group = principal_from_guid(&fake_guid(b'g', 20), &FakeMembership, &ids, &context)
            .expect("group");
        assert_eq!(group.name, "staff");

        let unnamed = principal_from_guid(&fake_guid(b'g', 77), &FakeMembership, &ids, &context)
            .expect("numeric");
        assert_eq!(unnamed.name, "77");
    }

    #[test]
    fn guid_failures_map_to_errors() {
        let ids = StaticIdentity::new();
        let err = principal_from_guid(&fake_guid(b'?', 1), &FakeMembership, &ids, &context)
            .expect_err("unknown kind");
        assert_eq!(err.kind(), AclErrorKind::OperationNotSupported);

        let err = principal_from_guid(&fake_guid(b'x', 1), &FakeMembership, &ids, &context)
            .expect_err("resolver failure");
        assert_eq!(err.kind(), AclErrorKind::Io);
    }

    #[test]
    fn principals_map_back_to_guids() {
        let guid = guid_for_principal(&Principal::group(20), &FakeMembership, &context)
            .expect("group");
        assert_eq!(guid, fake_guid(b'g', 20));

        for principal in [
            Principal::owner(),
            Principal::everyone(),
            Principal::new(TagType::User, None, "nobody"),
        ] {
            let err = guid_for_principal(&principal, &FakeMembership, &context)
                .expect_err("inexpressible");
            assert_eq!(err.kind(), AclErrorKind::InvalidArgument);
        }
    }
}
