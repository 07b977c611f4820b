//! crates/metadata/src/ace_mapping.rs
//!
//! Conversion between Solaris/illumos `ace_t` records and generic entries.
//!
//! `ace_t` has no tag field. The owner, owning group and everyone principals
//! are signalled by `ACE_OWNER`, `ACE_GROUP` and `ACE_EVERYONE` flag bits;
//! when none is set `a_who` is a uid, or a gid if `ACE_IDENTIFIER_GROUP` is
//! set. Access masks use the NFSv4 layout.

use model::{
    AclEntry, AclError, AclResult, AclType, EntryKind, Flag, Flags, GenericAcl, Principal, TagType,
};

use crate::identity::IdentityLookup;
use crate::nfsv4_acl::{mask_to_permissions, permissions_to_mask};

pub(crate) const ACE_IDENTIFIER_GROUP: u16 = 0x0040;
pub(crate) const ACE_OWNER: u16 = 0x1000;
pub(crate) const ACE_GROUP: u16 = 0x2000;
pub(crate) const ACE_EVERYONE: u16 = 0x4000;

const ACE_ACCESS_ALLOWED_ACE_TYPE: u16 = 0x0000;
const ACE_ACCESS_DENIED_ACE_TYPE: u16 = 0x0001;
const ACE_SYSTEM_AUDIT_ACE_TYPE: u16 = 0x0002;
const ACE_SYSTEM_ALARM_ACE_TYPE: u16 = 0x0003;

/// `a_who` value stored for implicit principals.
const NO_WHO: u32 = u32::MAX;

const FLAG_BITS: [(Flag, u16); 7] = [
    (Flag::FileInherit, 0x0001),
    (Flag::DirectoryInherit, 0x0002),
    (Flag::NoPropagateInherit, 0x0004),
    (Flag::InheritOnly, 0x0008),
    (Flag::SuccessfulAccess, 0x0010),
    (Flag::FailedAccess, 0x0020),
    (Flag::Inherited, 0x0080),
];

const KIND_BITS: [(EntryKind, u16); 4] = [
    (EntryKind::Allow, ACE_ACCESS_ALLOWED_ACE_TYPE),
    (EntryKind::Deny, ACE_ACCESS_DENIED_ACE_TYPE),
    (EntryKind::Audit, ACE_SYSTEM_AUDIT_ACE_TYPE),
    (EntryKind::Alarm, ACE_SYSTEM_ALARM_ACE_TYPE),
];

/// Layout-compatible `ace_t`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RawAce {
    pub(crate) who: u32,
    pub(crate) access_mask: u32,
    pub(crate) flags: u16,
    pub(crate) kind: u16,
}

fn flags_from_native(raw: u16) -> Flags {
    FLAG_BITS
        .iter()
        .filter(|(_, bit)| raw & bit != 0)
        .map(|(flag, _)| *flag)
        .collect()
}

fn flags_to_native(flags: Flags) -> u16 {
    FLAG_BITS
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .fold(0, |raw, (_, bit)| raw | bit)
}

fn principal_from_native(ace: &RawAce, lookup: &impl IdentityLookup) -> Principal {
    if ace.flags & ACE_OWNER != 0 {
        Principal::owner()
    } else if ace.flags & ACE_GROUP != 0 {
        Principal::group_owner()
    } else if ace.flags & ACE_EVERYONE != 0 {
        Principal::everyone()
    } else {
        let group = ace.flags & ACE_IDENTIFIER_GROUP != 0;
        let tag = if group { TagType::Group } else { TagType::User };
        let name = lookup
            .name_for(ace.who, group)
            .unwrap_or_else(|| ace.who.to_string());
        Principal::new(tag, Some(ace.who), name)
    }
}

const fn kind_to_native(kind: EntryKind) -> u16 {
    match kind {
        EntryKind::Allow => ACE_ACCESS_ALLOWED_ACE_TYPE,
        EntryKind::Deny => ACE_ACCESS_DENIED_ACE_TYPE,
        EntryKind::Audit => ACE_SYSTEM_AUDIT_ACE_TYPE,
        EntryKind::Alarm => ACE_SYSTEM_ALARM_ACE_TYPE,
    }
}

pub(crate) fn ace_to_entry(ace: &RawAce, lookup: &impl IdentityLookup) -> AclResult<AclEntry> {
    let kind = KIND_BITS
        .iter()
        .find_map(|(kind, raw)| (*raw == ace.kind).then_some(*kind))
        .ok_or_else(|| AclError::invalid(format!("unsupported ace type {:#x}", ace.kind)))?;
    Ok(AclEntry {
        kind,
        principal: principal_from_native(ace, lookup),
        permissions: mask_to_permissions(ace.access_mask),
        flags: flags_from_native(ace.flags),
    })
}

pub(crate) fn entry_to_ace(entry: &AclEntry) -> AclResult<RawAce> {
    let principal = &entry.principal;
    let (who, principal_bits) = match principal.tag {
        TagType::UserObject => (NO_WHO, ACE_OWNER),
        TagType::GroupObject => (NO_WHO, ACE_GROUP | ACE_IDENTIFIER_GROUP),
        TagType::Everyone => (NO_WHO, ACE_EVERYONE),
        TagType::User | TagType::Group => {
            let id = principal.id.ok_or_else(|| {
                AclError::invalid(format!("principal '{}' has no numeric id", principal.name))
            })?;
            let bits = if principal.tag == TagType::Group {
                ACE_IDENTIFIER_GROUP
            } else {
                0
            };
            (id, bits)
        }
        TagType::Mask | TagType::Other | TagType::Unknown => {
            return Err(AclError::invalid(format!(
                "{:?} principals have no ace_t form",
                principal.tag
            )));
        }
    };
    let kind = kind_to_native(entry.kind);

    Ok(RawAce {
        who,
        access_mask: permissions_to_mask(entry.permissions),
        flags: flags_to_native(entry.flags) | principal_bits,
        kind,
    })
}

pub(crate) fn aces_to_acl(
    aces: &[RawAce],
    lookup: &impl IdentityLookup,
) -> AclResult<GenericAcl> {
    let mut acl = GenericAcl::with_capacity(AclType::Nfs4, aces.len())?;
    for ace in aces {
        acl.push(ace_to_entry(ace, lookup)?)?;
    }
    Ok(acl)
}

pub(crate) fn acl_to_aces(acl: &GenericAcl) -> AclResult<Vec<RawAce>> {
    let mut aces = Vec::new();
    aces.try_reserve_exact(acl.len())
        .map_err(|_| AclError::OutOfMemory { requested: acl.len() })?;
    for entry in acl {
        aces.push(entry_to_ace(entry)?);
    }
    Ok(aces)
}
