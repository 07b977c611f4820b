#![cfg(all(feature = "acl", target_os = "freebsd"))]
#![allow(unsafe_code)]

//! # FreeBSD NFSv4 ACL Support
//!
//! FreeBSD exposes NFSv4 ACLs through the POSIX.1e-style `acl_*` API with
//! `ACL_TYPE_NFS4`. The generic tag, permission and flag values are the
//! native `<sys/acl.h>` values on this target, so entries map field by field;
//! the only translations are the entry type and principal names. The
//! `const` assertions below fail the build if the layouts ever drift apart.

use std::ffi::{CString, c_void};
use std::fs::File;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr;

use logging::debug_log;
use model::{
    AclEntry, AclError, AclResult, AclType, EntryKind, Flag, Flags, GenericAcl, Permission,
    Permissions, Principal, TagType,
};

use crate::backend::{AclBackend, require_nfs4};
use crate::identity::{IdentityLookup, SystemIdentity};
use crate::options::LinkMode;

mod sys {
    #![allow(non_camel_case_types)]

    use libc::{c_char, c_int, c_void};

    pub type acl_t = *mut c_void;
    pub type acl_entry_t = *mut c_void;
    pub type acl_type_t = c_int;
    pub type acl_tag_t = u32;
    pub type acl_perm_t = u32;
    pub type acl_permset_t = *mut acl_perm_t;
    pub type acl_flag_t = u16;
    pub type acl_flagset_t = *mut acl_flag_t;
    pub type acl_entry_type_t = u16;

    pub const ACL_TYPE_NFS4: acl_type_t = 0x0000_0004;

    pub const ACL_FIRST_ENTRY: c_int = 0;
    pub const ACL_NEXT_ENTRY: c_int = 1;

    pub const ACL_UNDEFINED_TAG: acl_tag_t = 0x0000_0000;
    pub const ACL_USER_OBJ: acl_tag_t = 0x0000_0001;
    pub const ACL_USER: acl_tag_t = 0x0000_0002;
    pub const ACL_GROUP_OBJ: acl_tag_t = 0x0000_0004;
    pub const ACL_GROUP: acl_tag_t = 0x0000_0008;
    pub const ACL_MASK: acl_tag_t = 0x0000_0010;
    pub const ACL_OTHER: acl_tag_t = 0x0000_0020;
    pub const ACL_EVERYONE: acl_tag_t = 0x0000_0040;

    pub const ACL_ENTRY_TYPE_ALLOW: acl_entry_type_t = 0x0100;
    pub const ACL_ENTRY_TYPE_DENY: acl_entry_type_t = 0x0200;
    pub const ACL_ENTRY_TYPE_AUDIT: acl_entry_type_t = 0x0400;
    pub const ACL_ENTRY_TYPE_ALARM: acl_entry_type_t = 0x0800;

    pub const ACL_EXECUTE: acl_perm_t = 0x0001;
    pub const ACL_READ_DATA: acl_perm_t = 0x0008;
    pub const ACL_WRITE_DATA: acl_perm_t = 0x0010;
    pub const ACL_APPEND_DATA: acl_perm_t = 0x0020;
    pub const ACL_READ_NAMED_ATTRS: acl_perm_t = 0x0040;
    pub const ACL_WRITE_NAMED_ATTRS: acl_perm_t = 0x0080;
    pub const ACL_DELETE_CHILD: acl_perm_t = 0x0100;
    pub const ACL_READ_ATTRIBUTES: acl_perm_t = 0x0200;
    pub const ACL_WRITE_ATTRIBUTES: acl_perm_t = 0x0400;
    pub const ACL_DELETE: acl_perm_t = 0x0800;
    pub const ACL_READ_ACL: acl_perm_t = 0x1000;
    pub const ACL_WRITE_ACL: acl_perm_t = 0x2000;
    pub const ACL_WRITE_OWNER: acl_perm_t = 0x4000;
    pub const ACL_SYNCHRONIZE: acl_perm_t = 0x8000;

    pub const ACL_ENTRY_FILE_INHERIT: acl_flag_t = 0x0001;
    pub const ACL_ENTRY_DIRECTORY_INHERIT: acl_flag_t = 0x0002;
    pub const ACL_ENTRY_NO_PROPAGATE_INHERIT: acl_flag_t = 0x0004;
    pub const ACL_ENTRY_INHERIT_ONLY: acl_flag_t = 0x0008;
    pub const ACL_ENTRY_SUCCESSFUL_ACCESS: acl_flag_t = 0x0010;
    pub const ACL_ENTRY_FAILED_ACCESS: acl_flag_t = 0x0020;
    pub const ACL_ENTRY_INHERITED: acl_flag_t = 0x0080;

    unsafe extern "C" {
        pub fn acl_get_file(path_p: *const c_char, ty: acl_type_t) -> acl_t;
        pub fn acl_get_link_np(path_p: *const c_char, ty: acl_type_t) -> acl_t;
        pub fn acl_get_fd_np(fd: c_int, ty: acl_type_t) -> acl_t;
        pub fn acl_set_file(path_p: *const c_char, ty: acl_type_t, acl: acl_t) -> c_int;
        pub fn acl_set_link_np(path_p: *const c_char, ty: acl_type_t, acl: acl_t) -> c_int;
        pub fn acl_set_fd_np(fd: c_int, acl: acl_t, ty: acl_type_t) -> c_int;
        pub fn acl_init(count: c_int) -> acl_t;
        pub fn acl_free(obj_p: *mut c_void) -> c_int;
        pub fn acl_get_entry(acl: acl_t, entry_id: c_int, entry_p: *mut acl_entry_t) -> c_int;
        pub fn acl_create_entry(acl_p: *mut acl_t, entry_p: *mut acl_entry_t) -> c_int;
        pub fn acl_get_tag_type(entry: acl_entry_t, tag_p: *mut acl_tag_t) -> c_int;
        pub fn acl_set_tag_type(entry: acl_entry_t, tag: acl_tag_t) -> c_int;
        pub fn acl_get_qualifier(entry: acl_entry_t) -> *mut c_void;
        pub fn acl_set_qualifier(entry: acl_entry_t, qualifier_p: *const c_void) -> c_int;
        pub fn acl_get_permset(entry: acl_entry_t, permset_p: *mut acl_permset_t) -> c_int;
        pub fn acl_set_permset(entry: acl_entry_t, permset: acl_permset_t) -> c_int;
        pub fn acl_get_flagset_np(entry: acl_entry_t, flagset_p: *mut acl_flagset_t) -> c_int;
        pub fn acl_set_flagset_np(entry: acl_entry_t, flagset: acl_flagset_t) -> c_int;
        pub fn acl_get_entry_type_np(entry: acl_entry_t, ty_p: *mut acl_entry_type_t) -> c_int;
        pub fn acl_set_entry_type_np(entry: acl_entry_t, ty: acl_entry_type_t) -> c_int;
    }
}

const _: () = assert!(TagType::Unknown as u32 == sys::ACL_UNDEFINED_TAG);
const _: () = assert!(TagType::UserObject as u32 == sys::ACL_USER_OBJ);
const _: () = assert!(TagType::User as u32 == sys::ACL_USER);
const _: () = assert!(TagType::GroupObject as u32 == sys::ACL_GROUP_OBJ);
const _: () = assert!(TagType::Group as u32 == sys::ACL_GROUP);
const _: () = assert!(TagType::Mask as u32 == sys::ACL_MASK);
const _: () = assert!(TagType::Other as u32 == sys::ACL_OTHER);
const _: () = assert!(TagType::Everyone as u32 == sys::ACL_EVERYONE);

const _: () = assert!(Permission::Execute as u32 == sys::ACL_EXECUTE);
const _: () = assert!(Permission::ReadData as u32 == sys::ACL_READ_DATA);
const _: () = assert!(Permission::WriteData as u32 == sys::ACL_WRITE_DATA);
const _: () = assert!(Permission::AppendData as u32 == sys::ACL_APPEND_DATA);
const _: () = assert!(Permission::ReadNamedAttrs as u32 == sys::ACL_READ_NAMED_ATTRS);
const _: () = assert!(Permission::WriteNamedAttrs as u32 == sys::ACL_WRITE_NAMED_ATTRS);
const _: () = assert!(Permission::DeleteChild as u32 == sys::ACL_DELETE_CHILD);
const _: () = assert!(Permission::ReadAttributes as u32 == sys::ACL_READ_ATTRIBUTES);
const _: () = assert!(Permission::WriteAttributes as u32 == sys::ACL_WRITE_ATTRIBUTES);
const _: () = assert!(Permission::Delete as u32 == sys::ACL_DELETE);
const _: () = assert!(Permission::ReadAcl as u32 == sys::ACL_READ_ACL);
const _: () = assert!(Permission::WriteAcl as u32 == sys::ACL_WRITE_ACL);
const _: () = assert!(Permission::WriteOwner as u32 == sys::ACL_WRITE_OWNER);
const _: () = assert!(Permission::Synchronize as u32 == sys::ACL_SYNCHRONIZE);

const _: () = assert!(Flag::FileInherit as u32 == sys::ACL_ENTRY_FILE_INHERIT as u32);
const _: () = assert!(Flag::DirectoryInherit as u32 == sys::ACL_ENTRY_DIRECTORY_INHERIT as u32);
const _: () =
    assert!(Flag::NoPropagateInherit as u32 == sys::ACL_ENTRY_NO_PROPAGATE_INHERIT as u32);
const _: () = assert!(Flag::InheritOnly as u32 == sys::ACL_ENTRY_INHERIT_ONLY as u32);
const _: () = assert!(Flag::SuccessfulAccess as u32 == sys::ACL_ENTRY_SUCCESSFUL_ACCESS as u32);
const _: () = assert!(Flag::FailedAccess as u32 == sys::ACL_ENTRY_FAILED_ACCESS as u32);
const _: () = assert!(Flag::Inherited as u32 == sys::ACL_ENTRY_INHERITED as u32);

/// Owned `acl_t` released with `acl_free`.
struct NativeAcl(sys::acl_t);

impl NativeAcl {
    fn from_raw(raw: sys::acl_t) -> io::Result<Self> {
        if raw.is_null() {
            Err(io::Error::last_os_error())
        } else {
            Ok(Self(raw))
        }
    }

    fn with_capacity(count: usize) -> io::Result<Self> {
        let count = libc::c_int::try_from(count)
            .map_err(|_| io::Error::from_raw_os_error(libc::EINVAL))?;
        // Safety: acl_init only allocates.
        Self::from_raw(unsafe { sys::acl_init(count) })
    }

    const fn as_ptr(&self) -> sys::acl_t {
        self.0
    }

    /// Walks entries until the end-of-list sentinel.
    fn for_each_entry(
        &self,
        mut visit: impl FnMut(sys::acl_entry_t) -> AclResult<()>,
        context: &impl Fn(io::Error) -> AclError,
    ) -> AclResult<()> {
        let mut entry_id = sys::ACL_FIRST_ENTRY;
        loop {
            let mut entry: sys::acl_entry_t = ptr::null_mut();
            // Safety: the ACL stays alive for the whole walk.
            match unsafe { sys::acl_get_entry(self.0, entry_id, &mut entry) } {
                1 => visit(entry)?,
                0 => return Ok(()),
                _ => return Err(context(io::Error::last_os_error())),
            }
            entry_id = sys::ACL_NEXT_ENTRY;
        }
    }

    fn create_entry(&mut self) -> io::Result<sys::acl_entry_t> {
        let mut entry: sys::acl_entry_t = ptr::null_mut();
        // Safety: acl_create_entry may reallocate and update `self.0` in place.
        check(unsafe { sys::acl_create_entry(&mut self.0, &mut entry) })?;
        Ok(entry)
    }
}

impl Drop for NativeAcl {
    fn drop(&mut self) {
        if !self.0.is_null() {
            // Safety: the pointer came from acl_get_* or acl_init.
            unsafe {
                sys::acl_free(self.0);
            }
        }
    }
}

/// Qualifier copy returned by `acl_get_qualifier`.
struct Qualifier(*mut c_void);

impl Drop for Qualifier {
    fn drop(&mut self) {
        if !self.0.is_null() {
            // Safety: acl_get_qualifier hands out memory owned by the caller.
            unsafe {
                sys::acl_free(self.0);
            }
        }
    }
}

fn check(rc: libc::c_int) -> io::Result<()> {
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

fn c_path(path: &Path) -> AclResult<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| AclError::invalid(format!("path '{}' contains a NUL byte", path.display())))
}

const fn kind_from_native(raw: sys::acl_entry_type_t) -> Option<EntryKind> {
    match raw {
        sys::ACL_ENTRY_TYPE_ALLOW => Some(EntryKind::Allow),
        sys::ACL_ENTRY_TYPE_DENY => Some(EntryKind::Deny),
        sys::ACL_ENTRY_TYPE_AUDIT => Some(EntryKind::Audit),
        sys::ACL_ENTRY_TYPE_ALARM => Some(EntryKind::Alarm),
        _ => None,
    }
}

const fn kind_to_native(kind: EntryKind) -> sys::acl_entry_type_t {
    match kind {
        EntryKind::Allow => sys::ACL_ENTRY_TYPE_ALLOW,
        EntryKind::Deny => sys::ACL_ENTRY_TYPE_DENY,
        EntryKind::Audit => sys::ACL_ENTRY_TYPE_AUDIT,
        EntryKind::Alarm => sys::ACL_ENTRY_TYPE_ALARM,
    }
}

fn tag_from_native(raw: sys::acl_tag_t) -> Option<TagType> {
    [
        TagType::UserObject,
        TagType::User,
        TagType::GroupObject,
        TagType::Group,
        TagType::Everyone,
    ]
    .into_iter()
    .find(|tag| *tag as u32 == raw)
}

/// Adapter over the FreeBSD `acl_*` API with `ACL_TYPE_NFS4`.
#[derive(Debug, Clone, Default)]
pub struct FreeBsdAcl<L = SystemIdentity> {
    lookup: L,
}

impl<L: IdentityLookup> FreeBsdAcl<L> {
    /// Creates an adapter resolving names through `lookup`.
    pub const fn new(lookup: L) -> Self {
        Self { lookup }
    }

    fn to_generic(
        &self,
        native: &NativeAcl,
        context: &impl Fn(io::Error) -> AclError,
    ) -> AclResult<GenericAcl> {
        let mut acl = GenericAcl::new(AclType::Nfs4);
        native.for_each_entry(
            |entry| {
                let converted = self.entry_to_generic(entry).map_err(|err| match err {
                    EntryError::Os(err) => context(err),
                    EntryError::Acl(err) => err,
                })?;
                acl.push(converted)
            },
            context,
        )?;
        debug_log!(Acl, 2, "read {} native entries", acl.len());
        Ok(acl)
    }

    fn entry_to_generic(&self, entry: sys::acl_entry_t) -> Result<AclEntry, EntryError> {
        let mut raw_tag: sys::acl_tag_t = 0;
        let mut raw_kind: sys::acl_entry_type_t = 0;
        let mut permset: sys::acl_permset_t = ptr::null_mut();
        let mut flagset: sys::acl_flagset_t = ptr::null_mut();
        // Safety: `entry` was produced by acl_get_entry on a live ACL and the
        // out-pointers reference locals.
        unsafe {
            check(sys::acl_get_tag_type(entry, &mut raw_tag))?;
            check(sys::acl_get_entry_type_np(entry, &mut raw_kind))?;
            check(sys::acl_get_permset(entry, &mut permset))?;
            check(sys::acl_get_flagset_np(entry, &mut flagset))?;
        }

        let tag = tag_from_native(raw_tag).ok_or_else(|| {
            AclError::invalid(format!("unexpected tag {raw_tag:#x} in an NFSv4 ACL"))
        })?;
        let kind = kind_from_native(raw_kind).ok_or_else(|| {
            AclError::invalid(format!("unexpected entry type {raw_kind:#x}"))
        })?;
        // Safety: both sets point into the entry and stay valid while the ACL lives.
        let (perms, flags) = unsafe { (*permset, *flagset) };

        let principal = match tag {
            TagType::UserObject => Principal::owner(),
            TagType::GroupObject => Principal::group_owner(),
            TagType::Everyone => Principal::everyone(),
            _ => {
                // Safety: User and Group entries carry a uid_t/gid_t qualifier.
                let qualifier = Qualifier(unsafe { sys::acl_get_qualifier(entry) });
                if qualifier.0.is_null() {
                    return Err(EntryError::Os(io::Error::last_os_error()));
                }
                // Safety: the qualifier is a non-null uid_t/gid_t copy.
                let id = unsafe { *qualifier.0.cast::<libc::uid_t>() };
                let group = tag == TagType::Group;
                let name = self.lookup.name_for(id, group).unwrap_or_else(|| id.to_string());
                Principal::new(tag, Some(id), name)
            }
        };

        Ok(AclEntry {
            kind,
            principal,
            permissions: Permissions::from_raw(perms),
            flags: Flags::from_raw(u32::from(flags)),
        })
    }

    fn to_native(acl: &GenericAcl) -> AclResult<NativeAcl> {
        let mut native = NativeAcl::with_capacity(acl.len())
            .map_err(|_| AclError::OutOfMemory { requested: acl.len() })?;
        for entry in acl {
            Self::append_native(&mut native, entry).map_err(|err| match err {
                EntryError::Os(err) => AclError::invalid(format!(
                    "cannot express entry for '{}': {err}",
                    entry.principal.label()
                )),
                EntryError::Acl(err) => err,
            })?;
        }
        Ok(native)
    }

    fn append_native(native: &mut NativeAcl, entry: &AclEntry) -> Result<(), EntryError> {
        let tag = entry.principal.tag;
        if matches!(tag, TagType::Mask | TagType::Other | TagType::Unknown) {
            let err = AclError::invalid(format!("{tag:?} principals are not valid in NFSv4 ACLs"));
            return Err(err.into());
        }
        let id = if tag.requires_id() {
            Some(entry.principal.id.ok_or_else(|| {
                AclError::invalid(format!("principal '{}' has no numeric id", entry.principal.name))
            })?)
        } else {
            None
        };

        let native_entry = native.create_entry()?;
        let mut perms: sys::acl_perm_t = entry.permissions.as_raw();
        let mut flags = entry.flags.as_raw() as sys::acl_flag_t;
        // Safety: `native_entry` belongs to `native`; the set pointers reference
        // locals that outlive the calls, which copy the values.
        unsafe {
            check(sys::acl_set_tag_type(native_entry, tag as u32))?;
            if let Some(id) = id {
                let qualifier: libc::uid_t = id;
                check(sys::acl_set_qualifier(
                    native_entry,
                    ptr::from_ref(&qualifier).cast::<c_void>(),
                ))?;
            }
            check(sys::acl_set_entry_type_np(native_entry, kind_to_native(entry.kind)))?;
            check(sys::acl_set_permset(native_entry, &mut perms))?;
            check(sys::acl_set_flagset_np(native_entry, &mut flags))?;
        }
        Ok(())
    }
}

/// Failure while converting one entry.
enum EntryError {
    Os(io::Error),
    Acl(AclError),
}

impl From<io::Error> for EntryError {
    fn from(err: io::Error) -> Self {
        Self::Os(err)
    }
}

impl From<AclError> for EntryError {
    fn from(err: AclError) -> Self {
        Self::Acl(err)
    }
}

impl<L: IdentityLookup> AclBackend for FreeBsdAcl<L> {
    fn read_path(&self, path: &Path, acl_type: AclType, mode: LinkMode) -> AclResult<GenericAcl> {
        require_nfs4(acl_type)?;
        let c_path = c_path(path)?;
        let context = |err| AclError::io("read NFSv4 ACL", path, err);
        // Safety: `c_path` is NUL terminated and outlives the call.
        let raw = unsafe {
            if mode.follows() {
                sys::acl_get_file(c_path.as_ptr(), sys::ACL_TYPE_NFS4)
            } else {
                sys::acl_get_link_np(c_path.as_ptr(), sys::ACL_TYPE_NFS4)
            }
        };
        let native = NativeAcl::from_raw(raw).map_err(context)?;
        self.to_generic(&native, &context)
    }

    fn read_file(&self, file: &File, acl_type: AclType) -> AclResult<GenericAcl> {
        require_nfs4(acl_type)?;
        let fd = file.as_raw_fd();
        let context = |err| AclError::io_fd("read NFSv4 ACL", fd, err);
        // Safety: `fd` is an open descriptor borrowed from `file`.
        let raw = unsafe { sys::acl_get_fd_np(fd, sys::ACL_TYPE_NFS4) };
        let native = NativeAcl::from_raw(raw).map_err(context)?;
        self.to_generic(&native, &context)
    }

    fn write_path(
        &self,
        path: &Path,
        acl_type: AclType,
        acl: &GenericAcl,
        mode: LinkMode,
    ) -> AclResult<()> {
        require_nfs4(acl_type)?;
        let c_path = c_path(path)?;
        let native = Self::to_native(acl)?;
        // Safety: both pointers are valid for the duration of the call.
        let rc = unsafe {
            if mode.follows() {
                sys::acl_set_file(c_path.as_ptr(), sys::ACL_TYPE_NFS4, native.as_ptr())
            } else {
                sys::acl_set_link_np(c_path.as_ptr(), sys::ACL_TYPE_NFS4, native.as_ptr())
            }
        };
        check(rc).map_err(|err| AclError::io("write NFSv4 ACL", path, err))
    }

    fn write_file(&self, file: &File, acl_type: AclType, acl: &GenericAcl) -> AclResult<()> {
        require_nfs4(acl_type)?;
        let native = Self::to_native(acl)?;
        let fd = file.as_raw_fd();
        // Safety: `fd` is an open descriptor and `native` outlives the call.
        let rc = unsafe { sys::acl_set_fd_np(fd, native.as_ptr(), sys::ACL_TYPE_NFS4) };
        check(rc).map_err(|err| AclError::io_fd("write NFSv4 ACL", fd, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticIdentity;

    #[test]
    fn entry_kinds_map_both_ways() {
        for kind in [EntryKind::Allow, EntryKind::Deny, EntryKind::Audit, EntryKind::Alarm] {
            assert_eq!(kind_from_native(kind_to_native(kind)), Some(kind));
        }
        assert_eq!(kind_from_native(0), None);
    }

    #[test]
    fn posix_only_tags_are_rejected_on_read() {
        assert_eq!(tag_from_native(sys::ACL_MASK), None);
        assert_eq!(tag_from_native(sys::ACL_OTHER), None);
        assert_eq!(tag_from_native(sys::ACL_EVERYONE), Some(TagType::Everyone));
    }

    #[test]
    fn native_acl_preserves_order() {
        let mut acl = GenericAcl::new(AclType::Nfs4);
        acl.push(AclEntry::deny(Principal::user(1001)).with_permissions(Permission::WriteData))
            .expect("push");
        acl.push(AclEntry::allow(Principal::owner()).with_permissions(Permission::ReadData))
            .expect("push");
        acl.push(AclEntry::allow(Principal::group(0)).with_flags(Flag::FileInherit))
            .expect("push");

        let native = FreeBsdAcl::<StaticIdentity>::to_native(&acl).expect("native");
        let backend = FreeBsdAcl::new(StaticIdentity::new().group(0, "wheel"));
        let context = |err| AclError::io("test", Path::new("/"), err);
        let back = backend.to_generic(&native, &context).expect("generic");

        assert_eq!(back.len(), 3);
        assert_eq!(back.get(0).expect("e0").principal.id, Some(1001));
        assert_eq!(back.get(0).expect("e0").principal.name, "1001");
        assert_eq!(back.get(1).expect("e1").principal.tag, TagType::UserObject);
        assert_eq!(back.get(2).expect("e2").principal.name, "wheel");
        assert_eq!(back.get(2).expect("e2").flags, Flags::from(Flag::FileInherit));
    }

    #[test]
    fn missing_ids_are_invalid() {
        let mut acl = GenericAcl::new(AclType::Nfs4);
        acl.push(AclEntry::allow(Principal::new(TagType::User, None, "nobody?")))
            .expect("push");
        let err = FreeBsdAcl::<StaticIdentity>::to_native(&acl).err().expect("no id");
        assert_eq!(err.kind(), model::AclErrorKind::InvalidArgument);
    }
}
