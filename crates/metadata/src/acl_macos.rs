#![cfg(all(feature = "acl", target_os = "macos"))]
#![allow(unsafe_code)]

//! # macOS Extended ACL Support
//!
//! macOS stores NFSv4-style entries as `ACL_TYPE_EXTENDED`. Each entry names
//! its principal with a GUID qualifier, which `mbr_*` from libSystem's
//! membership API converts to and from uids and gids. Only allow and deny
//! entries for explicit users and groups exist in this model; the owner,
//! owning-group and everyone principals are not expressible.
//!
//! Files without an extended ACL read back as an empty ACL.

use std::ffi::{CString, c_void};
use std::fs::{self, File};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr;

use logging::debug_log;
use model::{AclEntry, AclError, AclResult, AclType, GenericAcl};

use crate::backend::{AclBackend, require_nfs4};
use crate::guid_mapping::{
    Guid, IdKind, MembershipResolver, flags_from_native, guid_for_principal, kind_from_tag,
    native_flag_bits, native_permission_bits, permissions_from_native, principal_from_guid,
    tag_for_kind,
};
use crate::identity::{IdentityLookup, SystemIdentity};
use crate::options::LinkMode;

mod sys {
    #![allow(non_camel_case_types)]

    use libc::{c_char, c_int, c_void, id_t, uid_t, gid_t};

    pub type acl_t = *mut c_void;
    pub type acl_entry_t = *mut c_void;
    pub type acl_permset_t = *mut c_void;
    pub type acl_flagset_t = *mut c_void;
    pub type acl_type_t = c_int;
    pub type acl_tag_t = c_int;
    pub type acl_perm_t = c_int;
    pub type acl_flag_t = c_int;

    pub const ACL_TYPE_EXTENDED: acl_type_t = 0x0000_0100;

    pub const ACL_FIRST_ENTRY: c_int = 0;
    pub const ACL_NEXT_ENTRY: c_int = -1;

    pub const ID_TYPE_UID: c_int = 0;
    pub const ID_TYPE_GID: c_int = 1;

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
        pub fn acl_create_entry_np(
            acl_p: *mut acl_t,
            entry_p: *mut acl_entry_t,
            index: c_int,
        ) -> c_int;
        pub fn acl_get_tag_type(entry: acl_entry_t, tag_p: *mut acl_tag_t) -> c_int;
        pub fn acl_set_tag_type(entry: acl_entry_t, tag: acl_tag_t) -> c_int;
        pub fn acl_get_qualifier(entry: acl_entry_t) -> *mut c_void;
        pub fn acl_set_qualifier(entry: acl_entry_t, qualifier_p: *const c_void) -> c_int;
        pub fn acl_get_permset(entry: acl_entry_t, permset_p: *mut acl_permset_t) -> c_int;
        pub fn acl_set_permset(entry: acl_entry_t, permset: acl_permset_t) -> c_int;
        pub fn acl_get_perm_np(permset: acl_permset_t, perm: acl_perm_t) -> c_int;
        pub fn acl_clear_perms(permset: acl_permset_t) -> c_int;
        pub fn acl_add_perm(permset: acl_permset_t, perm: acl_perm_t) -> c_int;
        pub fn acl_get_flagset_np(obj_p: *mut c_void, flagset_p: *mut acl_flagset_t) -> c_int;
        pub fn acl_set_flagset_np(obj_p: *mut c_void, flagset: acl_flagset_t) -> c_int;
        pub fn acl_get_flag_np(flagset: acl_flagset_t, flag: acl_flag_t) -> c_int;
        pub fn acl_clear_flags_np(flagset: acl_flagset_t) -> c_int;
        pub fn acl_add_flag_np(flagset: acl_flagset_t, flag: acl_flag_t) -> c_int;

        pub fn mbr_uuid_to_id(uu: *const u8, id: *mut id_t, id_type: *mut c_int) -> c_int;
        pub fn mbr_uid_to_uuid(uid: uid_t, uu: *mut u8) -> c_int;
        pub fn mbr_gid_to_uuid(gid: gid_t, uu: *mut u8) -> c_int;
    }
}

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

    /// Walks entries until acl_get_entry reports `EINVAL` past the end.
    fn for_each_entry(
        &self,
        mut visit: impl FnMut(sys::acl_entry_t) -> AclResult<()>,
        context: &impl Fn(io::Error) -> AclError,
    ) -> AclResult<()> {
        let mut entry_id = sys::ACL_FIRST_ENTRY;
        loop {
            let mut entry: sys::acl_entry_t = ptr::null_mut();
            // Safety: the ACL stays alive for the whole walk.
            if unsafe { sys::acl_get_entry(self.0, entry_id, &mut entry) } != 0 {
                let err = io::Error::last_os_error();
                return match err.raw_os_error() {
                    Some(libc::EINVAL) => Ok(()),
                    _ => Err(context(err)),
                };
            }
            visit(entry)?;
            entry_id = sys::ACL_NEXT_ENTRY;
        }
    }

    fn create_entry(&mut self, index: usize) -> io::Result<sys::acl_entry_t> {
        let index = libc::c_int::try_from(index)
            .map_err(|_| io::Error::from_raw_os_error(libc::EINVAL))?;
        let mut entry: sys::acl_entry_t = ptr::null_mut();
        // Safety: acl_create_entry_np may reallocate and update `self.0` in place.
        check(unsafe { sys::acl_create_entry_np(&mut self.0, &mut entry, index) })?;
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

/// GUID copy returned by `acl_get_qualifier`.
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

/// The membership calls return an errno value instead of setting `errno`.
fn check_membership(rc: libc::c_int) -> io::Result<()> {
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::from_raw_os_error(rc))
    }
}

fn c_path(path: &Path) -> AclResult<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| AclError::invalid(format!("path '{}' contains a NUL byte", path.display())))
}

/// Treats the `ENOENT` that signals "no extended ACL" as an empty ACL.
fn absent_acl(err: &io::Error, exists: impl FnOnce() -> bool) -> bool {
    err.raw_os_error() == Some(libc::ENOENT) && exists()
}

/// Resolver backed by the libSystem membership API.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMembership;

impl MembershipResolver for SystemMembership {
    fn guid_to_id(&self, guid: &Guid) -> io::Result<Option<(u32, IdKind)>> {
        let mut id: libc::id_t = 0;
        let mut id_type: libc::c_int = -1;
        // Safety: `guid` is 16 bytes and both out-pointers reference locals.
        check_membership(unsafe { sys::mbr_uuid_to_id(guid.as_ptr(), &mut id, &mut id_type) })?;
        Ok(match id_type {
            sys::ID_TYPE_UID => Some((id, IdKind::User)),
            sys::ID_TYPE_GID => Some((id, IdKind::Group)),
            _ => None,
        })
    }

    fn uid_to_guid(&self, uid: u32) -> io::Result<Guid> {
        let mut guid = [0u8; 16];
        // Safety: `guid` provides the 16 writable bytes the call expects.
        check_membership(unsafe { sys::mbr_uid_to_uuid(uid, guid.as_mut_ptr()) })?;
        Ok(guid)
    }

    fn gid_to_guid(&self, gid: u32) -> io::Result<Guid> {
        let mut guid = [0u8; 16];
        // Safety: `guid` provides the 16 writable bytes the call expects.
        check_membership(unsafe { sys::mbr_gid_to_uuid(gid, guid.as_mut_ptr()) })?;
        Ok(guid)
    }
}

/// Adapter over the macOS `acl_*` API with `ACL_TYPE_EXTENDED`.
#[derive(Debug, Clone, Default)]
pub struct MacOsAcl<L = SystemIdentity> {
    lookup: L,
    membership: SystemMembership,
}

impl<L: IdentityLookup> MacOsAcl<L> {
    /// Creates an adapter resolving names through `lookup`.
    pub const fn new(lookup: L) -> Self {
        Self {
            lookup,
            membership: SystemMembership,
        }
    }

    fn to_generic(
        &self,
        native: &NativeAcl,
        context: &impl Fn(io::Error) -> AclError,
    ) -> AclResult<GenericAcl> {
        let mut acl = GenericAcl::new(AclType::Nfs4);
        native.for_each_entry(|entry| acl.push(self.entry_to_generic(entry, context)?), context)?;
        debug_log!(Acl, 2, "read {} extended entries", acl.len());
        Ok(acl)
    }

    fn entry_to_generic(
        &self,
        entry: sys::acl_entry_t,
        context: &impl Fn(io::Error) -> AclError,
    ) -> AclResult<AclEntry> {
        let mut raw_tag: sys::acl_tag_t = 0;
        let mut permset: sys::acl_permset_t = ptr::null_mut();
        let mut flagset: sys::acl_flagset_t = ptr::null_mut();
        // Safety: `entry` belongs to a live ACL and the out-pointers reference locals.
        unsafe {
            check(sys::acl_get_tag_type(entry, &mut raw_tag)).map_err(context)?;
            check(sys::acl_get_permset(entry, &mut permset)).map_err(context)?;
            check(sys::acl_get_flagset_np(entry, &mut flagset)).map_err(context)?;
        }
        let kind = kind_from_tag(u32::try_from(raw_tag).unwrap_or(0))?;

        // Safety: extended entries always carry a GUID qualifier.
        let qualifier = Qualifier(unsafe { sys::acl_get_qualifier(entry) });
        if qualifier.0.is_null() {
            return Err(context(io::Error::last_os_error()));
        }
        // Safety: the qualifier points at a 16-byte guid_t.
        let guid: Guid = unsafe { *qualifier.0.cast::<Guid>() };
        let principal = principal_from_guid(&guid, &self.membership, &self.lookup, context)?;

        // Safety: the sets stay valid while the ACL lives.
        let permissions =
            permissions_from_native(|bit| unsafe { sys::acl_get_perm_np(permset, bit as _) } == 1);
        let flags =
            flags_from_native(|bit| unsafe { sys::acl_get_flag_np(flagset, bit as _) } == 1);

        Ok(AclEntry {
            kind,
            principal,
            permissions,
            flags,
        })
    }

    fn to_native(&self, acl: &GenericAcl) -> AclResult<NativeAcl> {
        let mut native = NativeAcl::with_capacity(acl.len())
            .map_err(|_| AclError::OutOfMemory { requested: acl.len() })?;
        for (index, entry) in acl.iter().enumerate() {
            self.append_native(&mut native, index, entry)?;
        }
        Ok(native)
    }

    fn append_native(&self, native: &mut NativeAcl, index: usize, entry: &AclEntry) -> AclResult<()> {
        let label = entry.principal.label();
        let context = |err: io::Error| {
            AclError::invalid(format!("cannot express entry for '{label}': {err}"))
        };
        let tag = tag_for_kind(entry.kind)?;
        let guid = guid_for_principal(&entry.principal, &self.membership, &context)?;

        let native_entry = native.create_entry(index).map_err(context)?;
        let mut permset: sys::acl_permset_t = ptr::null_mut();
        let mut flagset: sys::acl_flagset_t = ptr::null_mut();
        // Safety: `native_entry` belongs to `native`; the qualifier and set
        // pointers reference values that outlive the calls.
        unsafe {
            check(sys::acl_set_tag_type(native_entry, tag as sys::acl_tag_t)).map_err(context)?;
            check(sys::acl_set_qualifier(native_entry, guid.as_ptr().cast::<c_void>()))
                .map_err(context)?;

            check(sys::acl_get_permset(native_entry, &mut permset)).map_err(context)?;
            check(sys::acl_clear_perms(permset)).map_err(context)?;
            for bit in native_permission_bits(entry.permissions) {
                check(sys::acl_add_perm(permset, bit as sys::acl_perm_t)).map_err(context)?;
            }
            check(sys::acl_set_permset(native_entry, permset)).map_err(context)?;

            check(sys::acl_get_flagset_np(native_entry, &mut flagset)).map_err(context)?;
            check(sys::acl_clear_flags_np(flagset)).map_err(context)?;
            for bit in native_flag_bits(entry.flags) {
                check(sys::acl_add_flag_np(flagset, bit as sys::acl_flag_t)).map_err(context)?;
            }
            check(sys::acl_set_flagset_np(native_entry, flagset)).map_err(context)?;
        }
        Ok(())
    }
}

impl<L: IdentityLookup> AclBackend for MacOsAcl<L> {
    fn read_path(&self, path: &Path, acl_type: AclType, mode: LinkMode) -> AclResult<GenericAcl> {
        require_nfs4(acl_type)?;
        let c_path = c_path(path)?;
        let context = |err| AclError::io("read extended ACL", path, err);
        // Safety: `c_path` is NUL terminated and outlives the call.
        let raw = unsafe {
            if mode.follows() {
                sys::acl_get_file(c_path.as_ptr(), sys::ACL_TYPE_EXTENDED)
            } else {
                sys::acl_get_link_np(c_path.as_ptr(), sys::ACL_TYPE_EXTENDED)
            }
        };
        match NativeAcl::from_raw(raw) {
            Ok(native) => self.to_generic(&native, &context),
            Err(err) if absent_acl(&err, || object_exists(path, mode)) => {
                debug_log!(Acl, 2, "{} has no extended ACL", path.display());
                Ok(GenericAcl::new(AclType::Nfs4))
            }
            Err(err) => Err(context(err)),
        }
    }

    fn read_file(&self, file: &File, acl_type: AclType) -> AclResult<GenericAcl> {
        require_nfs4(acl_type)?;
        let fd = file.as_raw_fd();
        let context = |err| AclError::io_fd("read extended ACL", fd, err);
        // Safety: `fd` is an open descriptor borrowed from `file`.
        let raw = unsafe { sys::acl_get_fd_np(fd, sys::ACL_TYPE_EXTENDED) };
        match NativeAcl::from_raw(raw) {
            Ok(native) => self.to_generic(&native, &context),
            Err(err) if absent_acl(&err, || true) => Ok(GenericAcl::new(AclType::Nfs4)),
            Err(err) => Err(context(err)),
        }
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
        let native = self.to_native(acl)?;
        // Safety: both pointers are valid for the duration of the call.
        let rc = unsafe {
            if mode.follows() {
                sys::acl_set_file(c_path.as_ptr(), sys::ACL_TYPE_EXTENDED, native.as_ptr())
            } else {
                sys::acl_set_link_np(c_path.as_ptr(), sys::ACL_TYPE_EXTENDED, native.as_ptr())
            }
        };
        check(rc).map_err(|err| AclError::io("write extended ACL", path, err))?;
        debug_log!(Acl, 1, "wrote {} entries to {}", acl.len(), path.display());
        Ok(())
    }

    fn write_file(&self, file: &File, acl_type: AclType, acl: &GenericAcl) -> AclResult<()> {
        require_nfs4(acl_type)?;
        let native = self.to_native(acl)?;
        let fd = file.as_raw_fd();
        // Safety: `fd` is an open descriptor and `native` outlives the call.
        let rc = unsafe { sys::acl_set_fd_np(fd, native.as_ptr(), sys::ACL_TYPE_EXTENDED) };
        check(rc).map_err(|err| AclError::io_fd("write extended ACL", fd, err))
    }
}

fn object_exists(path: &Path, mode: LinkMode) -> bool {
    if mode.follows() {
        fs::metadata(path).is_ok()
    } else {
        fs::symlink_metadata(path).is_ok()
    }
}
