#![cfg(all(feature = "acl", any(target_os = "solaris", target_os = "illumos")))]
#![allow(unsafe_code)]

//! # Solaris/illumos NFSv4 ACL Support
//!
//! ZFS exposes NFSv4 ACLs as arrays of `ace_t` through `acl(2)` and
//! `facl(2)`. Neither call can target a symbolic link itself, so link-mode
//! requests on a symlink report [`AclError::Unsupported`].

use std::ffi::CString;
use std::fs::{self, File};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr;

use logging::debug_log;
use model::{AclError, AclResult, AclType, GenericAcl};

use crate::ace_mapping::{RawAce, acl_to_aces, aces_to_acl};
use crate::backend::{AclBackend, require_nfs4};
use crate::identity::{IdentityLookup, SystemIdentity};
use crate::options::LinkMode;

mod sys {
    use libc::{c_char, c_int, c_void};

    pub const ACE_GETACL: c_int = 4;
    pub const ACE_SETACL: c_int = 5;
    pub const ACE_GETACLCNT: c_int = 6;

    unsafe extern "C" {
        pub fn acl(
            path: *const c_char,
            cmd: c_int,
            nentries: c_int,
            aclbufp: *mut c_void,
        ) -> c_int;
        pub fn facl(fd: c_int, cmd: c_int, nentries: c_int, aclbufp: *mut c_void) -> c_int;
    }
}

/// Runs the count-then-fetch protocol shared by `acl(2)` and `facl(2)`.
fn fetch_aces(
    call: impl Fn(libc::c_int, libc::c_int, *mut libc::c_void) -> libc::c_int,
) -> io::Result<Vec<RawAce>> {
    let count = call(sys::ACE_GETACLCNT, 0, ptr::null_mut());
    if count < 0 {
        return Err(io::Error::last_os_error());
    }
    let mut aces = vec![RawAce::default(); count as usize];
    let fetched = call(sys::ACE_GETACL, count, aces.as_mut_ptr().cast());
    if fetched < 0 {
        return Err(io::Error::last_os_error());
    }
    aces.truncate(fetched as usize);
    Ok(aces)
}

fn entry_count(aces: &[RawAce]) -> AclResult<libc::c_int> {
    libc::c_int::try_from(aces.len())
        .map_err(|_| AclError::invalid(format!("{} entries exceed the ace_t limit", aces.len())))
}

fn c_path(path: &Path) -> AclResult<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| AclError::invalid(format!("path '{}' contains a NUL byte", path.display())))
}

/// Fails when `path` is a symlink and the caller asked not to follow it.
fn reject_link_target(path: &Path, mode: LinkMode) -> AclResult<()> {
    if mode.follows() {
        return Ok(());
    }
    let metadata =
        fs::symlink_metadata(path).map_err(|err| AclError::io("inspect", path, err))?;
    if metadata.file_type().is_symlink() {
        return Err(AclError::unsupported(format!(
            "cannot operate on the ACL of symbolic link '{}' itself",
            path.display()
        )));
    }
    Ok(())
}

/// Adapter over `acl(2)`/`facl(2)` with `ace_t` buffers.
#[derive(Debug, Clone, Default)]
pub struct SolarisAcl<L = SystemIdentity> {
    lookup: L,
}

impl<L: IdentityLookup> SolarisAcl<L> {
    /// Creates an adapter resolving names through `lookup`.
    pub const fn new(lookup: L) -> Self {
        Self { lookup }
    }
}

impl<L: IdentityLookup> AclBackend for SolarisAcl<L> {
    fn read_path(&self, path: &Path, acl_type: AclType, mode: LinkMode) -> AclResult<GenericAcl> {
        require_nfs4(acl_type)?;
        reject_link_target(path, mode)?;
        let c_path = c_path(path)?;
        // Safety: `c_path` outlives every call and the buffer matches `nentries`.
        let aces =
            fetch_aces(|cmd, count, buf| unsafe { sys::acl(c_path.as_ptr(), cmd, count, buf) })
                .map_err(|err| AclError::io("read NFSv4 ACL", path, err))?;
        debug_log!(Acl, 2, "read {} aces from {}", aces.len(), path.display());
        aces_to_acl(&aces, &self.lookup)
    }

    fn read_file(&self, file: &File, acl_type: AclType) -> AclResult<GenericAcl> {
        require_nfs4(acl_type)?;
        let fd = file.as_raw_fd();
        // Safety: `fd` is borrowed from `file` and the buffer matches `nentries`.
        let aces = fetch_aces(|cmd, count, buf| unsafe { sys::facl(fd, cmd, count, buf) })
            .map_err(|err| AclError::io_fd("read NFSv4 ACL", fd, err))?;
        aces_to_acl(&aces, &self.lookup)
    }

    fn write_path(
        &self,
        path: &Path,
        acl_type: AclType,
        acl: &GenericAcl,
        mode: LinkMode,
    ) -> AclResult<()> {
        require_nfs4(acl_type)?;
        reject_link_target(path, mode)?;
        let c_path = c_path(path)?;
        let mut aces = acl_to_aces(acl)?;
        let count = entry_count(&aces)?;
        // Safety: `aces` holds exactly `count` layout-compatible records.
        let rc = unsafe {
            sys::acl(
                c_path.as_ptr(),
                sys::ACE_SETACL,
                count,
                aces.as_mut_ptr().cast(),
            )
        };
        if rc < 0 {
            return Err(AclError::io("write NFSv4 ACL", path, io::Error::last_os_error()));
        }
        Ok(())
    }

    fn write_file(&self, file: &File, acl_type: AclType, acl: &GenericAcl) -> AclResult<()> {
        require_nfs4(acl_type)?;
        let mut aces = acl_to_aces(acl)?;
        let count = entry_count(&aces)?;
        let fd = file.as_raw_fd();
        // Safety: `fd` is borrowed from `file`; `aces` holds `count` records.
        let rc = unsafe { sys::facl(fd, sys::ACE_SETACL, count, aces.as_mut_ptr().cast()) };
        if rc < 0 {
            return Err(AclError::io_fd("write NFSv4 ACL", fd, io::Error::last_os_error()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::AclErrorKind;
    use std::os::unix::fs::symlink;

    #[test]
    fn link_targeted_requests_are_unsupported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("target");
        fs::write(&target, b"x").expect("write");
        let link = dir.path().join("link");
        symlink(&target, &link).expect("symlink");

        let err = SolarisAcl::<SystemIdentity>::default()
            .read_path(&link, AclType::Nfs4, LinkMode::NoFollow)
            .expect_err("link");
        assert_eq!(err.kind(), AclErrorKind::OperationNotSupported);
        assert!(reject_link_target(&target, LinkMode::NoFollow).is_ok());
    }
}
