#![cfg(all(feature = "acl", target_os = "linux"))]

//! # Linux NFSv4 ACL Support
//!
//! Linux has no native NFSv4 ACL syscall family. NFS clients expose the
//! server's ACL through the `system.nfs4_acl` extended attribute instead; this
//! adapter moves [`GenericAcl`] values through that attribute with the
//! [`Nfs4Codec`].
//!
//! Filesystems without NFSv4 ACLs report `ENODATA` or `EOPNOTSUPP`, which
//! surface as [`AclError::Io`] with the original errno.

use std::ffi::OsStr;
use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use logging::debug_log;
use model::{AclError, AclResult, AclType, GenericAcl};
use xattr::FileExt;

use crate::backend::{AclBackend, require_nfs4};
use crate::identity::{IdentityLookup, SystemIdentity};
use crate::nfsv4_acl::{NFS4_ACL_XATTR, Nfs4Codec};
use crate::options::LinkMode;

fn attr_name() -> &'static OsStr {
    OsStr::new(NFS4_ACL_XATTR)
}

fn no_attribute() -> io::Error {
    io::Error::from_raw_os_error(libc::ENODATA)
}

/// Adapter storing ACLs in the `system.nfs4_acl` extended attribute.
#[derive(Debug, Clone)]
pub struct XattrAcl<L = SystemIdentity> {
    codec: Nfs4Codec<L>,
}

impl Default for XattrAcl<SystemIdentity> {
    fn default() -> Self {
        Self::new(Nfs4Codec::system())
    }
}

impl<L: IdentityLookup> XattrAcl<L> {
    /// Creates an adapter around `codec`.
    pub const fn new(codec: Nfs4Codec<L>) -> Self {
        Self { codec }
    }

    fn decode_value(
        &self,
        value: Option<Vec<u8>>,
        context: impl Fn(io::Error) -> AclError,
    ) -> AclResult<GenericAcl> {
        let value = value.ok_or_else(|| context(no_attribute()))?;
        debug_log!(Acl, 2, "read {} bytes of {}", value.len(), NFS4_ACL_XATTR);
        self.codec.decode(&value)
    }
}

impl<L: IdentityLookup> AclBackend for XattrAcl<L> {
    fn read_path(&self, path: &Path, acl_type: AclType, mode: LinkMode) -> AclResult<GenericAcl> {
        require_nfs4(acl_type)?;
        let value = if mode.follows() {
            xattr::get_deref(path, attr_name())
        } else {
            xattr::get(path, attr_name())
        };
        let context = |err| AclError::io("read NFSv4 ACL", path, err);
        self.decode_value(value.map_err(context)?, context)
    }

    fn read_file(&self, file: &File, acl_type: AclType) -> AclResult<GenericAcl> {
        require_nfs4(acl_type)?;
        let fd = file.as_raw_fd();
        let context = |err| AclError::io_fd("read NFSv4 ACL", fd, err);
        let value = file.get_xattr(attr_name()).map_err(context)?;
        self.decode_value(value, context)
    }

    fn write_path(
        &self,
        path: &Path,
        acl_type: AclType,
        acl: &GenericAcl,
        mode: LinkMode,
    ) -> AclResult<()> {
        require_nfs4(acl_type)?;
        let value = self.codec.encode_to_vec(acl)?;
        let result = if mode.follows() {
            xattr::set_deref(path, attr_name(), &value)
        } else {
            xattr::set(path, attr_name(), &value)
        };
        result.map_err(|err| AclError::io("write NFSv4 ACL", path, err))?;
        debug_log!(Acl, 1, "wrote {} entries to {}", acl.len(), path.display());
        Ok(())
    }

    fn write_file(&self, file: &File, acl_type: AclType, acl: &GenericAcl) -> AclResult<()> {
        require_nfs4(acl_type)?;
        let value = self.codec.encode_to_vec(acl)?;
        file.set_xattr(attr_name(), &value)
            .map_err(|err| AclError::io_fd("write NFSv4 ACL", file.as_raw_fd(), err))
    }
}

/// Returns true if `path` carries a `system.nfs4_acl` attribute.
pub fn has_nfs4_acl(path: &Path, mode: LinkMode) -> AclResult<bool> {
    let names = if mode.follows() {
        xattr::list_deref(path)
    } else {
        xattr::list(path)
    };
    let mut names = names.map_err(|err| AclError::io("list extended attributes", path, err))?;
    Ok(names.any(|name| name.as_os_str() == attr_name()))
}
