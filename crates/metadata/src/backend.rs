//! crates/metadata/src/backend.rs
//!
//! The per-platform adapter seam and the path/descriptor facade over it.
//!
//! Exactly one [`AclBackend`] implementation is compiled for a target and
//! exported as [`HostAcl`].

use std::fs::File;
use std::path::Path;

use model::{AclError, AclResult, AclType, GenericAcl};

use crate::options::{AclOptions, LinkMode};

/// Conversion between a file's native ACL and [`GenericAcl`].
///
/// Writers assemble the complete native representation before installing it,
/// so a failed conversion never leaves a partial ACL on the target.
pub trait AclBackend {
    /// Reads the ACL of `path`.
    fn read_path(&self, path: &Path, acl_type: AclType, mode: LinkMode) -> AclResult<GenericAcl>;

    /// Reads the ACL of an open file.
    fn read_file(&self, file: &File, acl_type: AclType) -> AclResult<GenericAcl>;

    /// Replaces the ACL of `path` with `acl`.
    fn write_path(
        &self,
        path: &Path,
        acl_type: AclType,
        acl: &GenericAcl,
        mode: LinkMode,
    ) -> AclResult<()>;

    /// Replaces the ACL of an open file with `acl`.
    fn write_file(&self, file: &File, acl_type: AclType, acl: &GenericAcl) -> AclResult<()>;
}

/// Native adapter for the current build target.
#[cfg(all(feature = "acl", target_os = "linux"))]
pub type HostAcl = crate::acl_linux::XattrAcl;

/// Native adapter for the current build target.
#[cfg(all(feature = "acl", target_os = "freebsd"))]
pub type HostAcl = crate::acl_freebsd::FreeBsdAcl;

/// Native adapter for the current build target.
#[cfg(all(feature = "acl", any(target_os = "solaris", target_os = "illumos")))]
pub type HostAcl = crate::acl_solaris::SolarisAcl;

/// Native adapter for the current build target.
#[cfg(all(feature = "acl", target_os = "macos"))]
pub type HostAcl = crate::acl_macos::MacOsAcl;

/// Native adapter for the current build target.
#[cfg(not(all(
    feature = "acl",
    any(
        target_os = "linux",
        target_os = "freebsd",
        target_os = "solaris",
        target_os = "illumos",
        target_os = "macos"
    )
)))]
pub type HostAcl = crate::acl_noop::UnsupportedAcl;

/// Rejects ACL families other than NFSv4.
pub(crate) fn require_nfs4(acl_type: AclType) -> AclResult<()> {
    match acl_type {
        AclType::Nfs4 => Ok(()),
        other => Err(AclError::unsupported(format!(
            "{other:?} ACLs are not supported; only NFSv4 ACLs can be converted"
        ))),
    }
}

/// Reads the ACL of `path` with the host adapter.
///
/// # Examples
///
/// ```no_run
/// use metadata::{AclOptions, get_acl};
///
/// let acl = get_acl("/srv/share/report.txt".as_ref(), &AclOptions::new())?;
/// for entry in &acl {
///     println!("{} {}", entry.principal.label(), entry.permissions);
/// }
/// # Ok::<(), model::AclError>(())
/// ```
pub fn get_acl(path: &Path, options: &AclOptions) -> AclResult<GenericAcl> {
    HostAcl::default().read_path(path, options.selected_type(), options.link_mode())
}

/// Reads the ACL of an open file with the host adapter.
pub fn get_acl_fd(file: &File, options: &AclOptions) -> AclResult<GenericAcl> {
    HostAcl::default().read_file(file, options.selected_type())
}

/// Replaces the ACL of `path` with the host adapter.
pub fn set_acl(path: &Path, acl: &GenericAcl, options: &AclOptions) -> AclResult<()> {
    HostAcl::default().write_path(path, options.selected_type(), acl, options.link_mode())
}

/// Replaces the ACL of an open file with the host adapter.
pub fn set_acl_fd(file: &File, acl: &GenericAcl, options: &AclOptions) -> AclResult<()> {
    HostAcl::default().write_file(file, options.selected_type(), acl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::AclErrorKind;

    #[test]
    fn only_nfs4_is_accepted() {
        assert!(require_nfs4(AclType::Nfs4).is_ok());
        for other in [AclType::Access, AclType::Default] {
            let err = require_nfs4(other).expect_err("rejected");
            assert_eq!(err.kind(), AclErrorKind::OperationNotSupported);
        }
    }

    #[test]
    fn facade_rejects_posix_families() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("file");
        std::fs::write(&path, b"x").expect("write");

        let options = AclOptions::new().acl_type(AclType::Access);
        let err = get_acl(&path, &options).expect_err("posix family");
        assert_eq!(err.kind(), AclErrorKind::OperationNotSupported);

        let file = File::open(&path).expect("open");
        let err = set_acl_fd(&file, &GenericAcl::new(AclType::Access), &options)
            .expect_err("posix family");
        assert_eq!(err.kind(), AclErrorKind::OperationNotSupported);
    }

    #[test]
    fn facade_reports_missing_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = get_acl(&dir.path().join("absent"), &AclOptions::new()).expect_err("missing");
        assert!(matches!(
            err.kind(),
            AclErrorKind::Io | AclErrorKind::OperationNotSupported
        ));
    }
}
