//! Universal ACL stub for builds without native ACL support.
//!
//! Used when the `acl` feature is disabled or the target has no ACL
//! implementation (e.g., Windows, Android). Every call fails with
//! [`AclError::Unsupported`](model::AclError::Unsupported).

use std::fs::File;
use std::path::Path;
use std::sync::Once;

use logging::trace_acl_warn;
use model::{AclError, AclResult, AclType, GenericAcl};

use crate::backend::{AclBackend, require_nfs4};
use crate::options::LinkMode;

/// Emits a one-time warning that ACLs are not supported on this platform.
fn warn_acl_unsupported() {
    static WARN_ONCE: Once = Once::new();
    WARN_ONCE.call_once(|| {
        trace_acl_warn!("ACLs are not supported on this platform");
    });
}

fn unsupported(acl_type: AclType) -> AclError {
    warn_acl_unsupported();
    match require_nfs4(acl_type) {
        Err(err) => err,
        Ok(()) => AclError::unsupported("native ACL support is not available in this build"),
    }
}

/// Adapter that reports every operation as unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedAcl;

impl AclBackend for UnsupportedAcl {
    fn read_path(&self, _path: &Path, acl_type: AclType, _mode: LinkMode) -> AclResult<GenericAcl> {
        Err(unsupported(acl_type))
    }

    fn read_file(&self, _file: &File, acl_type: AclType) -> AclResult<GenericAcl> {
        Err(unsupported(acl_type))
    }

    fn write_path(
        &self,
        _path: &Path,
        acl_type: AclType,
        _acl: &GenericAcl,
        _mode: LinkMode,
    ) -> AclResult<()> {
        Err(unsupported(acl_type))
    }

    fn write_file(&self, _file: &File, acl_type: AclType, _acl: &GenericAcl) -> AclResult<()> {
        Err(unsupported(acl_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::AclErrorKind;

    #[test]
    fn every_operation_is_unsupported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("file");
        std::fs::write(&path, b"x").expect("write");
        let file = File::open(&path).expect("open");
        let acl = GenericAcl::new(AclType::Nfs4);
        let backend = UnsupportedAcl;

        let errors = [
            backend.read_path(&path, AclType::Nfs4, LinkMode::Follow).expect_err("read"),
            backend.read_file(&file, AclType::Nfs4).expect_err("read fd"),
            backend
                .write_path(&path, AclType::Nfs4, &acl, LinkMode::NoFollow)
                .expect_err("write"),
            backend.write_file(&file, AclType::Nfs4, &acl).expect_err("write fd"),
        ];
        for err in errors {
            assert_eq!(err.kind(), AclErrorKind::OperationNotSupported);
        }
    }
}
