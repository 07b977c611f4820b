#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `gacl` is the entry point a command layer links against. It re-exports
//! the portable ACL model, the host adapters and wire codec, the text
//! renderer and the directory walker, and adds [`Error`] so a single `?`
//! covers failures from all of them.
//!
//! | Concern | Items |
//! |---------|-------|
//! | Model | [`GenericAcl`], [`AclEntry`], [`Principal`], [`Permissions`], [`Flags`] |
//! | Host access | [`get_acl`], [`get_acl_fd`], [`set_acl`], [`set_acl_fd`] |
//! | Wire codec | [`encode`], [`encode_to_vec`], [`decode`] |
//! | Text | [`render_entry`], [`render_acl`], [`Style`] |
//! | Traversal | [`walk()`], [`WalkBuilder`], [`FileTypeFilter`] |
//!
//! The member crates remain reachable as [`model`], [`metadata`],
//! [`render`], [`walk`](mod@walk) and [`logging`] for everything else.
//!
//! # Examples
//!
//! ```
//! use gacl::{AclEntry, AclType, GenericAcl, Permission, Principal, Style};
//!
//! let mut acl = GenericAcl::new(AclType::Nfs4);
//! acl.push(AclEntry::allow(Principal::everyone()).with_permissions(Permission::ReadData))?;
//!
//! let bytes = gacl::encode_to_vec(&acl)?;
//! let decoded = gacl::decode(&bytes)?;
//! assert_eq!(decoded, acl);
//!
//! let lines = gacl::render_acl(&decoded, Style::Symbolic, None)?;
//! assert_eq!(lines, ["everyone@:r-------------:-------:allow"]);
//! # Ok::<(), gacl::Error>(())
//! ```

use std::path::{Path, PathBuf};

pub use logging;
pub use metadata;
pub use model;
pub use render;
pub use ::walk;

pub use metadata::{
    AclOptions, IdentityLookup, LinkMode, NFS4_ACL_XATTR, SystemIdentity, decode, encode,
    encode_to_vec, get_acl, get_acl_fd, set_acl, set_acl_fd,
};
pub use model::{
    AclEntry, AclError, AclErrorKind, AclResult, AclType, EntryId, EntryKind, Flag, Flags,
    GenericAcl, Permission, Permissions, Principal, TagType,
};
pub use render::{Ownership, Renderer, Style, render_acl, render_entry};
pub use ::walk::{FileTypeFilter, WalkBuilder, WalkEntry, WalkError, Walker};

/// Failure raised while walking a tree or converting an ACL.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// ACL conversion, codec or host I/O failure.
    #[error(transparent)]
    Acl(#[from] AclError),
    /// Directory traversal failure.
    #[error(transparent)]
    Walk(#[from] WalkError),
}

impl Error {
    /// Path tied to the failure, when one is known.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Acl(error) => error.path(),
            Self::Walk(error) => Some(error.path()),
        }
    }
}

/// Convenience alias used by the facade helpers.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Walks `root` and calls `visitor` for every reported entry.
///
/// See [`walk::walk`](crate::walk::walk) for ordering, depth and filter rules.
/// Walk failures become [`Error::Walk`]; visitor errors are returned as-is.
pub fn walk<P, E, F>(
    root: P,
    max_depth: Option<usize>,
    file_types: FileTypeFilter,
    visitor: F,
) -> Result<(), E>
where
    P: Into<PathBuf>,
    E: From<WalkError>,
    F: FnMut(&WalkEntry) -> Result<(), E>,
{
    ::walk::walk(root, max_depth, file_types, visitor)
}

/// Reads the ACL of every entry under `root` and hands it to `visitor`.
///
/// Symbolic links are reported by the walker but their ACLs are read with
/// the link mode in `options`. The first failure ends the walk.
///
/// ```no_run
/// use gacl::{AclOptions, FileTypeFilter, Style};
///
/// gacl::walk_acls("/srv/share", None, FileTypeFilter::empty(), &AclOptions::new(), |entry, acl| {
///     for line in gacl::render_acl(acl, Style::Symbolic, None)? {
///         println!("{}: {line}", entry.path().display());
///     }
///     Ok(())
/// })?;
/// # Ok::<(), gacl::Error>(())
/// ```
pub fn walk_acls<P, F>(
    root: P,
    max_depth: Option<usize>,
    file_types: FileTypeFilter,
    options: &AclOptions,
    mut visitor: F,
) -> Result<()>
where
    P: Into<PathBuf>,
    F: FnMut(&WalkEntry, &GenericAcl) -> Result<()>,
{
    walk(root, max_depth, file_types, |entry| {
        let acl = get_acl(entry.path(), options)?;
        logging::debug_log!(
            Walk,
            2,
            "{:?}: {} ACL entries",
            entry.path(),
            acl.len()
        );
        visitor(entry, &acl)
    })
}
