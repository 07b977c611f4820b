#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Overview
//!
//! `metadata` moves [`model::GenericAcl`] values to and from the host. It owns
//! the per-platform adapters behind [`AclBackend`], the `system.nfs4_acl` wire
//! codec used on Linux, and the identity lookups both depend on.
//!
//! # Design
//!
//! - [`backend`] defines the adapter trait and the [`get_acl`]/[`set_acl`]
//!   facade. [`HostAcl`] names the single implementation compiled for the
//!   current target.
//! - [`nfsv4_acl`] encodes and decodes the NFSv4 xattr layout with checked
//!   cursors; [`idmap`] supplies the NFSv4 id-mapping domain.
//! - [`identity`] resolves names and ids through the account database or an
//!   in-memory table for tests.
//!
//! Native conversion code that does not touch the OS lives in pure mapping
//! modules so it is unit tested on every host.
//!
//! # Examples
//!
//! ```
//! use metadata::{StaticIdentity, idmap::IdmapConfig, Nfs4Codec};
//! use model::{AclEntry, AclType, GenericAcl, Permission, Principal};
//!
//! let codec = Nfs4Codec::new(StaticIdentity::new(), IdmapConfig::default());
//! let mut acl = GenericAcl::new(AclType::Nfs4);
//! acl.push(AclEntry::allow(Principal::owner()).with_permissions(Permission::ReadData))
//!     .unwrap();
//!
//! let bytes = codec.encode_to_vec(&acl).unwrap();
//! assert_eq!(codec.decode(&bytes).unwrap(), acl);
//! ```

pub mod backend;
pub mod identity;
pub mod idmap;
pub mod nfsv4_acl;
mod options;

#[cfg(unix)]
mod id_lookup;
#[cfg(not(unix))]
#[path = "id_lookup_stub.rs"]
mod id_lookup;

#[cfg(any(test, all(feature = "acl", any(target_os = "solaris", target_os = "illumos"))))]
mod ace_mapping;
#[cfg(any(test, all(feature = "acl", target_os = "macos")))]
mod guid_mapping;

mod acl_freebsd;
mod acl_linux;
mod acl_macos;
mod acl_noop;
mod acl_solaris;

pub use backend::{AclBackend, HostAcl, get_acl, get_acl_fd, set_acl, set_acl_fd};
pub use id_lookup::{
    RawGid, RawUid, lookup_group_by_name, lookup_group_name, lookup_user_by_name, lookup_user_name,
};
pub use identity::{IdentityLookup, NumericIdentity, StaticIdentity, SystemIdentity};
pub use nfsv4_acl::{NFS4_ACL_XATTR, Nfs4Codec, decode, encode, encode_to_vec};
pub use options::{AclOptions, LinkMode};

pub use acl_noop::UnsupportedAcl;

#[cfg(all(feature = "acl", target_os = "linux"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "acl", target_os = "linux"))))]
pub use acl_linux::{XattrAcl, has_nfs4_acl};

#[cfg(all(feature = "acl", target_os = "freebsd"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "acl", target_os = "freebsd"))))]
pub use acl_freebsd::FreeBsdAcl;

#[cfg(all(feature = "acl", any(target_os = "solaris", target_os = "illumos")))]
pub use acl_solaris::SolarisAcl;

#[cfg(all(feature = "acl", target_os = "macos"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "acl", target_os = "macos"))))]
pub use acl_macos::{MacOsAcl, SystemMembership};
