#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `model` defines the platform-neutral ACL representation every other gacl
//! crate converts to and from: a [`GenericAcl`] is an ordered list of
//! [`AclEntry`] values, each naming a [`Principal`], an [`EntryKind`], a
//! [`Permissions`] set and a [`Flags`] set.
//!
//! # Invariants
//!
//! - Entry order is evaluation order. It is only changed by explicit
//!   [`GenericAcl::insert`] and [`GenericAcl::remove`] calls.
//! - Implicit principals ([`TagType::UserObject`], [`TagType::GroupObject`],
//!   [`TagType::Everyone`]) carry no numeric id. Explicit [`TagType::User`] and
//!   [`TagType::Group`] principals must carry one before they can be encoded.
//! - Failed edits leave the ACL unchanged.
//!
//! # Errors
//!
//! Every fallible operation in the workspace returns [`AclError`].
//!
//! # Examples
//!
//! ```
//! use model::{AclEntry, AclType, GenericAcl, Permission, Principal};
//!
//! let mut acl = GenericAcl::new(AclType::Nfs4);
//! acl.push(AclEntry::allow(Principal::owner())
//!     .with_permissions(Permission::ReadData | Permission::WriteData))
//!     .unwrap();
//! acl.push(AclEntry::allow(Principal::everyone())
//!     .with_permissions(Permission::ReadData))
//!     .unwrap();
//!
//! assert_eq!(acl.len(), 2);
//! assert_eq!(acl.get(1).unwrap().permissions.to_symbolic(), "r-------------");
//! ```

mod acl;
mod entry;
mod error;
mod flags;
mod perms;

pub use acl::{AclType, EntryId, GenericAcl};
pub use entry::{AclEntry, EntryKind, Principal, TagType};
pub use error::{AclError, AclErrorKind, AclResult};
pub use flags::{Flag, Flags};
pub use perms::{Permission, Permissions};
