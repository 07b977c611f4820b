#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `render` turns [`model::AclEntry`] values into single-line text in one of
//! three conventions selected by [`Style`]:
//!
//! | Style | Example |
//! |-------|---------|
//! | [`Style::Symbolic`] | `owner@:r-x-----------:-------:allow` |
//! | [`Style::Samba`] | `ACL:alice:ALLOWED/OI/R\|X\tr-x-----------` |
//! | [`Style::Icacls`] | `alice:(OI)(R,X)` |
//!
//! Rendering never mutates its input. Names are resolved through an
//! [`IdentityLookup`](metadata::IdentityLookup) on every call, so rendering
//! many entries costs one lookup per entry.
//!
//! # Examples
//!
//! ```
//! use model::{AclEntry, Permission, Principal};
//! use render::{Style, render_entry};
//!
//! let entry = AclEntry::allow(Principal::owner())
//!     .with_permissions(Permission::ReadData | Permission::Execute);
//! let line = render_entry(&entry, Style::Symbolic, None).unwrap();
//! assert_eq!(line, "owner@:r-x-----------:-------:allow");
//! ```

mod ownership;
mod renderer;
mod sets;
mod style;
mod tokens;

use model::{AclEntry, AclResult, GenericAcl};

pub use ownership::Ownership;
pub use renderer::Renderer;
pub use sets::{render_flags, render_permissions};
pub use style::{ParseStyleError, Style};

/// Formats one entry with the host identity databases.
///
/// `ownership` names the `owner@` and `group@` principals in the Samba and
/// icacls styles.
pub fn render_entry(
    entry: &AclEntry,
    style: Style,
    ownership: Option<Ownership>,
) -> AclResult<String> {
    Renderer::new(style).render_entry(entry, ownership)
}

/// Formats every entry of `acl` with the host identity databases.
pub fn render_acl(
    acl: &GenericAcl,
    style: Style,
    ownership: Option<Ownership>,
) -> AclResult<Vec<String>> {
    Renderer::new(style).render_acl(acl, ownership)
}
