//! crates/metadata/src/identity.rs
//!
//! Name/id resolution seam used by the codec, the adapters and the renderer.
//!
//! Resolution failures are never errors: callers fall back to decimal ids.
//! [`SystemIdentity`] consults the host account databases; [`StaticIdentity`]
//! is an in-memory table for deterministic callers and tests.

use std::collections::BTreeMap;

use logging::debug_log;

use crate::id_lookup::{
    lookup_group_by_name, lookup_group_name, lookup_user_by_name, lookup_user_name,
};

/// Bidirectional account and group name resolution.
pub trait IdentityLookup {
    /// Returns the account name for `uid`.
    fn user_name(&self, uid: u32) -> Option<String>;

    /// Returns the group name for `gid`.
    fn group_name(&self, gid: u32) -> Option<String>;

    /// Returns the uid for an account name.
    fn user_id(&self, name: &str) -> Option<u32>;

    /// Returns the gid for a group name.
    fn group_id(&self, name: &str) -> Option<u32>;

    /// Resolves a name in the user or group namespace.
    fn id_for(&self, name: &str, group: bool) -> Option<u32> {
        if group {
            self.group_id(name)
        } else {
            self.user_id(name)
        }
    }

    /// Resolves an id in the user or group namespace.
    fn name_for(&self, id: u32, group: bool) -> Option<String> {
        if group {
            self.group_name(id)
        } else {
            self.user_name(id)
        }
    }
}

impl<T: IdentityLookup + ?Sized> IdentityLookup for &T {
    fn user_name(&self, uid: u32) -> Option<String> {
        (**self).user_name(uid)
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        (**self).group_name(gid)
    }

    fn user_id(&self, name: &str) -> Option<u32> {
        (**self).user_id(name)
    }

    fn group_id(&self, name: &str) -> Option<u32> {
        (**self).group_id(name)
    }
}

/// Resolution through the host passwd/group databases.
///
/// Every call performs a fresh lookup; nothing is cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

impl IdentityLookup for SystemIdentity {
    fn user_name(&self, uid: u32) -> Option<String> {
        lookup_user_name(uid).unwrap_or_else(|err| {
            debug_log!(Idmap, 1, "uid {} lookup failed: {}", uid, err);
            None
        })
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        lookup_group_name(gid).unwrap_or_else(|err| {
            debug_log!(Idmap, 1, "gid {} lookup failed: {}", gid, err);
            None
        })
    }

    fn user_id(&self, name: &str) -> Option<u32> {
        lookup_user_by_name(name).unwrap_or_else(|err| {
            debug_log!(Idmap, 1, "user '{}' lookup failed: {}", name, err);
            None
        })
    }

    fn group_id(&self, name: &str) -> Option<u32> {
        lookup_group_by_name(name).unwrap_or_else(|err| {
            debug_log!(Idmap, 1, "group '{}' lookup failed: {}", name, err);
            None
        })
    }
}

/// Resolver that knows no names; everything degrades to decimal ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericIdentity;

impl IdentityLookup for NumericIdentity {
    fn user_name(&self, _uid: u32) -> Option<String> {
        None
    }

    fn group_name(&self, _gid: u32) -> Option<String> {
        None
    }

    fn user_id(&self, _name: &str) -> Option<u32> {
        None
    }

    fn group_id(&self, _name: &str) -> Option<u32> {
        None
    }
}

/// In-memory account and group tables.
///
/// # Examples
///
/// ```
/// use metadata::{IdentityLookup, StaticIdentity};
///
/// let ids = StaticIdentity::new().user(1000, "alice").group(100, "staff");
/// assert_eq!(ids.user_id("alice"), Some(1000));
/// assert_eq!(ids.group_name(100).as_deref(), Some("staff"));
/// assert_eq!(ids.user_name(1), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    users: BTreeMap<u32, String>,
    groups: BTreeMap<u32, String>,
}

impl StaticIdentity {
    /// Creates empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account.
    #[must_use]
    pub fn user(mut self, uid: u32, name: impl Into<String>) -> Self {
        self.users.insert(uid, name.into());
        self
    }

    /// Adds a group.
    #[must_use]
    pub fn group(mut self, gid: u32, name: impl Into<String>) -> Self {
        self.groups.insert(gid, name.into());
        self
    }
}

impl IdentityLookup for StaticIdentity {
    fn user_name(&self, uid: u32) -> Option<String> {
        self.users.get(&uid).cloned()
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        self.groups.get(&gid).cloned()
    }

    fn user_id(&self, name: &str) -> Option<u32> {
        self.users
            .iter()
            .find_map(|(uid, candidate)| (candidate == name).then_some(*uid))
    }

    fn group_id(&self, name: &str) -> Option<u32> {
        self.groups
            .iter()
            .find_map(|(gid, candidate)| (candidate == name).then_some(*gid))
    }
}
