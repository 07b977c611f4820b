//! crates/model/src/entry.rs
//!
//! A single access-control entry and the principal it applies to.

use std::fmt;
use std::str::FromStr;

use crate::{AclError, Flags, Permissions};

/// Whether an entry grants, denies, audits or alarms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum EntryKind {
    /// Access allowed.
    Allow = 0,
    /// Access denied.
    Deny = 1,
    /// Log matching access attempts.
    Audit = 2,
    /// Raise an alarm on matching access attempts.
    Alarm = 3,
}

impl EntryKind {
    /// Returns the lowercase label used in symbolic output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Audit => "audit",
            Self::Alarm => "alarm",
        }
    }
}

impl TryFrom<u32> for EntryKind {
    type Error = AclError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Allow),
            1 => Ok(Self::Deny),
            2 => Ok(Self::Audit),
            3 => Ok(Self::Alarm),
            _ => Err(AclError::invalid(format!("invalid entry type: {value}"))),
        }
    }
}

impl FromStr for EntryKind {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            "audit" => Ok(Self::Audit),
            "alarm" => Ok(Self::Alarm),
            _ => Err(AclError::invalid(format!("unknown entry type '{s}'"))),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminator for the subject of an entry.
///
/// Discriminants match FreeBSD's `ACL_*` tag constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum TagType {
    /// Unrecognised tag.
    Unknown = 0x00,
    /// The owning user of the object (`owner@`).
    UserObject = 0x01,
    /// An explicit user id.
    User = 0x02,
    /// The owning group of the object (`group@`).
    GroupObject = 0x04,
    /// An explicit group id.
    Group = 0x08,
    /// POSIX-style mask entry.
    Mask = 0x10,
    /// POSIX-style other entry.
    Other = 0x20,
    /// Everyone (`everyone@`).
    Everyone = 0x40,
}

impl TagType {
    /// Returns true for tags that must carry a numeric identity.
    #[must_use]
    pub const fn requires_id(self) -> bool {
        matches!(self, Self::User | Self::Group)
    }

    /// Returns true for tags naming a group namespace identity.
    #[must_use]
    pub const fn is_group(self) -> bool {
        matches!(self, Self::Group | Self::GroupObject)
    }
}

/// The subject an entry applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Principal {
    /// Kind of principal.
    pub tag: TagType,
    /// Numeric uid or gid; `None` for implicit principals or when unresolved.
    pub id: Option<u32>,
    /// Best-effort display name.
    pub name: String,
}

impl Principal {
    /// Creates a principal from its parts.
    pub fn new(tag: TagType, id: Option<u32>, name: impl Into<String>) -> Self {
        Self {
            tag,
            id,
            name: name.into(),
        }
    }

    /// The owning user.
    #[must_use]
    pub fn owner() -> Self {
        Self::new(TagType::UserObject, None, "owner@")
    }

    /// The owning group.
    #[must_use]
    pub fn group_owner() -> Self {
        Self::new(TagType::GroupObject, None, "group@")
    }

    /// Everyone.
    #[must_use]
    pub fn everyone() -> Self {
        Self::new(TagType::Everyone, None, "everyone@")
    }

    /// POSIX mask principal.
    #[must_use]
    pub fn mask() -> Self {
        Self::new(TagType::Mask, None, "mask@")
    }

    /// POSIX other principal.
    #[must_use]
    pub fn other() -> Self {
        Self::new(TagType::Other, None, "other@")
    }

    /// An explicit user, named by its decimal uid.
    #[must_use]
    pub fn user(uid: u32) -> Self {
        Self::new(TagType::User, Some(uid), uid.to_string())
    }

    /// An explicit group, named by its decimal gid.
    #[must_use]
    pub fn group(gid: u32) -> Self {
        Self::new(TagType::Group, Some(gid), gid.to_string())
    }

    /// Replaces the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the display name, or the decimal id when the name is empty.
    #[must_use]
    pub fn label(&self) -> String {
        match (self.name.is_empty(), self.id) {
            (false, _) => self.name.clone(),
            (true, Some(id)) => id.to_string(),
            (true, None) => String::new(),
        }
    }
}

/// One access-control entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AclEntry {
    /// Allow, deny, audit or alarm.
    pub kind: EntryKind,
    /// Who the entry applies to.
    pub principal: Principal,
    /// Granted or denied permissions.
    pub permissions: Permissions,
    /// Inheritance and audit flags.
    pub flags: Flags,
}

impl AclEntry {
    /// Creates an entry with no permissions and no flags.
    #[must_use]
    pub const fn new(kind: EntryKind, principal: Principal) -> Self {
        Self {
            kind,
            principal,
            permissions: Permissions::empty(),
            flags: Flags::empty(),
        }
    }

    /// Creates an allow entry.
    #[must_use]
    pub const fn allow(principal: Principal) -> Self {
        Self::new(EntryKind::Allow, principal)
    }

    /// Creates a deny entry.
    #[must_use]
    pub const fn deny(principal: Principal) -> Self {
        Self::new(EntryKind::Deny, principal)
    }

    /// Replaces the permission set.
    #[must_use]
    pub fn with_permissions(mut self, permissions: impl Into<Permissions>) -> Self {
        self.permissions = permissions.into();
        self
    }

    /// Replaces the flag set.
    #[must_use]
    pub fn with_flags(mut self, flags: impl Into<Flags>) -> Self {
        self.flags = flags.into();
        self
    }
}
