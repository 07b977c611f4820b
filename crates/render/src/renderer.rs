//! crates/render/src/renderer.rs
//!
//! Per-style formatting of a single entry.
//!
//! Principal names are looked up on every call. `owner@` and `group@` entries
//! take their concrete names from the [`Ownership`] passed alongside, and keep
//! their symbolic labels when none is available.

use logging::debug_log;
use metadata::{IdentityLookup, SystemIdentity};
use model::{AclEntry, AclError, AclResult, EntryKind, GenericAcl, Principal, TagType};

use crate::ownership::Ownership;
use crate::style::Style;
use crate::tokens::{flag_tokens, join, permission_tokens};

/// Formats entries in one [`Style`].
#[derive(Debug, Clone, Default)]
pub struct Renderer<L = SystemIdentity> {
    style: Style,
    lookup: L,
}

impl Renderer<SystemIdentity> {
    /// Creates a renderer resolving names through the host databases.
    #[must_use]
    pub const fn new(style: Style) -> Self {
        Self::with_lookup(style, SystemIdentity)
    }
}

impl<L: IdentityLookup> Renderer<L> {
    /// Creates a renderer resolving names through `lookup`.
    pub const fn with_lookup(style: Style, lookup: L) -> Self {
        Self { style, lookup }
    }

    /// Returns the configured style.
    pub const fn style(&self) -> Style {
        self.style
    }

    /// Formats one entry as a single line without a trailing newline.
    ///
    /// Fails with [`AclError::InvalidArgument`] for [`TagType::Unknown`]
    /// principals.
    pub fn render_entry(
        &self,
        entry: &AclEntry,
        ownership: Option<Ownership>,
    ) -> AclResult<String> {
        match self.style {
            Style::Symbolic => self.symbolic(entry),
            Style::Samba => self.samba(entry, ownership),
            Style::Icacls => self.icacls(entry, ownership),
        }
    }

    /// Formats every entry of `acl`, one line each, in ACL order.
    pub fn render_acl(
        &self,
        acl: &GenericAcl,
        ownership: Option<Ownership>,
    ) -> AclResult<Vec<String>> {
        let lines = acl
            .iter()
            .map(|entry| self.render_entry(entry, ownership))
            .collect::<AclResult<Vec<_>>>()?;
        debug_log!(Render, 2, "rendered {} entries as {}", lines.len(), self.style);
        Ok(lines)
    }

    fn symbolic(&self, entry: &AclEntry) -> AclResult<String> {
        let principal = &entry.principal;
        let who = match principal.tag {
            TagType::UserObject => "owner@".to_owned(),
            TagType::GroupObject => "group@".to_owned(),
            TagType::Everyone => "everyone@".to_owned(),
            TagType::Mask => "mask@".to_owned(),
            TagType::Other => "other@".to_owned(),
            TagType::User => format!("u:{}", self.explicit_name(principal, false)),
            TagType::Group => format!("g:{}", self.explicit_name(principal, true)),
            TagType::Unknown => return Err(unknown_principal(principal)),
        };
        Ok(format!(
            "{who}:{}:{}:{}",
            entry.permissions.to_symbolic(),
            entry.flags.to_symbolic(),
            entry.kind
        ))
    }

    fn samba(&self, entry: &AclEntry, ownership: Option<Ownership>) -> AclResult<String> {
        let principal = &entry.principal;
        let who = match principal.tag {
            TagType::User => {
                let name = self.explicit_name(principal, false);
                let suffix = if self.lookup.group_id(&name).is_some() { "(user)" } else { "" };
                format!("{name}{suffix}")
            }
            TagType::Group => {
                let name = self.explicit_name(principal, true);
                let suffix = if self.lookup.user_id(&name).is_some() { "(group)" } else { "" };
                format!("{name}{suffix}")
            }
            TagType::UserObject => self.owner_name(ownership),
            TagType::GroupObject => self.owning_group_name(ownership),
            TagType::Mask => "mask@".to_owned(),
            TagType::Everyone | TagType::Other => "Everyone".to_owned(),
            TagType::Unknown => return Err(unknown_principal(principal)),
        };
        let kind = match entry.kind {
            EntryKind::Allow => "ALLOWED",
            EntryKind::Deny => "DENIED",
            EntryKind::Audit => "AUDIT",
            EntryKind::Alarm => "ALARM",
        };
        Ok(format!(
            "ACL:{who}:{kind}/{}/{}\t{}",
            join(flag_tokens(entry.flags), "|"),
            join(permission_tokens(entry.permissions), "|"),
            entry.permissions.to_symbolic()
        ))
    }

    fn icacls(&self, entry: &AclEntry, ownership: Option<Ownership>) -> AclResult<String> {
        let principal = &entry.principal;
        let who = match principal.tag {
            TagType::User => self.explicit_name(principal, false),
            TagType::Group => match principal.id {
                Some(gid) => self.group_label(gid),
                None => self.disambiguated_group(principal.name.clone()),
            },
            TagType::UserObject => self.owner_name(ownership),
            TagType::GroupObject => self.owning_group_name(ownership),
            TagType::Mask => "mask@".to_owned(),
            TagType::Everyone | TagType::Other => "Everyone".to_owned(),
            TagType::Unknown => return Err(unknown_principal(principal)),
        };

        let mut line = format!("{who}:");
        if entry.kind == EntryKind::Deny {
            line.push_str("(DENY)");
        }
        for token in flag_tokens(entry.flags) {
            line.push('(');
            line.push_str(token);
            line.push(')');
        }
        line.push('(');
        line.push_str(&join(permission_tokens(entry.permissions), ","));
        line.push(')');
        Ok(line)
    }

    /// Name of an explicit user or group; unresolved principals keep their label.
    fn explicit_name(&self, principal: &Principal, group: bool) -> String {
        match principal.id {
            Some(id) => self.lookup.name_for(id, group).unwrap_or_else(|| id.to_string()),
            None => principal.name.clone(),
        }
    }

    fn owner_name(&self, ownership: Option<Ownership>) -> String {
        match ownership {
            Some(owner) => self
                .lookup
                .user_name(owner.uid)
                .unwrap_or_else(|| owner.uid.to_string()),
            None => Principal::owner().name,
        }
    }

    fn owning_group_name(&self, ownership: Option<Ownership>) -> String {
        match ownership {
            Some(owner) => self.group_label(owner.gid),
            None => Principal::group_owner().name,
        }
    }

    /// `GID=<n>` when unnamed, `GROUP=<name>` when an account shares the name.
    fn group_label(&self, gid: u32) -> String {
        match self.lookup.group_name(gid) {
            Some(name) => self.disambiguated_group(name),
            None => format!("GID={gid}"),
        }
    }

    fn disambiguated_group(&self, name: String) -> String {
        if self.lookup.user_id(&name).is_some() {
            format!("GROUP={name}")
        } else {
            name
        }
    }
}

fn unknown_principal(principal: &Principal) -> AclError {
    AclError::invalid(format!("cannot render principal '{}' with an unknown tag", principal.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use metadata::StaticIdentity;
    use model::{AclErrorKind, AclType, Flag, Permission, Permissions};

    fn ids() -> StaticIdentity {
        StaticIdentity::new()
            .user(1000, "alice")
            .user(1001, "staff")
            .group(100, "staff")
            .group(200, "wheel")
            .group(1000, "alice")
    }

    fn renderer(style: Style) -> Renderer<StaticIdentity> {
        Renderer::with_lookup(style, ids())
    }

    fn owner_rx() -> AclEntry {
        AclEntry::allow(Principal::owner())
            .with_permissions(Permission::ReadData | Permission::Execute)
    }

    #[test]
    fn symbolic_runs_are_fixed_width() {
        let line = renderer(Style::Symbolic).render_entry(&owner_rx(), None).expect("render");
        assert_eq!(line, "owner@:r-x-----------:-------:allow");

        let entry = AclEntry::deny(Principal::group(200))
            .with_permissions(Permissions::all())
            .with_flags(Flag::FileInherit | Flag::Inherited);
        let line = renderer(Style::Symbolic).render_entry(&entry, None).expect("render");
        assert_eq!(line, "g:wheel:rwxpdDaARWcCos:f-----I:deny");
    }

    #[test]
    fn symbolic_labels_cover_implicit_principals() {
        let cases = [
            (Principal::group_owner(), "group@"),
            (Principal::everyone(), "everyone@"),
            (Principal::mask(), "mask@"),
            (Principal::other(), "other@"),
            (Principal::user(4242), "u:4242"),
        ];
        for (principal, label) in cases {
            let line = renderer(Style::Symbolic)
                .render_entry(&AclEntry::allow(principal), None)
                .expect("render");
            assert!(line.starts_with(&format!("{label}:")), "{line}");
        }
    }

    #[test]
    fn samba_lists_tokens_and_symbolic_run() {
        let entry = AclEntry::allow(Principal::user(1000))
            .with_permissions(Permission::ReadData | Permission::ReadAcl)
            .with_flags(Flag::FileInherit | Flag::DirectoryInherit);
        let line = renderer(Style::Samba).render_entry(&entry, None).expect("render");
        assert_eq!(line, "ACL:alice(user):ALLOWED/OI|CI/R|AS\tr---------c---");
    }

    #[test]
    fn samba_marks_deny_entries() {
        let entry = AclEntry::deny(Principal::group(200)).with_permissions(Permission::WriteData);
        let line = renderer(Style::Samba).render_entry(&entry, None).expect("render");
        assert_eq!(line, "ACL:wheel:DENIED//W\t-w------------");
    }

    #[test]
    fn samba_annotates_only_ambiguous_names() {
        let group = AclEntry::allow(Principal::group(100));
        let line = renderer(Style::Samba).render_entry(&group, None).expect("render");
        assert!(line.starts_with("ACL:staff(group):"), "{line}");

        let unnamed = AclEntry::allow(Principal::user(77));
        let line = renderer(Style::Samba).render_entry(&unnamed, None).expect("render");
        assert!(line.starts_with("ACL:77:"), "{line}");
    }

    #[test]
    fn ownership_names_owner_and_group_entries() {
        let ownership = Some(Ownership::new(1000, 100));
        let samba = renderer(Style::Samba);
        let line = samba.render_entry(&owner_rx(), ownership).expect("owner");
        assert!(line.starts_with("ACL:alice:"), "{line}");

        let group = AclEntry::allow(Principal::group_owner());
        let line = samba.render_entry(&group, ownership).expect("group");
        assert!(line.starts_with("ACL:GROUP=staff:"), "{line}");

        let line = samba
            .render_entry(&group, Some(Ownership::new(1000, 555)))
            .expect("unnamed group");
        assert!(line.starts_with("ACL:GID=555:"), "{line}");

        let line = samba.render_entry(&owner_rx(), None).expect("no ownership");
        assert!(line.starts_with("ACL:owner@:"), "{line}");
    }

    #[test]
    fn icacls_parenthesises_tokens() {
        let entry = AclEntry::allow(Principal::user(1000))
            .with_permissions(Permission::ReadData | Permission::Execute | Permission::Synchronize)
            .with_flags(Flag::FileInherit | Flag::InheritOnly);
        let line = renderer(Style::Icacls).render_entry(&entry, None).expect("render");
        assert_eq!(line, "alice:(OI)(IO)(R,X,S)");
    }

    #[test]
    fn icacls_disambiguates_groups_and_marks_deny() {
        let entry = AclEntry::deny(Principal::group(100)).with_permissions(Permission::Delete);
        let line = renderer(Style::Icacls).render_entry(&entry, None).expect("render");
        assert_eq!(line, "GROUP=staff:(DENY)(D)");

        let unnamed = AclEntry::allow(Principal::group(9));
        let line = renderer(Style::Icacls).render_entry(&unnamed, None).expect("render");
        assert_eq!(line, "GID=9:()");

        let everyone = AclEntry::allow(Principal::everyone()).with_permissions(Permission::ReadData);
        let line = renderer(Style::Icacls).render_entry(&everyone, None).expect("render");
        assert_eq!(line, "Everyone:(R)");
    }

    #[test]
    fn unknown_principals_are_rejected() {
        let entry = AclEntry::allow(Principal::new(TagType::Unknown, None, "?"));
        for style in Style::ALL {
            let err = renderer(style).render_entry(&entry, None).expect_err("unknown");
            assert_eq!(err.kind(), AclErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn render_acl_keeps_entry_order() {
        let mut acl = GenericAcl::new(AclType::Nfs4);
        acl.push(owner_rx()).expect("push");
        acl.push(AclEntry::allow(Principal::everyone())).expect("push");
        let lines = renderer(Style::Symbolic).render_acl(&acl, None).expect("render");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("owner@"));
        assert!(lines[1].starts_with("everyone@"));
        assert_eq!(acl.len(), 2);
    }
}
