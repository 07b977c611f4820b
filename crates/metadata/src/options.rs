use model::AclType;

/// Whether a path-based ACL call targets a symbolic link or what it points to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum LinkMode {
    /// Operate on the file the link resolves to.
    #[default]
    Follow,
    /// Operate on the link itself.
    NoFollow,
}

impl LinkMode {
    /// Maps a `follow_symlinks` switch to a mode.
    #[must_use]
    pub const fn from_follow(follow: bool) -> Self {
        if follow { Self::Follow } else { Self::NoFollow }
    }

    /// Returns true when links are dereferenced.
    #[must_use]
    pub const fn follows(self) -> bool {
        matches!(self, Self::Follow)
    }
}

/// Options that control how ACLs are read and written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AclOptions {
    follow_symlinks: bool,
    acl_type: AclType,
}

impl AclOptions {
    /// Creates a new [`AclOptions`] value with defaults applied.
    ///
    /// By default symbolic links are followed and the NFSv4 ACL family is
    /// selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            follow_symlinks: true,
            acl_type: AclType::Nfs4,
        }
    }

    /// Requests that path-based calls dereference symbolic links.
    #[must_use]
    #[doc(alias = "-L")]
    pub const fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Selects the ACL family to operate on.
    #[must_use]
    pub const fn acl_type(mut self, acl_type: AclType) -> Self {
        self.acl_type = acl_type;
        self
    }

    /// Reports whether symbolic links are followed.
    #[must_use]
    pub const fn follows_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    /// Returns the selected ACL family.
    #[must_use]
    pub const fn selected_type(&self) -> AclType {
        self.acl_type
    }

    /// Returns the link mode implied by these options.
    #[must_use]
    pub const fn link_mode(&self) -> LinkMode {
        LinkMode::from_follow(self.follow_symlinks)
    }
}

impl Default for AclOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_links_and_select_nfs4() {
        let options = AclOptions::default();
        assert!(options.follows_symlinks());
        assert_eq!(options.selected_type(), AclType::Nfs4);
        assert_eq!(options.link_mode(), LinkMode::Follow);
    }

    #[test]
    fn builder_methods_override_defaults() {
        let options = AclOptions::new()
            .follow_symlinks(false)
            .acl_type(AclType::Access);
        assert!(!options.follows_symlinks());
        assert_eq!(options.selected_type(), AclType::Access);
        assert_eq!(options.link_mode(), LinkMode::NoFollow);
    }

    #[test]
    fn link_mode_round_trips_follow_switch() {
        assert!(LinkMode::from_follow(true).follows());
        assert!(!LinkMode::from_follow(false).follows());
        assert_eq!(LinkMode::default(), LinkMode::Follow);
    }
}
