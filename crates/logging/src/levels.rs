//! crates/logging/src/levels.rs
//! Debug flag enum and the per-flag level table.

/// Debug flags for diagnostic categories.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DebugFlag {
    /// Native ACL adapter calls.
    Acl,
    /// NFS4 xattr encode/decode.
    Codec,
    /// Identity and domain resolution.
    Idmap,
    /// Textual rendering.
    Render,
    /// Directory traversal.
    Walk,
}

impl DebugFlag {
    /// Every flag in declaration order.
    pub const ALL: [Self; 5] = [Self::Acl, Self::Codec, Self::Idmap, Self::Render, Self::Walk];

    /// Returns the lowercase token used on command lines and in filters.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Acl => "acl",
            Self::Codec => "codec",
            Self::Idmap => "idmap",
            Self::Render => "render",
            Self::Walk => "walk",
        }
    }

    /// Returns the tracing target events for this flag are emitted under.
    #[must_use]
    pub const fn target(self) -> &'static str {
        match self {
            Self::Acl => "gacl::acl",
            Self::Codec => "gacl::codec",
            Self::Idmap => "gacl::idmap",
            Self::Render => "gacl::render",
            Self::Walk => "gacl::walk",
        }
    }

    /// Looks a flag up by its token, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.name().eq_ignore_ascii_case(name))
    }
}

/// Debug verbosity levels for each flag.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebugLevels {
    /// Native ACL adapter level.
    pub acl: u8,
    /// Wire codec level.
    pub codec: u8,
    /// Identity resolution level.
    pub idmap: u8,
    /// Renderer level.
    pub render: u8,
    /// Walker level.
    pub walk: u8,
}

impl DebugLevels {
    /// Get the level for a specific flag.
    pub const fn get(&self, flag: DebugFlag) -> u8 {
        match flag {
            DebugFlag::Acl => self.acl,
            DebugFlag::Codec => self.codec,
            DebugFlag::Idmap => self.idmap,
            DebugFlag::Render => self.render,
            DebugFlag::Walk => self.walk,
        }
    }

    /// Set the level for a specific flag.
    pub const fn set(&mut self, flag: DebugFlag, level: u8) {
        match flag {
            DebugFlag::Acl => self.acl = level,
            DebugFlag::Codec => self.codec = level,
            DebugFlag::Idmap => self.idmap = level,
            DebugFlag::Render => self.render = level,
            DebugFlag::Walk => self.walk = level,
        }
    }

    /// Set all flags to the same level.
    pub const fn set_all(&mut self, level: u8) {
        self.acl = level;
        self.codec = level;
        self.idmap = level;
        self.render = level;
        self.walk = level;
    }

    /// Returns true when no flag is enabled.
    pub fn is_silent(&self) -> bool {
        DebugFlag::ALL.into_iter().all(|flag| self.get(flag) == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_round_trip() {
        let mut levels = DebugLevels::default();
        assert!(levels.is_silent());
        levels.set(DebugFlag::Codec, 3);
        assert_eq!(levels.get(DebugFlag::Codec), 3);
        assert_eq!(levels.get(DebugFlag::Walk), 0);
        assert!(!levels.is_silent());
    }

    #[test]
    fn set_all_touches_every_flag() {
        let mut levels = DebugLevels::default();
        levels.set_all(2);
        for flag in DebugFlag::ALL {
            assert_eq!(levels.get(flag), 2, "{flag:?}");
        }
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(DebugFlag::from_name("walk"), Some(DebugFlag::Walk));
        assert_eq!(DebugFlag::from_name("IDMAP"), Some(DebugFlag::Idmap));
        assert_eq!(DebugFlag::from_name("bogus"), None);
    }

    #[test]
    fn targets_share_prefix() {
        for flag in DebugFlag::ALL {
            assert_eq!(flag.target(), format!("gacl::{}", flag.name()));
        }
    }
}
