use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Output convention for a rendered entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Style {
    /// `owner@:rwx-----------:-------:allow`
    #[default]
    Symbolic,
    /// `ACL:alice:ALLOWED/OI|CI/R|W`, as printed by Samba's `smbcacls`.
    Samba,
    /// `alice:(OI)(CI)(R,W)`, as printed by Windows `icacls`.
    Icacls,
}

impl Style {
    /// Every style in declaration order.
    pub const ALL: [Self; 3] = [Self::Symbolic, Self::Samba, Self::Icacls];

    /// Returns the name accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Symbolic => "default",
            Self::Samba => "samba",
            Self::Icacls => "icacls",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a style name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown render style '{0}' (expected default, samba or icacls)")]
pub struct ParseStyleError(String);

impl FromStr for Style {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "default" | "symbolic" => Ok(Self::Symbolic),
            "samba" => Ok(Self::Samba),
            "icacls" => Ok(Self::Icacls),
            _ => Err(ParseStyleError(trimmed.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for style in Style::ALL {
            assert_eq!(style.to_string().parse::<Style>(), Ok(style));
        }
        assert_eq!(" Samba ".parse::<Style>(), Ok(Style::Samba));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = "nfs4".parse::<Style>().expect_err("unknown");
        assert!(err.to_string().contains("'nfs4'"));
    }
}
