//! crates/logging/src/config.rs
//! Verbosity configuration for the debug flags.

use super::levels::{DebugFlag, DebugLevels};

/// Verbosity configuration for debug flags.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerbosityConfig {
    /// Debug flag levels.
    pub debug: DebugLevels,
}

impl VerbosityConfig {
    /// Create a new configuration from a `-v` count (0-4).
    pub fn from_verbose_level(level: u8) -> Self {
        let mut config = Self::default();

        match level {
            0 => {}
            1 => {
                config.debug.acl = 1;
                config.debug.walk = 1;
            }
            2 => {
                config.debug.set_all(1);
            }
            3 => {
                config.debug.set_all(2);
            }
            _ => {
                config.debug.set_all(3);
            }
        }

        config
    }

    /// Apply a debug flag token such as `codec2`, `walk` or `all3`.
    pub fn apply_debug_flag(&mut self, token: &str) -> Result<(), String> {
        let (name, level) = parse_flag_token(token)?;

        if name.eq_ignore_ascii_case("all") {
            self.debug.set_all(level);
            return Ok(());
        }

        let flag =
            DebugFlag::from_name(name).ok_or_else(|| format!("unknown debug flag: {name}"))?;
        self.debug.set(flag, level);
        Ok(())
    }

    /// Renders `tracing-subscriber` filter directives enabling every active flag.
    pub fn filter_directives(&self) -> String {
        let mut directives = vec!["warn".to_owned()];
        for flag in DebugFlag::ALL {
            if self.debug.get(flag) > 0 {
                directives.push(format!("{}=debug", flag.target()));
            }
        }
        directives.join(",")
    }
}

/// Parse a flag token like "codec2" into ("codec", 2) or "walk" into ("walk", 1).
fn parse_flag_token(token: &str) -> Result<(&str, u8), String> {
    if token.is_empty() {
        return Err("empty flag token".to_string());
    }

    match token.find(|c: char| c.is_ascii_digit()) {
        Some(0) => Err(format!("missing flag name in: {token}")),
        Some(pos) => {
            let (name, level_str) = token.split_at(pos);
            let level = level_str
                .parse::<u8>()
                .map_err(|_| format!("invalid level in flag: {token}"))?;
            Ok((name, level))
        }
        None => Ok((token, 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_level_zero_is_silent() {
        assert!(VerbosityConfig::from_verbose_level(0).debug.is_silent());
    }

    #[test]
    fn verbose_level_one_enables_acl_and_walk() {
        let config = VerbosityConfig::from_verbose_level(1);
        assert_eq!(config.debug.acl, 1);
        assert_eq!(config.debug.walk, 1);
        assert_eq!(config.debug.codec, 0);
    }

    #[test]
    fn verbose_level_saturates() {
        let config = VerbosityConfig::from_verbose_level(9);
        assert_eq!(config.debug.idmap, 3);
    }

    #[test]
    fn apply_debug_flag_parses_levels() {
        let mut config = VerbosityConfig::default();
        config.apply_debug_flag("codec2").expect("codec2");
        config.apply_debug_flag("walk").expect("walk");
        assert_eq!(config.debug.codec, 2);
        assert_eq!(config.debug.walk, 1);
    }

    #[test]
    fn apply_debug_flag_all() {
        let mut config = VerbosityConfig::default();
        config.apply_debug_flag("ALL4").expect("all4");
        assert_eq!(config.debug.render, 4);
    }

    #[test]
    fn apply_debug_flag_rejects_garbage() {
        let mut config = VerbosityConfig::default();
        assert!(config.apply_debug_flag("").is_err());
        assert!(config.apply_debug_flag("bogus").is_err());
        assert!(config.apply_debug_flag("3").is_err());
        assert!(config.apply_debug_flag("walk999").is_err());
    }

    #[test]
    fn filter_directives_list_enabled_targets() {
        let mut config = VerbosityConfig::default();
        assert_eq!(config.filter_directives(), "warn");
        config.debug.codec = 1;
        config.debug.walk = 2;
        assert_eq!(
            config.filter_directives(),
            "warn,gacl::codec=debug,gacl::walk=debug"
        );
    }
}
