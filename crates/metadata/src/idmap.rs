//! crates/metadata/src/idmap.rs
//!
//! NFSv4 identity domain discovery from `idmapd.conf`.
//!
//! The domain is read once per process. A missing file or key disables
//! domain matching rather than failing.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

use logging::debug_log;

/// Default location of the NFSv4 id-mapping configuration.
pub const IDMAPD_CONF: &str = "/etc/idmapd.conf";

/// Parsed id-mapping configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdmapConfig {
    domain: Option<String>,
}

impl IdmapConfig {
    /// Configuration with an explicit domain.
    #[must_use]
    pub fn with_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
        }
    }

    /// Parses configuration text.
    ///
    /// The first line whose whitespace-separated tokens start with `Domain`
    /// followed by `=` decides the result. A line that stops after `=`
    /// yields no domain.
    ///
    /// # Examples
    ///
    /// ```
    /// use metadata::idmap::IdmapConfig;
    ///
    /// let text = "[General]\nVerbosity = 0\nDomain = example.com\n";
    /// let config = IdmapConfig::parse(text.as_bytes()).unwrap();
    /// assert_eq!(config.domain(), Some("example.com"));
    /// ```
    pub fn parse<R: BufRead>(reader: R) -> io::Result<Self> {
        for line in reader.lines() {
            let line = line?;
            let mut tokens = line.split_whitespace();
            if tokens.next() != Some("Domain") {
                continue;
            }
            if tokens.next() != Some("=") {
                continue;
            }
            return Ok(Self {
                domain: tokens.next().map(str::to_owned),
            });
        }
        Ok(Self::default())
    }

    /// Loads configuration from `path`; a missing file yields no domain.
    pub fn load(path: &Path) -> io::Result<Self> {
        match File::open(path) {
            Ok(file) => Self::parse(BufReader::new(file)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err),
        }
    }

    /// Returns the configured domain.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Returns true when `candidate` should be looked up by name.
    ///
    /// Without a configured domain every candidate matches.
    #[must_use]
    pub fn matches(&self, candidate: Option<&str>) -> bool {
        match (self.domain(), candidate) {
            (None, _) => true,
            (Some(domain), Some(candidate)) => domain == candidate,
            (Some(_), None) => false,
        }
    }
}

static DOMAIN: OnceLock<IdmapConfig> = OnceLock::new();

/// Returns the process-wide configuration, loading it on first use.
pub fn system_config() -> &'static IdmapConfig {
    DOMAIN.get_or_init(|| {
        let config = IdmapConfig::load(Path::new(IDMAPD_CONF)).unwrap_or_else(|err| {
            debug_log!(Idmap, 1, "failed to read {}: {}", IDMAPD_CONF, err);
            IdmapConfig::default()
        });
        debug_log!(Idmap, 2, "nfs4 id domain: {:?}", config.domain());
        config
    })
}

/// Returns the process-wide NFSv4 id domain.
#[must_use]
pub fn nfs4_id_domain() -> Option<&'static str> {
    system_config().domain()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(text: &str) -> IdmapConfig {
        IdmapConfig::parse(text.as_bytes()).expect("parse")
    }

    #[test]
    fn domain_line_sets_domain() {
        assert_eq!(parse("Domain = example.com\n").domain(), Some("example.com"));
        assert_eq!(parse("Domain\t=\tlocal.lan").domain(), Some("local.lan"));
    }

    #[test]
    fn equals_sign_must_stand_alone() {
        assert_eq!(parse("Domain=x.org\n").domain(), None);
        assert_eq!(parse("Domain =x.org\n").domain(), None);
        assert_eq!(parse("Domain= x.org\n").domain(), None);
    }

    #[test]
    fn first_complete_line_wins() {
        let config = parse("Domain: nope\nDomain = first.org\nDomain = second.org\n");
        assert_eq!(config.domain(), Some("first.org"));
    }

    #[test]
    fn missing_value_disables_domain() {
        assert_eq!(parse("Domain =\nDomain = later.org\n").domain(), None);
    }

    #[test]
    fn unrelated_content_yields_none() {
        assert_eq!(parse("[General]\n# Domain = commented\nVerbosity = 0\n").domain(), None);
        assert_eq!(parse("").domain(), None);
    }

    #[test]
    fn key_must_be_exact() {
        assert_eq!(parse("Domains = x.org\n  domain = y.org\n").domain(), None);
        assert_eq!(parse("   Domain = indented.org\n").domain(), Some("indented.org"));
    }

    #[test]
    fn load_tolerates_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = IdmapConfig::load(&dir.path().join("absent.conf")).expect("load");
        assert_eq!(config, IdmapConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[General]\nDomain = example.com").expect("write");
        let config = IdmapConfig::load(file.path()).expect("load");
        assert_eq!(config.domain(), Some("example.com"));
    }

    #[test]
    fn matching_rules() {
        let unset = IdmapConfig::default();
        assert!(unset.matches(Some("any.org")));
        assert!(unset.matches(None));

        let set = IdmapConfig::with_domain("example.com");
        assert!(set.matches(Some("example.com")));
        assert!(!set.matches(Some("other.org")));
        assert!(!set.matches(None));
    }

    #[test]
    fn system_config_is_stable() {
        let first = system_config() as *const IdmapConfig;
        let second = system_config() as *const IdmapConfig;
        assert_eq!(first, second);
        assert_eq!(nfs4_id_domain(), system_config().domain());
    }
}
