//! crates/logging/src/tracing_bridge.rs
//! Subscriber bootstrap tying the verbosity flags to `tracing`.
//!
//! Events are emitted under the `gacl::<flag>` targets listed by
//! [`DebugFlag::target`](crate::DebugFlag::target). [`init_tracing`] installs
//! a stderr formatter whose filter enables exactly the targets whose flag is
//! non-zero, unless `RUST_LOG` overrides it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use logging::{VerbosityConfig, init_tracing};
//!
//! let config = VerbosityConfig::from_verbose_level(2);
//! init_tracing(config)?;
//!
//! tracing::debug!(target: "gacl::codec", "decoding 3 entries");
//! ```

use super::config::VerbosityConfig;
use std::io;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Builds the filter for `config`, preferring `RUST_LOG` when it is set and valid.
pub fn build_filter(config: &VerbosityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.filter_directives()))
}

/// Initialize tracing with the given verbosity configuration.
///
/// Also installs `config` as the thread-local configuration consulted by
/// [`debug_log!`](crate::debug_log). Fails if a global subscriber is already set.
pub fn init_tracing(config: VerbosityConfig) -> Result<(), TryInitError> {
    let filter = build_filter(&config);
    init_tracing_with_filter(config, filter)
}

/// Initialize tracing with an explicit filter in addition to the verbosity gate.
pub fn init_tracing_with_filter(
    config: VerbosityConfig,
    filter: EnvFilter,
) -> Result<(), TryInitError> {
    super::thread_local::init(config);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DebugFlag, debug_gte};

    #[test]
    fn second_initialisation_is_rejected() {
        let mut config = VerbosityConfig::default();
        config.debug.acl = 2;

        let _ = init_tracing(config.clone());
        assert!(debug_gte(DebugFlag::Acl, 2));
        assert!(init_tracing(config).is_err());
    }
}
