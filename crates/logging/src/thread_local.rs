//! crates/logging/src/thread_local.rs
//! Thread-local storage for the active verbosity configuration.

use super::config::VerbosityConfig;
use super::levels::DebugFlag;
use std::cell::RefCell;

thread_local! {
    static VERBOSITY: RefCell<VerbosityConfig> = RefCell::new(VerbosityConfig::default());
}

/// Initialize verbosity configuration for the current thread.
pub fn init(config: VerbosityConfig) {
    VERBOSITY.with(|v| {
        *v.borrow_mut() = config;
    });
}

/// Returns a copy of the configuration active on the current thread.
pub fn current() -> VerbosityConfig {
    VERBOSITY.with(|v| v.borrow().clone())
}

/// Check if the debug flag is at or above the specified level.
pub fn debug_gte(flag: DebugFlag, level: u8) -> bool {
    VERBOSITY.with(|v| v.borrow().debug.get(flag) >= level)
}

/// Apply a debug flag token to the current configuration.
pub fn apply_debug_flag(token: &str) -> Result<(), String> {
    VERBOSITY.with(|v| v.borrow_mut().apply_debug_flag(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_and_check() {
        let mut config = VerbosityConfig::default();
        config.debug.codec = 3;
        init(config);

        assert!(debug_gte(DebugFlag::Codec, 1));
        assert!(debug_gte(DebugFlag::Codec, 3));
        assert!(!debug_gte(DebugFlag::Codec, 4));
        assert!(!debug_gte(DebugFlag::Walk, 1));
    }

    #[test]
    fn apply_token_updates_thread_state() {
        init(VerbosityConfig::default());
        apply_debug_flag("idmap2").expect("valid token");
        assert!(debug_gte(DebugFlag::Idmap, 2));
        assert_eq!(current().debug.idmap, 2);
    }

    #[test]
    fn configuration_is_per_thread() {
        let mut config = VerbosityConfig::default();
        config.debug.walk = 1;
        init(config);

        let other = std::thread::spawn(|| debug_gte(DebugFlag::Walk, 1))
            .join()
            .expect("thread");
        assert!(!other);
        assert!(debug_gte(DebugFlag::Walk, 1));
    }
}
