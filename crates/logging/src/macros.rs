//! crates/logging/src/macros.rs
//! Flag-gated diagnostic macros.

/// Emit a debug diagnostic when the flag's thread-local level is high enough.
///
/// The first argument names a [`DebugFlag`](crate::DebugFlag) variant, the
/// second is the minimum level. Remaining arguments are forwarded to
/// `tracing::debug!` under the flag's `gacl::<flag>` target.
///
/// # Example
/// ```ignore
/// debug_log!(Codec, 2, "decoded {} entries", count);
/// ```
#[macro_export]
macro_rules! debug_log {
    (Acl, $level:expr, $($arg:tt)+) => {
        $crate::__gated_event!("gacl::acl", Acl, $level, $($arg)+)
    };
    (Codec, $level:expr, $($arg:tt)+) => {
        $crate::__gated_event!("gacl::codec", Codec, $level, $($arg)+)
    };
    (Idmap, $level:expr, $($arg:tt)+) => {
        $crate::__gated_event!("gacl::idmap", Idmap, $level, $($arg)+)
    };
    (Render, $level:expr, $($arg:tt)+) => {
        $crate::__gated_event!("gacl::render", Render, $level, $($arg)+)
    };
    (Walk, $level:expr, $($arg:tt)+) => {
        $crate::__gated_event!("gacl::walk", Walk, $level, $($arg)+)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __gated_event {
    ($target:literal, $flag:ident, $level:expr, $($arg:tt)+) => {
        if $crate::debug_gte($crate::DebugFlag::$flag, $level) {
            $crate::tracing::debug!(target: $target, $($arg)+);
        }
    };
}

/// Emit an ungated warning under the `gacl::acl` target.
///
/// # Example
/// ```ignore
/// trace_acl_warn!("ACLs are not supported on this platform");
/// ```
#[macro_export]
macro_rules! trace_acl_warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!(target: "gacl::acl", $($arg)*);
    };
}

#[cfg(test)]
mod tests {
    use crate::{DebugFlag, VerbosityConfig, debug_gte, init};

    #[test]
    fn debug_log_expands_for_every_flag() {
        let mut config = VerbosityConfig::default();
        config.debug.set_all(1);
        init(config);

        crate::debug_log!(Acl, 1, "acl {}", 1);
        crate::debug_log!(Codec, 1, "codec {}", 2);
        crate::debug_log!(Idmap, 1, "idmap");
        crate::debug_log!(Render, 1, "render {value}", value = 3);
        crate::debug_log!(Walk, 2, "suppressed");
        crate::trace_acl_warn!("warning {}", 4);

        assert!(debug_gte(DebugFlag::Walk, 1));
    }
}
