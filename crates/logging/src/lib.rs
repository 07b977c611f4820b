#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` owns the diagnostic plumbing shared by the gacl crates. Each
//! subsystem (native ACL calls, the xattr codec, identity resolution,
//! rendering, directory traversal) has a [`DebugFlag`] with an independent
//! verbosity level. Call sites use [`debug_log!`], which checks the
//! thread-local level before forwarding to `tracing`.
//!
//! # Design
//!
//! - [`VerbosityConfig`] holds the per-flag levels and can be built from a
//!   `-v` count or adjusted with `FLAG[N]` tokens.
//! - The active configuration lives in thread-local storage ([`init`],
//!   [`debug_gte`]) so the gate costs a borrow, not a lock.
//! - [`init_tracing`] installs a `tracing-subscriber` registry with an
//!   [`EnvFilter`](tracing_subscriber::EnvFilter) that mirrors the enabled
//!   flags.
//!
//! # Examples
//!
//! ```
//! use logging::{DebugFlag, VerbosityConfig, debug_gte, init};
//!
//! let mut config = VerbosityConfig::from_verbose_level(1);
//! config.apply_debug_flag("codec2").unwrap();
//! init(config);
//!
//! assert!(debug_gte(DebugFlag::Codec, 2));
//! assert!(!debug_gte(DebugFlag::Render, 1));
//! ```

mod config;
mod levels;
mod macros;
mod thread_local;
mod tracing_bridge;

pub use config::VerbosityConfig;
pub use levels::{DebugFlag, DebugLevels};
pub use thread_local::{apply_debug_flag, current, debug_gte, init};
pub use tracing_bridge::{build_filter, init_tracing, init_tracing_with_filter};

#[doc(hidden)]
pub use tracing;
