//! crates/model/src/error.rs
//!
//! Error type shared by every ACL operation.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for ACL operations.
pub type AclResult<T> = Result<T, AclError>;

/// Errors that can occur while building, converting or encoding ACLs.
#[derive(Debug, Error)]
pub enum AclError {
    /// Bad position, missing numeric identity, or a value the target cannot express.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Growing an ACL failed.
    #[error("out of memory while growing ACL to {requested} entries")]
    OutOfMemory {
        /// Entry count that could not be reserved.
        requested: usize,
    },
    /// A wire buffer was truncated or structurally inconsistent.
    #[error("malformed ACL data at offset {offset}: {reason}")]
    MalformedData {
        /// Byte offset at which decoding stopped.
        offset: usize,
        /// Short description of the violation.
        reason: &'static str,
    },
    /// The destination buffer cannot hold the encoded ACL.
    #[error("buffer too small: {required} bytes required, {available} available")]
    BufferTooSmall {
        /// Bytes the full encoding needs.
        required: usize,
        /// Bytes the caller provided.
        available: usize,
    },
    /// The platform cannot express the requested ACL operation.
    #[error("operation not supported: {0}")]
    Unsupported(String),
    /// Filesystem, extended-attribute or identity-service failure.
    #[error("failed to {context} '{}': {source}", .path.display())]
    Io {
        /// Operation being performed.
        context: &'static str,
        /// Path involved in the failing operation.
        path: PathBuf,
        /// Underlying operating-system error.
        #[source]
        source: io::Error,
    },
}

/// Discriminant of an [`AclError`], for callers that only branch on the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AclErrorKind {
    /// See [`AclError::InvalidArgument`].
    InvalidArgument,
    /// See [`AclError::OutOfMemory`].
    OutOfMemory,
    /// See [`AclError::MalformedData`].
    MalformedData,
    /// See [`AclError::BufferTooSmall`].
    BufferTooSmall,
    /// See [`AclError::Unsupported`].
    OperationNotSupported,
    /// See [`AclError::Io`].
    Io,
}

impl AclError {
    /// Builds an [`AclError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Builds an [`AclError::Unsupported`].
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Builds an [`AclError::MalformedData`].
    pub const fn malformed(offset: usize, reason: &'static str) -> Self {
        Self::MalformedData { offset, reason }
    }

    /// Wraps an [`io::Error`] raised while operating on `path`.
    pub fn io(context: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Wraps an [`io::Error`] raised while operating on an open descriptor.
    ///
    /// The descriptor is reported as `/dev/fd/<n>`.
    pub fn io_fd(context: &'static str, fd: i32, source: io::Error) -> Self {
        Self::Io {
            context,
            path: PathBuf::from(format!("/dev/fd/{fd}")),
            source,
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> AclErrorKind {
        match self {
            Self::InvalidArgument(_) => AclErrorKind::InvalidArgument,
            Self::OutOfMemory { .. } => AclErrorKind::OutOfMemory,
            Self::MalformedData { .. } => AclErrorKind::MalformedData,
            Self::BufferTooSmall { .. } => AclErrorKind::BufferTooSmall,
            Self::Unsupported(_) => AclErrorKind::OperationNotSupported,
            Self::Io { .. } => AclErrorKind::Io,
        }
    }

    /// Returns the path involved in an I/O failure, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Returns the raw OS error code behind an I/O failure, if any.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Io { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn invalid_argument_message() {
        let err = AclError::invalid("position 7 out of range");
        assert_eq!(err.kind(), AclErrorKind::InvalidArgument);
        assert!(err.to_string().contains("invalid argument"));
        assert!(err.to_string().contains("position 7"));
    }

    #[test]
    fn malformed_reports_offset() {
        let err = AclError::malformed(12, "identity runs past end of buffer");
        assert_eq!(err.kind(), AclErrorKind::MalformedData);
        assert_eq!(
            err.to_string(),
            "malformed ACL data at offset 12: identity runs past end of buffer"
        );
    }

    #[test]
    fn buffer_too_small_reports_sizes() {
        let err = AclError::BufferTooSmall {
            required: 64,
            available: 10,
        };
        assert_eq!(err.kind(), AclErrorKind::BufferTooSmall);
        assert!(err.to_string().contains("64 bytes required"));
        assert!(err.to_string().contains("10 available"));
    }

    #[test]
    fn io_error_carries_path_and_source() {
        let source = io::Error::from_raw_os_error(2);
        let err = AclError::io("read ACL", Path::new("/tmp/x"), source);
        assert_eq!(err.kind(), AclErrorKind::Io);
        assert_eq!(err.path(), Some(Path::new("/tmp/x")));
        assert_eq!(err.raw_os_error(), Some(2));
        assert!(err.to_string().starts_with("failed to read ACL '/tmp/x': "));
        assert!(err.source().is_some());
    }

    #[test]
    fn io_fd_names_descriptor() {
        let err = AclError::io_fd("write ACL", 5, io::Error::other("boom"));
        assert_eq!(err.path(), Some(Path::new("/dev/fd/5")));
    }

    #[test]
    fn unsupported_maps_to_operation_not_supported() {
        let err = AclError::unsupported("link ACLs");
        assert_eq!(err.kind(), AclErrorKind::OperationNotSupported);
        assert!(err.path().is_none());
    }
}
