use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Error returned when traversal fails.
///
/// The walk stops at the first failure; entries reported before it are not
/// revisited.
#[derive(Debug)]
pub struct WalkError {
    kind: WalkErrorKind,
}

impl WalkError {
    pub(crate) const fn new(kind: WalkErrorKind) -> Self {
        Self { kind }
    }

    pub(crate) const fn root_metadata(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::RootMetadata { path, source })
    }

    pub(crate) const fn read_dir(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::ReadDir { path, source })
    }

    pub(crate) const fn read_dir_entry(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::ReadDirEntry { path, source })
    }

    pub(crate) const fn metadata(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::Metadata { path, source })
    }

    /// Step that failed.
    #[must_use]
    pub const fn kind(&self) -> &WalkErrorKind {
        &self.kind
    }

    /// Path the failing step operated on.
    ///
    /// # Examples
    ///
    /// ```
    /// use walk::WalkBuilder;
    ///
    /// let error = WalkBuilder::new("./definitely_missing_root").build().err().unwrap();
    /// assert!(error.path().ends_with("definitely_missing_root"));
    /// ```
    #[must_use]
    pub fn path(&self) -> &Path {
        self.kind.path()
    }

    /// Returns the underlying I/O error.
    #[must_use]
    pub fn io_error(&self) -> &io::Error {
        self.kind.source()
    }
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (what, path, source) = match &self.kind {
            WalkErrorKind::RootMetadata { path, source } => ("inspect walk root", path, source),
            WalkErrorKind::ReadDir { path, source } => ("read directory", path, source),
            WalkErrorKind::ReadDirEntry { path, source } => ("read entry in", path, source),
            WalkErrorKind::Metadata { path, source } => ("inspect", path, source),
        };
        write!(f, "failed to {what} '{}': {source}", path.display())
    }
}

impl Error for WalkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.kind.source())
    }
}

/// Which step of the walk failed.
#[derive(Debug)]
pub enum WalkErrorKind {
    /// `lstat` of the root failed before the walk began.
    RootMetadata {
        /// Root as supplied to the builder.
        path: PathBuf,
        /// OS error.
        source: io::Error,
    },
    /// A directory could not be opened.
    ReadDir {
        /// Directory that was being opened.
        path: PathBuf,
        /// OS error.
        source: io::Error,
    },
    /// Reading the next name from an open directory failed.
    ReadDirEntry {
        /// Directory being listed.
        path: PathBuf,
        /// OS error.
        source: io::Error,
    },
    /// `lstat` of a listed child failed.
    Metadata {
        /// Child path.
        path: PathBuf,
        /// OS error.
        source: io::Error,
    },
}

impl WalkErrorKind {
    /// Path the failing step operated on.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::RootMetadata { path, .. }
            | Self::ReadDir { path, .. }
            | Self::ReadDirEntry { path, .. }
            | Self::Metadata { path, .. } => path,
        }
    }

    const fn source(&self) -> &io::Error {
        match self {
            Self::RootMetadata { source, .. }
            | Self::ReadDir { source, .. }
            | Self::ReadDirEntry { source, .. }
            | Self::Metadata { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_error(message: &'static str) -> io::Error {
        io::Error::other(message)
    }

    #[test]
    fn walk_error_path_matches_variant_path() {
        let root = WalkError::root_metadata(PathBuf::from("root"), io_error("root"));
        assert_eq!(Path::new("root"), root.path());

        let read_dir = WalkError::read_dir(PathBuf::from("dir"), io_error("dir"));
        assert_eq!(Path::new("dir"), read_dir.path());

        let read_dir_entry = WalkError::read_dir_entry(PathBuf::from("entry"), io_error("entry"));
        assert_eq!(Path::new("entry"), read_dir_entry.path());

        let metadata = WalkError::metadata(PathBuf::from("meta"), io_error("meta"));
        assert_eq!(Path::new("meta"), metadata.path());
    }

    #[test]
    fn walk_error_display_names_the_operation() {
        let cases = [
            (
                WalkError::root_metadata(PathBuf::from("root"), io_error("boom")),
                "failed to inspect walk root 'root': boom",
            ),
            (
                WalkError::read_dir(PathBuf::from("dir"), io_error("boom")),
                "failed to read directory 'dir': boom",
            ),
            (
                WalkError::read_dir_entry(PathBuf::from("entry"), io_error("boom")),
                "failed to read entry in 'entry': boom",
            ),
            (
                WalkError::metadata(PathBuf::from("meta"), io_error("boom")),
                "failed to inspect 'meta': boom",
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn walk_error_source_refers_to_underlying_io_error() {
        let error = WalkError::read_dir(PathBuf::from("dir"), io_error("source"));
        let source_ref = error
            .source()
            .and_then(|err| err.downcast_ref::<io::Error>())
            .expect("walk error should expose the underlying io::Error");
        assert_eq!(source_ref.to_string(), "source");
        assert_eq!(error.io_error().kind(), io::ErrorKind::Other);
    }
}
