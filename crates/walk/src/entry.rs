use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of a filesystem traversal step.
#[derive(Debug)]
pub struct WalkEntry {
    pub(crate) path: PathBuf,
    pub(crate) relative_path: PathBuf,
    pub(crate) metadata: fs::Metadata,
    pub(crate) depth: usize,
}

impl WalkEntry {
    pub(crate) fn new(
        path: PathBuf,
        relative_path: PathBuf,
        metadata: fs::Metadata,
        depth: usize,
    ) -> Self {
        Self {
            path,
            relative_path,
            metadata,
            depth,
        }
    }

    /// Returns the path of the entry, prefixed by the root as supplied.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path relative to the traversal root (empty for the root).
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Metadata captured with `symlink_metadata`; links are never followed.
    #[must_use]
    pub fn metadata(&self) -> &fs::Metadata {
        &self.metadata
    }

    /// Depth of the entry relative to the root (root depth is `0`).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Byte offset of the final path component within [`path`](Self::path).
    ///
    /// The root reports `0`.
    ///
    /// ```
    /// use walk::WalkBuilder;
    /// # fn demo() -> Result<(), Box<dyn std::error::Error>> {
    /// let temp = tempfile::tempdir()?;
    /// std::fs::write(temp.path().join("leaf.txt"), b"x")?;
    /// let entry = WalkBuilder::new(temp.path()).build()?.nth(1).unwrap()?;
    /// let path = entry.path().to_str().unwrap();
    /// assert_eq!(&path[entry.base()..], "leaf.txt");
    /// # Ok(())
    /// # }
    /// # demo().unwrap();
    /// ```
    #[must_use]
    pub fn base(&self) -> usize {
        if self.is_root() {
            return 0;
        }
        self.path.file_name().map_or(0, |name| {
            self.path.as_os_str().len().saturating_sub(name.len())
        })
    }

    /// Returns the final component of the entry, or `None` for the root.
    #[must_use]
    pub fn file_name(&self) -> Option<&OsStr> {
        if self.is_root() {
            None
        } else {
            self.relative_path.file_name()
        }
    }

    /// Indicates whether this entry corresponds to the traversal root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.depth == 0
    }
}
