//! Shared fixtures for gacl tests.
//!
//! [`TempTree`] builds small directory trees inside a temporary directory
//! that is removed when the fixture is dropped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Temporary directory tree populated through chained helpers.
///
/// ```
/// use test_support::TempTree;
///
/// let tree = TempTree::new()
///     .unwrap()
///     .dir("sub")
///     .unwrap()
///     .file("sub/data.txt", b"x")
///     .unwrap();
/// assert!(tree.join("sub/data.txt").is_file());
/// ```
#[derive(Debug)]
pub struct TempTree {
    dir: TempDir,
}

impl TempTree {
    /// Creates an empty tree.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Root of the tree.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `relative` inside the tree.
    #[must_use]
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Creates a directory, including missing parents.
    pub fn dir(self, relative: impl AsRef<Path>) -> io::Result<Self> {
        fs::create_dir_all(self.join(relative))?;
        Ok(self)
    }

    /// Writes a file, creating missing parents.
    pub fn file(self, relative: impl AsRef<Path>, contents: &[u8]) -> io::Result<Self> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(self)
    }

    /// Creates a symbolic link at `relative` pointing to `target`.
    #[cfg(unix)]
    pub fn symlink(self, target: impl AsRef<Path>, relative: impl AsRef<Path>) -> io::Result<Self> {
        std::os::unix::fs::symlink(target, self.join(relative))?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_files_create_parents() {
        let tree = TempTree::new()
            .and_then(|tree| tree.file("a/b/c.txt", b"data"))
            .expect("tree");
        assert_eq!(fs::read(tree.join("a/b/c.txt")).expect("read"), b"data");
        assert!(tree.join("a/b").is_dir());
    }

    #[test]
    fn tree_is_removed_on_drop() {
        let tree = TempTree::new().expect("tree");
        let root = tree.path().to_path_buf();
        drop(tree);
        assert!(!root.exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_point_at_their_target() {
        let tree = TempTree::new()
            .and_then(|tree| tree.file("target", b"x"))
            .and_then(|tree| tree.symlink("target", "link"))
            .expect("tree");
        let link = fs::read_link(tree.join("link")).expect("readlink");
        assert_eq!(link, Path::new("target"));
    }
}
