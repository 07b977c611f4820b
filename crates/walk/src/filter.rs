use std::fmt;
use std::fs;
use std::ops::{BitOr, BitOrAssign};

/// Set of file types the walker reports.
///
/// The empty set reports everything. The filter never prunes traversal: a
/// directory excluded from the report is still descended.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct FileTypeFilter {
    bits: u8,
}

impl FileTypeFilter {
    /// Regular files.
    pub const REGULAR: Self = Self { bits: 1 };
    /// Directories.
    pub const DIRECTORY: Self = Self { bits: 1 << 1 };
    /// Symbolic links.
    pub const SYMLINK: Self = Self { bits: 1 << 2 };
    /// Devices, sockets and FIFOs.
    pub const OTHER: Self = Self { bits: 1 << 3 };

    const NAMED: [(Self, &'static str); 4] = [
        (Self::REGULAR, "regular"),
        (Self::DIRECTORY, "directory"),
        (Self::SYMLINK, "symlink"),
        (Self::OTHER, "other"),
    ];

    /// Filter that reports every entry.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Returns `true` when no type is selected.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Returns `true` when every type in `other` is selected.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    /// Decides whether an entry with `metadata` is reported.
    ///
    /// ```
    /// use walk::FileTypeFilter;
    ///
    /// let dir = std::fs::symlink_metadata(".").unwrap();
    /// assert!(FileTypeFilter::empty().matches(&dir));
    /// assert!(FileTypeFilter::DIRECTORY.matches(&dir));
    /// assert!(!FileTypeFilter::REGULAR.matches(&dir));
    /// ```
    #[must_use]
    pub fn matches(self, metadata: &fs::Metadata) -> bool {
        self.is_empty() || self.contains(Self::classify(metadata))
    }

    fn classify(metadata: &fs::Metadata) -> Self {
        let file_type = metadata.file_type();
        if file_type.is_dir() {
            Self::DIRECTORY
        } else if file_type.is_symlink() {
            Self::SYMLINK
        } else if file_type.is_file() {
            Self::REGULAR
        } else {
            Self::OTHER
        }
    }
}

impl BitOr for FileTypeFilter {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            bits: self.bits | rhs.bits,
        }
    }
}

impl BitOrAssign for FileTypeFilter {
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits |= rhs.bits;
    }
}

impl fmt::Debug for FileTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = Self::NAMED
            .iter()
            .filter(|(kind, _)| self.contains(*kind))
            .map(|(_, name)| *name);
        f.debug_set().entries(names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_matches_everything() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("file");
        fs::write(&file, b"x").expect("write");

        let filter = FileTypeFilter::empty();
        assert!(filter.matches(&fs::symlink_metadata(temp.path()).expect("dir")));
        assert!(filter.matches(&fs::symlink_metadata(&file).expect("file")));
    }

    #[test]
    fn union_selects_both_types() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("file");
        fs::write(&file, b"x").expect("write");
        let dir = fs::symlink_metadata(temp.path()).expect("dir");
        let file = fs::symlink_metadata(&file).expect("file");

        let mut filter = FileTypeFilter::REGULAR;
        assert!(filter.matches(&file));
        assert!(!filter.matches(&dir));

        filter |= FileTypeFilter::DIRECTORY;
        assert!(filter.matches(&dir));
        assert!(!filter.is_empty());
        assert_eq!(filter, FileTypeFilter::REGULAR | FileTypeFilter::DIRECTORY);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_classified_without_following() {
        let temp = tempfile::tempdir().expect("tempdir");
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(temp.path(), &link).expect("symlink");
        let metadata = fs::symlink_metadata(&link).expect("lstat");

        assert!(FileTypeFilter::SYMLINK.matches(&metadata));
        assert!(!FileTypeFilter::DIRECTORY.matches(&metadata));
    }

    #[test]
    fn debug_lists_selected_names() {
        let filter = FileTypeFilter::SYMLINK | FileTypeFilter::REGULAR;
        assert_eq!(format!("{filter:?}"), r#"{"regular", "symlink"}"#);
        assert_eq!(format!("{:?}", FileTypeFilter::empty()), "{}");
    }
}
