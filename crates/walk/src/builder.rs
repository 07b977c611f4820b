use crate::error::WalkError;
use crate::filter::FileTypeFilter;
use crate::walker::Walker;
use std::path::PathBuf;

/// Configures a depth-first traversal rooted at a specific path.
#[derive(Clone, Debug)]
pub struct WalkBuilder {
    root: PathBuf,
    max_depth: Option<usize>,
    file_types: FileTypeFilter,
}

impl WalkBuilder {
    /// Creates a builder that walks `root` without a depth limit and reports
    /// every file type.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            max_depth: None,
            file_types: FileTypeFilter::empty(),
        }
    }

    /// Limits how deep the walk descends.
    ///
    /// A directory at depth `d` has its children listed while `d <= limit`.
    /// With `Some(0)` the root's direct children are reported but none of
    /// its subdirectories are opened.
    #[must_use]
    pub const fn max_depth(mut self, limit: Option<usize>) -> Self {
        self.max_depth = limit;
        self
    }

    /// Signed form of [`max_depth`](Self::max_depth); negative values mean
    /// unlimited.
    #[must_use]
    pub fn depth_limit(self, limit: isize) -> Self {
        self.max_depth(usize::try_from(limit).ok())
    }

    /// Restricts which entries are reported. Traversal is unaffected.
    #[must_use]
    pub const fn file_types(mut self, filter: FileTypeFilter) -> Self {
        self.file_types = filter;
        self
    }

    /// Inspects the root and builds a [`Walker`].
    pub fn build(self) -> Result<Walker, WalkError> {
        Walker::new(self.root, self.max_depth, self.file_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_depth_limit_is_unlimited() {
        let builder = WalkBuilder::new(".").depth_limit(-1);
        assert_eq!(builder.max_depth, None);

        let builder = WalkBuilder::new(".").depth_limit(3);
        assert_eq!(builder.max_depth, Some(3));
    }

    #[test]
    fn defaults_report_everything_without_limit() {
        let builder = WalkBuilder::new("root");
        assert_eq!(builder.root, PathBuf::from("root"));
        assert_eq!(builder.max_depth, None);
        assert!(builder.file_types.is_empty());
    }
}
