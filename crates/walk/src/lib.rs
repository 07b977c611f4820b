#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `walk` enumerates a directory tree so callers can read or apply ACLs to
//! every entry below a root. Traversal is depth-first and reports the root
//! at depth `0`.
//!
//! # Design
//!
//! - [`WalkBuilder`] configures the depth limit and the [`FileTypeFilter`].
//! - [`Walker`] implements [`Iterator`] and yields [`WalkEntry`] values. A
//!   directory's non-directory children come first, in read order, followed
//!   by each subdirectory and its contents. Entries are not sorted.
//! - [`walk`] drives a fallible visitor over the same sequence.
//!
//! # Invariants
//!
//! - Metadata comes from `symlink_metadata`; symbolic links are reported as
//!   leaves and never followed.
//! - The file type filter only hides entries from the report. Directories
//!   it hides are still descended.
//! - A directory at depth `d` is listed while `d <= max_depth`.
//!
//! # Errors
//!
//! The first I/O failure ends the walk with a [`WalkError`] naming the
//! offending path. Errors returned by a visitor end the walk unchanged.
//!
//! # Examples
//!
//! ```
//! use walk::{FileTypeFilter, WalkBuilder};
//! use std::fs;
//! use std::path::Path;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let root = temp.path();
//! fs::create_dir(root.join("nested"))?;
//! fs::write(root.join("file.txt"), b"data")?;
//! fs::write(root.join("nested/more.txt"), b"data")?;
//!
//! let files: Vec<_> = WalkBuilder::new(root)
//!     .file_types(FileTypeFilter::REGULAR)
//!     .build()?
//!     .map(|entry| entry.map(|entry| entry.relative_path().to_path_buf()))
//!     .collect::<Result<_, _>>()?;
//!
//! assert_eq!(files, [Path::new("file.txt"), Path::new("nested/more.txt")]);
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod builder;
mod entry;
mod error;
mod filter;
mod walker;

pub use crate::builder::WalkBuilder;
pub use crate::entry::WalkEntry;
pub use crate::error::{WalkError, WalkErrorKind};
pub use crate::filter::FileTypeFilter;
pub use crate::walker::Walker;

use std::path::PathBuf;

/// Walks `root` and calls `visitor` for every reported entry.
///
/// `max_depth` of `None` walks the whole tree. Walk failures are converted
/// into the visitor's error type; a visitor error stops the walk and is
/// returned as-is.
///
/// ```
/// use walk::{FileTypeFilter, WalkError, walk};
///
/// # fn demo() -> Result<(), WalkError> {
/// let temp = tempfile::tempdir().unwrap();
/// std::fs::write(temp.path().join("a"), b"x").unwrap();
///
/// let mut depths = Vec::new();
/// walk(temp.path(), None, FileTypeFilter::empty(), |entry| {
///     depths.push(entry.depth());
///     Ok::<_, WalkError>(())
/// })?;
/// assert_eq!(depths, [0, 1]);
/// # Ok(())
/// # }
/// # demo().unwrap();
/// ```
pub fn walk<P, E, F>(
    root: P,
    max_depth: Option<usize>,
    file_types: FileTypeFilter,
    mut visitor: F,
) -> Result<(), E>
where
    P: Into<PathBuf>,
    E: From<WalkError>,
    F: FnMut(&WalkEntry) -> Result<(), E>,
{
    let walker = WalkBuilder::new(root)
        .max_depth(max_depth)
        .file_types(file_types)
        .build()?;
    for entry in walker {
        visitor(&entry?)?;
    }
    Ok(())
}
