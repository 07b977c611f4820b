use crate::entry::WalkEntry;
use crate::error::WalkError;
use crate::filter::FileTypeFilter;
use logging::debug_log;
use std::fs;
use std::mem;
use std::path::PathBuf;
use std::vec;

/// Depth-first iterator over filesystem entries.
///
/// Within a directory every non-directory child is yielded while the
/// directory is being read; subdirectories are queued and yielded afterwards
/// in read order, each one immediately followed by its own contents. The
/// first error ends the iteration.
pub struct Walker {
    pending_root: Option<WalkEntry>,
    max_depth: Option<usize>,
    file_types: FileTypeFilter,
    stack: Vec<DirectoryState>,
    finished: bool,
}

impl Walker {
    pub(crate) fn new(
        root: PathBuf,
        max_depth: Option<usize>,
        file_types: FileTypeFilter,
    ) -> Result<Self, WalkError> {
        debug_log!(Walk, 1, "walking {:?} (max depth {:?})", root, max_depth);

        let metadata = fs::symlink_metadata(&root)
            .map_err(|error| WalkError::root_metadata(root.clone(), error))?;

        Ok(Self {
            pending_root: Some(WalkEntry::new(root, PathBuf::new(), metadata, 0)),
            max_depth,
            file_types,
            stack: Vec::new(),
            finished: false,
        })
    }

    fn descends(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|limit| depth <= limit)
    }

    /// Queues the listing of `entry` when it is a directory within the limit.
    fn enter(&mut self, entry: &WalkEntry) {
        if !entry.metadata.is_dir() {
            return;
        }
        if self.descends(entry.depth) {
            self.stack.push(DirectoryState::new(
                entry.path.clone(),
                entry.relative_path.clone(),
                entry.depth,
            ));
        } else {
            debug_log!(Walk, 3, "depth limit reached at {:?}", entry.path);
        }
    }
}

impl Iterator for Walker {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if let Some(root) = self.pending_root.take() {
            self.enter(&root);
            if self.file_types.matches(&root.metadata) {
                return Some(Ok(root));
            }
        }

        loop {
            let state = self.stack.last_mut()?;
            match state.next_entry() {
                Ok(Some(entry)) => {
                    self.enter(&entry);
                    if self.file_types.matches(&entry.metadata) {
                        debug_log!(Walk, 4, "reporting {:?}", entry.relative_path);
                        return Some(Ok(entry));
                    }
                }
                Ok(None) => {
                    self.stack.pop();
                }
                Err(error) => {
                    self.finished = true;
                    self.stack.clear();
                    return Some(Err(error));
                }
            }
        }
    }
}

enum Phase {
    Unopened,
    Reading(fs::ReadDir),
    Descending(vec::IntoIter<WalkEntry>),
}

/// Listing progress for one directory on the walker's stack.
///
/// The directory handle is opened on the first request and closed before
/// any queued subdirectory is handed out.
pub(crate) struct DirectoryState {
    path: PathBuf,
    relative_path: PathBuf,
    depth: usize,
    phase: Phase,
    subdirectories: Vec<WalkEntry>,
}

impl DirectoryState {
    const fn new(path: PathBuf, relative_path: PathBuf, depth: usize) -> Self {
        Self {
            path,
            relative_path,
            depth,
            phase: Phase::Unopened,
            subdirectories: Vec::new(),
        }
    }

    fn next_entry(&mut self) -> Result<Option<WalkEntry>, WalkError> {
        loop {
            match &mut self.phase {
                Phase::Unopened => {
                    let read_dir = fs::read_dir(&self.path)
                        .map_err(|error| WalkError::read_dir(self.path.clone(), error))?;
                    debug_log!(Walk, 2, "listing directory {:?}", self.path);
                    self.phase = Phase::Reading(read_dir);
                }
                Phase::Reading(read_dir) => match read_dir.next() {
                    Some(dir_entry) => {
                        let dir_entry = dir_entry.map_err(|error| {
                            WalkError::read_dir_entry(self.path.clone(), error)
                        })?;
                        let name = dir_entry.file_name();
                        let path = self.path.join(&name);
                        let metadata = fs::symlink_metadata(&path)
                            .map_err(|error| WalkError::metadata(path.clone(), error))?;
                        let entry = WalkEntry::new(
                            path,
                            self.relative_path.join(&name),
                            metadata,
                            self.depth + 1,
                        );
                        if entry.metadata.is_dir() {
                            self.subdirectories.push(entry);
                        } else {
                            return Ok(Some(entry));
                        }
                    }
                    None => {
                        debug_log!(
                            Walk,
                            3,
                            "{:?}: {} subdirectories queued",
                            self.path,
                            self.subdirectories.len()
                        );
                        let queued = mem::take(&mut self.subdirectories);
                        self.phase = Phase::Descending(queued.into_iter());
                    }
                },
                Phase::Descending(queued) => return Ok(queued.next()),
            }
        }
    }
}
