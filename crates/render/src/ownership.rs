use std::fs::Metadata;

/// Owner and group ids used to name `owner@` and `group@` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ownership {
    /// Owning user id.
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
}

impl Ownership {
    /// Creates ownership from raw ids.
    #[must_use]
    pub const fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }

    /// Reads the owning ids from file metadata.
    ///
    /// Returns `None` on targets without Unix ownership.
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            Some(Self::new(metadata.uid(), metadata.gid()))
        }
        #[cfg(not(unix))]
        {
            let _ = metadata;
            None
        }
    }
}
