//! crates/model/src/acl.rs
//!
//! Ordered entry list with positional editing and a native-style cursor.

use std::slice;

use crate::{AclEntry, AclError, AclResult};

/// ACL family an instance belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AclType {
    /// NFSv4-style ACL; the only family the adapters convert.
    #[default]
    Nfs4,
    /// POSIX.1e access ACL.
    Access,
    /// POSIX.1e default ACL.
    Default,
}

/// Cursor request for [`GenericAcl::entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryId {
    /// Rewind and return the first entry.
    First,
    /// Advance and return the following entry.
    Next,
}

/// Portable ACL: a family tag and entries in evaluation order.
///
/// Order is significant and never changes except through explicit
/// [`insert`](Self::insert) and [`remove`](Self::remove) calls.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenericAcl {
    acl_type: AclType,
    entries: Vec<AclEntry>,
    #[cfg_attr(feature = "serde", serde(skip))]
    cursor: usize,
}

impl GenericAcl {
    /// Creates an empty ACL.
    #[must_use]
    pub const fn new(acl_type: AclType) -> Self {
        Self {
            acl_type,
            entries: Vec::new(),
            cursor: 0,
        }
    }

    /// Creates an empty ACL with room for `capacity` entries.
    pub fn with_capacity(acl_type: AclType, capacity: usize) -> AclResult<Self> {
        let mut acl = Self::new(acl_type);
        acl.reserve(capacity)?;
        Ok(acl)
    }

    /// Returns the ACL family.
    #[must_use]
    pub const fn acl_type(&self) -> AclType {
        self.acl_type
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the ACL has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reserves room for `additional` more entries.
    ///
    /// On failure the ACL is left untouched.
    pub fn reserve(&mut self, additional: usize) -> AclResult<()> {
        self.entries
            .try_reserve(additional)
            .map_err(|_| AclError::OutOfMemory {
                requested: self.entries.len().saturating_add(additional),
            })
    }

    /// Inserts `entry` before `position`; `position == len()` appends.
    pub fn insert(&mut self, position: usize, entry: AclEntry) -> AclResult<()> {
        if position > self.entries.len() {
            return Err(AclError::invalid(format!(
                "insert position {position} out of range for {} entries",
                self.entries.len()
            )));
        }
        self.reserve(1)?;
        self.entries.insert(position, entry);
        if position < self.cursor {
            self.cursor += 1;
        }
        Ok(())
    }

    /// Appends `entry`.
    pub fn push(&mut self, entry: AclEntry) -> AclResult<()> {
        self.insert(self.entries.len(), entry)
    }

    /// Removes and returns the entry at `position`.
    pub fn remove(&mut self, position: usize) -> AclResult<AclEntry> {
        if position >= self.entries.len() {
            return Err(AclError::invalid(format!(
                "remove position {position} out of range for {} entries",
                self.entries.len()
            )));
        }
        if self.cursor > position {
            self.cursor -= 1;
        }
        Ok(self.entries.remove(position))
    }

    /// Returns the entry at `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&AclEntry> {
        self.entries.get(position)
    }

    /// Returns the entry at `position` for in-place editing.
    pub fn get_mut(&mut self, position: usize) -> Option<&mut AclEntry> {
        self.entries.get_mut(position)
    }

    /// Stateful traversal mirroring native `acl_get_entry`.
    ///
    /// [`EntryId::First`] rewinds; [`EntryId::Next`] advances. `None` marks
    /// the end of the list.
    pub fn entry(&mut self, id: EntryId) -> Option<&AclEntry> {
        let index = match id {
            EntryId::First => 0,
            EntryId::Next => self.cursor,
        };
        let entry = self.entries.get(index)?;
        self.cursor = index + 1;
        Some(entry)
    }

    /// Iterates the entries in order.
    pub fn iter(&self) -> slice::Iter<'_, AclEntry> {
        self.entries.iter()
    }

    /// Returns the entries as a slice.
    #[must_use]
    pub fn entries(&self) -> &[AclEntry] {
        &self.entries
    }

    /// Consumes the ACL and returns its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<AclEntry> {
        self.entries
    }
}

impl PartialEq for GenericAcl {
    fn eq(&self, other: &Self) -> bool {
        self.acl_type == other.acl_type && self.entries == other.entries
    }
}

impl Eq for GenericAcl {}

impl<'a> IntoIterator for &'a GenericAcl {
    type Item = &'a AclEntry;
    type IntoIter = slice::Iter<'a, AclEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for GenericAcl {
    type Item = AclEntry;
    type IntoIter = std::vec::IntoIter<AclEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AclErrorKind, EntryKind, Permission, Principal};

    fn entry(uid: u32) -> AclEntry {
        AclEntry::allow(Principal::user(uid)).with_permissions(Permission::ReadData)
    }

    fn uids(acl: &GenericAcl) -> Vec<Option<u32>> {
        acl.iter().map(|e| e.principal.id).collect()
    }

    #[test]
    fn new_acl_is_empty() {
        let acl = GenericAcl::new(AclType::Nfs4);
        assert!(acl.is_empty());
        assert_eq!(acl.len(), 0);
        assert_eq!(acl.acl_type(), AclType::Nfs4);
    }

    #[test]
    fn capacity_hint_does_not_add_entries() {
        let acl = GenericAcl::with_capacity(AclType::Nfs4, 16).expect("reserve");
        assert!(acl.is_empty());
    }

    #[test]
    fn oversized_capacity_reports_out_of_memory() {
        let err = GenericAcl::with_capacity(AclType::Nfs4, usize::MAX).expect_err("too large");
        assert_eq!(err.kind(), AclErrorKind::OutOfMemory);
    }

    #[test]
    fn insert_preserves_existing_order() {
        let mut acl = GenericAcl::new(AclType::Nfs4);
        acl.push(entry(1)).expect("push");
        acl.push(entry(3)).expect("push");
        acl.insert(1, entry(2)).expect("insert middle");
        acl.insert(0, entry(0)).expect("insert front");
        acl.insert(acl.len(), entry(4)).expect("append");
        assert_eq!(uids(&acl), vec![Some(0), Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn insert_past_end_is_invalid() {
        let mut acl = GenericAcl::new(AclType::Nfs4);
        let err = acl.insert(1, entry(1)).expect_err("out of range");
        assert_eq!(err.kind(), AclErrorKind::InvalidArgument);
        assert!(acl.is_empty());
    }

    #[test]
    fn remove_returns_entry_and_shifts() {
        let mut acl = GenericAcl::new(AclType::Nfs4);
        for uid in 0..3 {
            acl.push(entry(uid)).expect("push");
        }
        let removed = acl.remove(1).expect("remove");
        assert_eq!(removed.principal.id, Some(1));
        assert_eq!(uids(&acl), vec![Some(0), Some(2)]);
        assert_eq!(
            acl.remove(2).expect_err("out of range").kind(),
            AclErrorKind::InvalidArgument
        );
    }

    #[test]
    fn get_and_get_mut() {
        let mut acl = GenericAcl::new(AclType::Nfs4);
        acl.push(entry(5)).expect("push");
        acl.get_mut(0).expect("entry").kind = EntryKind::Deny;
        assert_eq!(acl.get(0).expect("entry").kind, EntryKind::Deny);
        assert!(acl.get(1).is_none());
    }

    #[test]
    fn cursor_walks_until_sentinel() {
        let mut acl = GenericAcl::new(AclType::Nfs4);
        for uid in 10..13 {
            acl.push(entry(uid)).expect("push");
        }

        let mut seen = Vec::new();
        let mut next = acl.entry(EntryId::First).map(|e| e.principal.id);
        while let Some(id) = next {
            seen.push(id);
            next = acl.entry(EntryId::Next).map(|e| e.principal.id);
        }
        assert_eq!(seen, vec![Some(10), Some(11), Some(12)]);

        assert!(acl.entry(EntryId::Next).is_none());
        assert_eq!(
            acl.entry(EntryId::First).map(|e| e.principal.id),
            Some(Some(10))
        );
    }

    #[test]
    fn cursor_on_empty_acl_returns_none() {
        let mut acl = GenericAcl::new(AclType::Nfs4);
        assert!(acl.entry(EntryId::First).is_none());
        assert!(acl.entry(EntryId::Next).is_none());
    }

    #[test]
    fn remove_before_cursor_keeps_position() {
        let mut acl = GenericAcl::new(AclType::Nfs4);
        for uid in 0..4 {
            acl.push(entry(uid)).expect("push");
        }
        acl.entry(EntryId::First);
        acl.entry(EntryId::Next);
        acl.remove(0).expect("remove");
        assert_eq!(
            acl.entry(EntryId::Next).map(|e| e.principal.id),
            Some(Some(2))
        );
    }

    #[test]
    fn owned_iteration_yields_entries() {
        let mut acl = GenericAcl::new(AclType::Nfs4);
        acl.push(entry(9)).expect("push");
        let entries: Vec<AclEntry> = acl.into_iter().collect();
        assert_eq!(entries.len(), 1);
    }
}
