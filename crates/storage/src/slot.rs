//! Versioned entries held by the memory store

use respool_core::{Error, Key, Member, Result};
use rustc_hash::FxHashSet;

/// Value stored under a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Opaque bytes
    Bytes(Vec<u8>),
    /// Unordered set of members (never empty while stored)
    Set(FxHashSet<Member>),
}

impl Entry {
    /// Name of this entry kind, used in wrong-type errors
    pub fn kind(&self) -> &'static str {
        match self {
            Entry::Bytes(_) => "bytes",
            Entry::Set(_) => "set",
        }
    }
}

/// A key's current entry plus its modification version
///
/// The slot outlives its entry: deleting a key leaves a tombstone that keeps
/// the version, so a watcher sees delete-then-recreate as a change.
#[derive(Debug, Clone, Default)]
pub struct Slot {
    pub(crate) entry: Option<Entry>,
    pub(crate) version: u64,
}

impl Slot {
    /// Current entry, if the key exists
    pub fn entry(&self) -> Option<&Entry> {
        self.entry.as_ref()
    }

    /// Version of the last modification (0 if never written)
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Check if the key currently exists
    pub fn is_live(&self) -> bool {
        self.entry.is_some()
    }

    /// Borrow the set, treating a missing key as an empty set
    pub(crate) fn set(&self, key: &Key) -> Result<Option<&FxHashSet<Member>>> {
        match &self.entry {
            None => Ok(None),
            Some(Entry::Set(set)) => Ok(Some(set)),
            Some(other) => Err(wrong_type(key, "set", other)),
        }
    }

    /// Borrow the bytes, treating a missing key as absent
    pub(crate) fn bytes(&self, key: &Key) -> Result<Option<&Vec<u8>>> {
        match &self.entry {
            None => Ok(None),
            Some(Entry::Bytes(bytes)) => Ok(Some(bytes)),
            Some(other) => Err(wrong_type(key, "bytes", other)),
        }
    }

    /// Add to the set, creating it if needed. Bumps the version on change.
    pub(crate) fn insert_member(&mut self, key: &Key, member: Member, version: u64) -> Result<bool> {
        let added = match &mut self.entry {
            None => {
                let mut set = FxHashSet::default();
                set.insert(member);
                self.entry = Some(Entry::Set(set));
                true
            }
            Some(Entry::Set(set)) => set.insert(member),
            Some(other) => return Err(wrong_type(key, "set", other)),
        };
        if added {
            self.version = version;
        }
        Ok(added)
    }

    /// Remove from the set, dropping it when emptied. Bumps the version on change.
    pub(crate) fn remove_member(&mut self, key: &Key, member: &Member, version: u64) -> Result<bool> {
        let removed = match &mut self.entry {
            None => false,
            Some(Entry::Set(set)) => {
                let removed = set.remove(member);
                if set.is_empty() {
                    self.entry = None;
                }
                removed
            }
            Some(other) => return Err(wrong_type(key, "set", other)),
        };
        if removed {
            self.version = version;
        }
        Ok(removed)
    }

    /// Replace the entry with bytes. Always a modification.
    pub(crate) fn put_bytes(&mut self, value: Vec<u8>, version: u64) {
        self.entry = Some(Entry::Bytes(value));
        self.version = version;
    }

    /// Clear the entry, leaving a tombstone. Bumps the version if it existed.
    pub(crate) fn clear(&mut self, version: u64) -> bool {
        let existed = self.entry.take().is_some();
        if existed {
            self.version = version;
        }
        existed
    }
}

pub(crate) fn wrong_type(key: &Key, expected: &'static str, actual: &Entry) -> Error {
    Error::WrongType {
        key: key.to_string(),
        expected,
        actual: actual.kind(),
    }
}
