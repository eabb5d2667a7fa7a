//! In-process store client
//!
//! `MemoryStore` implements every [`Store`] primitive against process memory.
//! It is the store used by tests, benchmarks, and single-process deployments,
//! and it follows the same contract a networked store would.
//!
//! # Design
//!
//! - DashMap of versioned [`Slot`]s: sharded, so single-key operations on
//!   different keys do not contend
//! - Global version counter: every modification stamps its slot with a fresh
//!   version, which is what [`Store::watch`] records
//! - Commit gate (`RwLock<()>`): single-key operations share it, batches and
//!   moves take it exclusively, so a batch is validated and applied with no
//!   other operation interleaved
//!
//! # Tombstones
//!
//! Deleting a key or emptying a set leaves a tombstone slot that keeps the
//! key's version. Without it a watch taken while the key was absent could not
//! see the key being created and deleted again. Tombstones are only dropped by
//! [`MemoryStore::flush`] and [`MemoryStore::prune_tombstones`].
//!
//! # Thread Safety
//!
//! At most one DashMap guard is held at a time, which rules out shard
//! self-deadlock when two keys hash to the same shard.

use crate::slot::{wrong_type, Entry, Slot};
use dashmap::DashMap;
use parking_lot::RwLock;
use rand::seq::IteratorRandom;
use respool_core::{
    Command, CommitOutcome, Key, Member, ReadOp, Reply, Result, Store, Watch, WatchedKey,
    WriteBatch,
};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Counters describing store activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreMetrics {
    /// Conditional commits that applied
    pub commits: u64,
    /// Conditional commits rejected because a watched key changed
    pub conflicts: u64,
    /// Unconditional batches applied
    pub batches: u64,
    /// Keys that currently exist
    pub live_keys: usize,
}

/// Shared in-memory key-value store
pub struct MemoryStore {
    slots: DashMap<Key, Slot>,
    version: AtomicU64,
    gate: RwLock<()>,
    commits: AtomicU64,
    conflicts: AtomicU64,
    batches: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            version: AtomicU64::new(0),
            gate: RwLock::new(()),
            commits: AtomicU64::new(0),
            conflicts: AtomicU64::new(0),
            batches: AtomicU64::new(0),
        }
    }

    /// Create with room for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: DashMap::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Current global version
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    #[inline]
    fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Number of keys that currently exist
    pub fn live_keys(&self) -> usize {
        let _gate = self.gate.read();
        self.slots.iter().filter(|slot| slot.is_live()).count()
    }

    /// Modification version of a key (0 if never written)
    pub fn key_version(&self, key: &Key) -> u64 {
        let _gate = self.gate.read();
        self.version_of(key)
    }

    /// All members of the set at `key`, sorted
    pub fn members(&self, key: &Key) -> Result<Vec<Member>> {
        let _gate = self.gate.read();
        let mut members: Vec<Member> = match self.slots.get(key) {
            Some(slot) => slot
                .set(key)?
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default(),
            None => Vec::new(),
        };
        members.sort();
        Ok(members)
    }

    /// Number of slots held, tombstones included
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Remove every key and tombstone
    ///
    /// Every slot is dropped, so a flushed key reads as never written
    /// (version 0). A watch on a key that existed before the flush recorded a
    /// non-zero version and conflicts with any later commit.
    pub fn flush(&self) {
        let _gate = self.gate.write();
        self.slots.clear();
    }

    /// Drop tombstones stamped at or before `horizon`; returns how many
    ///
    /// Pass a [`MemoryStore::version`] read before the oldest watch still
    /// outstanding began. Such a watch recorded any older tombstone's version,
    /// so pruning can only turn its commit into a conflict, never let a
    /// change slip past it.
    pub fn prune_tombstones(&self, horizon: u64) -> usize {
        let _gate = self.gate.write();
        let before = self.slots.len();
        self.slots
            .retain(|_, slot| slot.is_live() || slot.version() > horizon);
        let pruned = before - self.slots.len();
        if pruned > 0 {
            trace!(pruned, horizon, "tombstones pruned");
        }
        pruned
    }

    /// Activity counters
    pub fn metrics(&self) -> StoreMetrics {
        StoreMetrics {
            commits: self.commits.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            live_keys: self.live_keys(),
        }
    }

    // ========================================================================
    // Gate-held helpers
    // ========================================================================

    fn version_of(&self, key: &Key) -> u64 {
        self.slots.get(key).map(|slot| slot.version()).unwrap_or(0)
    }

    fn holds_bytes(&self, key: &Key) -> bool {
        self.slots
            .get(key)
            .map(|slot| matches!(slot.entry(), Some(Entry::Bytes(_))))
            .unwrap_or(false)
    }

    fn add_member(&self, key: &Key, member: Member) -> Result<bool> {
        let mut slot = self.slots.entry(key.clone()).or_default();
        let version = self.next_version();
        slot.insert_member(key, member, version)
    }

    fn remove_member(&self, key: &Key, member: &Member) -> Result<bool> {
        match self.slots.get_mut(key) {
            Some(mut slot) => {
                let version = self.next_version();
                slot.remove_member(key, member, version)
            }
            None => Ok(false),
        }
    }

    fn is_member(&self, key: &Key, member: &Member) -> Result<bool> {
        match self.slots.get(key) {
            Some(slot) => Ok(slot.set(key)?.map(|s| s.contains(member)).unwrap_or(false)),
            None => Ok(false),
        }
    }

    fn cardinality(&self, key: &Key) -> Result<usize> {
        match self.slots.get(key) {
            Some(slot) => Ok(slot.set(key)?.map(|s| s.len()).unwrap_or(0)),
            None => Ok(0),
        }
    }

    fn random_member(&self, key: &Key) -> Result<Option<Member>> {
        match self.slots.get(key) {
            Some(slot) => Ok(slot
                .set(key)?
                .and_then(|s| s.iter().choose(&mut rand::thread_rng()).cloned())),
            None => Ok(None),
        }
    }

    fn read_bytes(&self, key: &Key) -> Result<Option<Vec<u8>>> {
        match self.slots.get(key) {
            Some(slot) => Ok(slot.bytes(key)?.cloned()),
            None => Ok(None),
        }
    }

    /// Requires the gate held exclusively.
    fn move_member(&self, source: &Key, dest: &Key, member: &Member) -> Result<bool> {
        if let Some(slot) = self.slots.get(dest) {
            slot.set(dest)?;
        }
        if source == dest {
            return self.is_member(source, member);
        }
        if !self.remove_member(source, member)? {
            return Ok(false);
        }
        self.add_member(dest, member.clone())?;
        Ok(true)
    }

    fn apply_command(&self, command: Command) -> Result<Reply> {
        match command {
            Command::Set { key, value } => {
                let mut slot = self.slots.entry(key).or_default();
                let version = self.next_version();
                slot.put_bytes(value, version);
                Ok(Reply::Bool(true))
            }
            Command::Delete { key } => Ok(Reply::Bool(self.clear(&key))),
            Command::SetAdd { key, member } => self.add_member(&key, member).map(Reply::Bool),
            Command::SetRemove { key, member } => {
                self.remove_member(&key, &member).map(Reply::Bool)
            }
            Command::SetMove {
                source,
                dest,
                member,
            } => self.move_member(&source, &dest, &member).map(Reply::Bool),
        }
    }

    fn clear(&self, key: &Key) -> bool {
        match self.slots.get_mut(key) {
            Some(mut slot) => {
                let version = self.next_version();
                slot.clear(version)
            }
            None => false,
        }
    }

    fn read_one(&self, op: &ReadOp) -> Result<Reply> {
        match op {
            ReadOp::Get { key } => self.read_bytes(key).map(Reply::Value),
            ReadOp::IsMember { key, member } => self.is_member(key, member).map(Reply::Bool),
            ReadOp::Cardinality { key } => self.cardinality(key).map(Reply::Count),
            ReadOp::RandomMember { key } => self.random_member(key).map(Reply::Member),
        }
    }

    /// Reject a batch up front if any command would hit a wrong-type entry,
    /// so a batch never stops half-applied.
    fn check_batch(&self, batch: &WriteBatch) -> Result<()> {
        let mut holds_bytes: FxHashMap<&Key, bool> = FxHashMap::default();
        let expect_set = |key: &Key, overlay: &FxHashMap<&Key, bool>| -> Result<()> {
            let is_bytes = overlay
                .get(key)
                .copied()
                .unwrap_or_else(|| self.holds_bytes(key));
            if is_bytes {
                return Err(wrong_type(key, "set", &Entry::Bytes(Vec::new())));
            }
            Ok(())
        };

        for command in batch.commands() {
            match command {
                Command::Set { key, .. } => {
                    holds_bytes.insert(key, true);
                }
                Command::Delete { key } => {
                    holds_bytes.insert(key, false);
                }
                Command::SetAdd { key, .. } => {
                    expect_set(key, &holds_bytes)?;
                    holds_bytes.insert(key, false);
                }
                Command::SetRemove { key, .. } => expect_set(key, &holds_bytes)?,
                Command::SetMove { source, dest, .. } => {
                    expect_set(source, &holds_bytes)?;
                    expect_set(dest, &holds_bytes)?;
                    holds_bytes.insert(dest, false);
                }
            }
        }
        Ok(())
    }

    fn apply_batch(&self, batch: WriteBatch) -> Result<Vec<Reply>> {
        self.check_batch(&batch)?;
        batch
            .into_iter()
            .map(|command| self.apply_command(command))
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("slots", &self.slots.len())
            .field("version", &self.version())
            .finish()
    }
}

impl Store for MemoryStore {
    fn watch(&self, keys: &[Key]) -> Result<Watch> {
        let _gate = self.gate.read();
        let watched = keys
            .iter()
            .map(|key| WatchedKey {
                key: key.clone(),
                version: self.version_of(key),
            })
            .collect();
        Ok(Watch::new(watched))
    }

    fn commit(&self, watch: &Watch, batch: WriteBatch) -> Result<CommitOutcome> {
        let _gate = self.gate.write();

        let changed = watch
            .keys()
            .iter()
            .find(|watched| self.version_of(&watched.key) != watched.version);
        if let Some(watched) = changed {
            self.conflicts.fetch_add(1, Ordering::Relaxed);
            trace!(key = %watched.key, "watched key changed, commit rejected");
            return Ok(CommitOutcome::Conflict);
        }

        let replies = self.apply_batch(batch)?;
        self.commits.fetch_add(1, Ordering::Relaxed);
        Ok(CommitOutcome::Applied(replies))
    }

    fn execute(&self, batch: WriteBatch) -> Result<Vec<Reply>> {
        let _gate = self.gate.write();
        let replies = self.apply_batch(batch)?;
        self.batches.fetch_add(1, Ordering::Relaxed);
        Ok(replies)
    }

    fn read_batch(&self, reads: &[ReadOp]) -> Result<Vec<Reply>> {
        let _gate = self.gate.read();
        reads.iter().map(|op| self.read_one(op)).collect()
    }

    fn get(&self, key: &Key) -> Result<Option<Vec<u8>>> {
        let _gate = self.gate.read();
        self.read_bytes(key)
    }

    fn set(&self, key: &Key, value: &[u8]) -> Result<()> {
        let _gate = self.gate.read();
        let mut slot = self.slots.entry(key.clone()).or_default();
        let version = self.next_version();
        slot.put_bytes(value.to_vec(), version);
        Ok(())
    }

    fn set_if_absent(&self, key: &Key, value: &[u8]) -> Result<bool> {
        let _gate = self.gate.read();
        let mut slot = self.slots.entry(key.clone()).or_default();
        if slot.is_live() {
            return Ok(false);
        }
        let version = self.next_version();
        slot.put_bytes(value.to_vec(), version);
        Ok(true)
    }

    fn delete(&self, key: &Key) -> Result<bool> {
        let _gate = self.gate.read();
        Ok(self.clear(key))
    }

    fn set_add(&self, key: &Key, member: &Member) -> Result<bool> {
        let _gate = self.gate.read();
        self.add_member(key, member.clone())
    }

    fn set_remove(&self, key: &Key, member: &Member) -> Result<bool> {
        let _gate = self.gate.read();
        self.remove_member(key, member)
    }

    fn set_is_member(&self, key: &Key, member: &Member) -> Result<bool> {
        let _gate = self.gate.read();
        self.is_member(key, member)
    }

    fn set_cardinality(&self, key: &Key) -> Result<usize> {
        let _gate = self.gate.read();
        self.cardinality(key)
    }

    fn set_random_member(&self, key: &Key) -> Result<Option<Member>> {
        let _gate = self.gate.read();
        self.random_member(key)
    }

    fn set_move(&self, source: &Key, dest: &Key, member: &Member) -> Result<bool> {
        let _gate = self.gate.write();
        self.move_member(source, dest, member)
    }
}
