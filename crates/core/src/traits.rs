//! Store client boundary
//!
//! The [`Store`] trait is everything respool needs from a shared key-value
//! store: plain reads and writes, set primitives, batched reads, and the
//! watch / conditional-commit pair the optimistic protocol is built on.
//!
//! ## Watch semantics
//!
//! [`Store::watch`] records the modification version of each named key,
//! including keys that do not exist yet. [`Store::commit`] applies a
//! [`WriteBatch`] only if every watched key still carries the recorded
//! version. Any mutation by anyone (create, overwrite, delete, a set emptied
//! to nothing) changes the version, so a commit after such a mutation reports
//! [`CommitOutcome::Conflict`] and applies nothing.

use crate::error::{Error, Result};
use crate::types::{Key, Member};

/// A key together with the version observed when the watch began
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedKey {
    /// Watched key
    pub key: Key,
    /// Modification version at watch time (0 if the key was never written)
    pub version: u64,
}

/// Change-detection registration on a set of keys
///
/// Produced by [`Store::watch`] and consumed by [`Store::commit`] or
/// [`Store::unwatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watch {
    keys: Vec<WatchedKey>,
}

impl Watch {
    /// Create a watch from observed key versions
    pub fn new(keys: Vec<WatchedKey>) -> Self {
        Self { keys }
    }

    /// Observed key versions
    pub fn keys(&self) -> &[WatchedKey] {
        &self.keys
    }

    /// Number of watched keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if nothing is watched
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// One write in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store bytes under a key, replacing any value
    Set {
        /// Target key
        key: Key,
        /// New value
        value: Vec<u8>,
    },
    /// Remove a key of any kind
    Delete {
        /// Target key
        key: Key,
    },
    /// Add a member to a set
    SetAdd {
        /// Set key
        key: Key,
        /// Member to add
        member: Member,
    },
    /// Remove a member from a set
    SetRemove {
        /// Set key
        key: Key,
        /// Member to remove
        member: Member,
    },
    /// Move a member between sets if it is in the source
    SetMove {
        /// Set to take the member from
        source: Key,
        /// Set to put the member in
        dest: Key,
        /// Member to move
        member: Member,
    },
}

impl Command {
    /// Key(s) this command writes
    pub fn keys(&self) -> Vec<&Key> {
        match self {
            Command::Set { key, .. }
            | Command::Delete { key }
            | Command::SetAdd { key, .. }
            | Command::SetRemove { key, .. } => vec![key],
            Command::SetMove { source, dest, .. } => vec![source, dest],
        }
    }
}

/// One read in a batched read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOp {
    /// Read the bytes stored under a key
    Get {
        /// Target key
        key: Key,
    },
    /// Test set membership
    IsMember {
        /// Set key
        key: Key,
        /// Member to test
        member: Member,
    },
    /// Number of members in a set
    Cardinality {
        /// Set key
        key: Key,
    },
    /// One member chosen uniformly at random
    RandomMember {
        /// Set key
        key: Key,
    },
}

/// Reply to a single command or read, in request order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Whether the command took effect, or a membership answer
    Bool(bool),
    /// A count
    Count(usize),
    /// Bytes stored under a key
    Value(Option<Vec<u8>>),
    /// A set member
    Member(Option<Member>),
}

impl Reply {
    /// Interpret as a boolean reply
    pub fn to_bool(&self) -> Result<bool> {
        match self {
            Reply::Bool(b) => Ok(*b),
            other => Err(unexpected("bool", other)),
        }
    }

    /// Interpret as a count reply
    pub fn to_count(&self) -> Result<usize> {
        match self {
            Reply::Count(n) => Ok(*n),
            other => Err(unexpected("count", other)),
        }
    }

    /// Interpret as a value reply
    pub fn into_value(self) -> Result<Option<Vec<u8>>> {
        match self {
            Reply::Value(v) => Ok(v),
            other => Err(unexpected("value", &other)),
        }
    }

    /// Interpret as a member reply
    pub fn into_member(self) -> Result<Option<Member>> {
        match self {
            Reply::Member(m) => Ok(m),
            other => Err(unexpected("member", &other)),
        }
    }
}

fn unexpected(wanted: &str, got: &Reply) -> Error {
    Error::Internal(format!("expected {} reply, got {:?}", wanted, got))
}

/// Ordered batch of writes applied as one unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    commands: Vec<Command>,
}

impl WriteBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command
    pub fn push(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    /// Append a set-bytes command
    pub fn set(mut self, key: Key, value: impl Into<Vec<u8>>) -> Self {
        self.commands.push(Command::Set {
            key,
            value: value.into(),
        });
        self
    }

    /// Append a delete command
    pub fn delete(mut self, key: Key) -> Self {
        self.commands.push(Command::Delete { key });
        self
    }

    /// Append a set-add command
    pub fn set_add(mut self, key: Key, member: impl Into<Member>) -> Self {
        self.commands.push(Command::SetAdd {
            key,
            member: member.into(),
        });
        self
    }

    /// Append a set-remove command
    pub fn set_remove(mut self, key: Key, member: impl Into<Member>) -> Self {
        self.commands.push(Command::SetRemove {
            key,
            member: member.into(),
        });
        self
    }

    /// Append a set-move command
    pub fn set_move(mut self, source: Key, dest: Key, member: impl Into<Member>) -> Self {
        self.commands.push(Command::SetMove {
            source,
            dest,
            member: member.into(),
        });
        self
    }

    /// Commands in application order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the batch has no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl IntoIterator for WriteBatch {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

/// Result of a conditional commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every command was applied; replies are in command order
    Applied(Vec<Reply>),
    /// A watched key changed; nothing was applied
    Conflict,
}

/// Client for a shared key-value store
///
/// Implementations are shared between threads; every method takes `&self`.
/// Transport failures surface as [`Error::Connection`] and are never retried
/// by callers in this workspace.
pub trait Store: Send + Sync {
    /// Begin watching keys for modification by anyone
    fn watch(&self, keys: &[Key]) -> Result<Watch>;

    /// Stop watching without committing
    fn unwatch(&self, watch: Watch) {
        drop(watch);
    }

    /// Apply `batch` atomically iff no key in `watch` changed since it began
    fn commit(&self, watch: &Watch, batch: WriteBatch) -> Result<CommitOutcome>;

    /// Apply `batch` atomically with no precondition
    fn execute(&self, batch: WriteBatch) -> Result<Vec<Reply>>;

    /// Issue several reads together; replies are in request order
    fn read_batch(&self, reads: &[ReadOp]) -> Result<Vec<Reply>>;

    /// Bytes stored under `key`
    fn get(&self, key: &Key) -> Result<Option<Vec<u8>>>;

    /// Store bytes under `key`, replacing any value
    fn set(&self, key: &Key, value: &[u8]) -> Result<()>;

    /// Store bytes under `key` only if the key does not exist
    fn set_if_absent(&self, key: &Key, value: &[u8]) -> Result<bool>;

    /// Remove `key`; returns whether it existed
    fn delete(&self, key: &Key) -> Result<bool>;

    /// Add `member` to the set at `key`; returns whether it was newly added
    fn set_add(&self, key: &Key, member: &Member) -> Result<bool>;

    /// Remove `member` from the set at `key`; returns whether it was present
    fn set_remove(&self, key: &Key, member: &Member) -> Result<bool>;

    /// Check whether `member` belongs to the set at `key`
    fn set_is_member(&self, key: &Key, member: &Member) -> Result<bool>;

    /// Number of members in the set at `key` (0 if absent)
    fn set_cardinality(&self, key: &Key) -> Result<usize>;

    /// A uniformly random member of the set at `key`, if non-empty
    fn set_random_member(&self, key: &Key) -> Result<Option<Member>>;

    /// Atomically move `member` from `source` to `dest` if it is in `source`
    fn set_move(&self, source: &Key, dest: &Key, member: &Member) -> Result<bool>;
}
