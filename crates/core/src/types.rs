//! Core types for respool
//!
//! This module defines the fundamental types used throughout the system:
//! - [`Key`]: Name of one entry in the shared store
//! - [`Member`]: Opaque identifier stored in a set (a pooled resource)
//! - [`Outcome`]: Result of an operation that may give up under contention

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of an entry in the store
///
/// Keys carry no structure beyond their text. Helpers in [`crate::keys`]
/// derive the names a primitive addresses.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key(String);

impl Key {
    /// Create a key from any string-like value
    ///
    /// # Examples
    ///
    /// ```
    /// use respool_core::Key;
    ///
    /// let key = Key::new("workers:available");
    /// assert_eq!(key.as_str(), "workers:available");
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Key(name.into())
    }

    /// Borrow the key text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key(s)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque set member
///
/// A member names one allocatable unit (a worker, a connection slot).
/// Only equality is meaningful; the bytes are never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Member(Vec<u8>);

impl Member {
    /// Create a member from raw bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Member(bytes.into())
    }

    /// Raw bytes of the member
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The member as UTF-8 text, if it is valid UTF-8
    ///
    /// # Examples
    ///
    /// ```
    /// use respool_core::Member;
    ///
    /// assert_eq!(Member::from("w1").as_str(), Some("w1"));
    /// assert_eq!(Member::new(vec![0xff]).as_str(), None);
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Consume the member, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for Member {
    fn from(s: &str) -> Self {
        Member(s.as_bytes().to_vec())
    }
}

impl From<String> for Member {
    fn from(s: String) -> Self {
        Member(s.into_bytes())
    }
}

impl From<&String> for Member {
    fn from(s: &String) -> Self {
        Member(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Member {
    fn from(bytes: Vec<u8>) -> Self {
        Member(bytes)
    }
}

impl From<&[u8]> for Member {
    fn from(bytes: &[u8]) -> Self {
        Member(bytes.to_vec())
    }
}

impl From<&Member> for Member {
    fn from(m: &Member) -> Self {
        m.clone()
    }
}

impl PartialEq<str> for Member {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Member {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

/// Result of an operation that runs under optimistic concurrency
///
/// `Done` carries a definite answer. `Exhausted` means the retry budget ran
/// out before a conflict-free attempt; the true state is unknown, which is
/// different from a confirmed "empty" or "not present" answer inside `Done`.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The operation reached a definite answer
    Done(T),
    /// Every permitted attempt hit a conflicting writer
    Exhausted {
        /// Attempts made before giving up
        attempts: u32,
    },
}

impl<T> Outcome<T> {
    /// Check if the operation reached a definite answer
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    /// Check if the retry budget ran out
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Outcome::Exhausted { .. })
    }

    /// The definite answer, or `None` if the operation gave up
    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Exhausted { .. } => None,
        }
    }

    /// Map the definite answer, keeping `Exhausted` as is
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Done(value) => Outcome::Done(f(value)),
            Outcome::Exhausted { attempts } => Outcome::Exhausted { attempts },
        }
    }

    /// The definite answer, or `default` if the operation gave up
    pub fn unwrap_or(self, default: T) -> T {
        self.done().unwrap_or(default)
    }
}
