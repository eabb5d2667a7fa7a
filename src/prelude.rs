//! Convenient imports for respool.
//!
//! This module re-exports the most commonly used types so you can get started
//! with a single import:
//!
//! ```ignore
//! use respool::prelude::*;
//!
//! let respool = Respool::open();
//! respool.pool("workers").associate("w1")?;
//! ```

// Main entry point
pub use crate::database::{Respool, RespoolBuilder};
pub use crate::config::RespoolConfig;

// Error handling
pub use crate::error::{Error, Result};

// Primitives
pub use crate::types::{IdentityLock, ResourcePool, ResourceStatus};

// Core types
pub use crate::types::{Key, Member, Outcome};

// Retry configuration
pub use crate::types::{Backoff, RetryPolicy};

// Store
pub use crate::types::{MemoryStore, Store};
