//! Primitives built on the respool optimistic protocol
//!
//! - [`ResourcePool`]: available/occupied partition of resource identifiers
//! - [`IdentityLock`]: lock released only by the identity that took it

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod identity_lock;
pub mod resource_pool;

pub use identity_lock::IdentityLock;
pub use resource_pool::{ResourcePool, ResourceStatus};
