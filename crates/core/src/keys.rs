//! Key naming for pool sets
//!
//! Both set names are derived from the pool name alone so that every client
//! addressing the same pool agrees on them without shared configuration.

use crate::types::Key;

/// Name of the set holding a pool's idle resources.
pub fn available_key(pool: &str) -> Key {
    Key::new(format!("{}:available", pool))
}

/// Name of the set holding a pool's checked-out resources.
pub fn occupied_key(pool: &str) -> Key {
    Key::new(format!("{}:occupied", pool))
}
