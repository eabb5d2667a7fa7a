//! Configuration for the respool facade.
//!
//! ```ignore
//! let config = RespoolConfig::from_json(r#"{"retry": {"max_attempts": 8}}"#)?;
//! let respool = Respool::builder().config(config).open();
//! ```

use crate::error::{Error, Result};
use respool_concurrency::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Settings shared by every primitive a [`crate::Respool`] hands out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RespoolConfig {
    /// Retry policy for optimistic transactions
    pub retry: RetryPolicy,
}

impl RespoolConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RespoolConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no store could honor.
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == Some(0) {
            return Err(Error::InvalidInput(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
