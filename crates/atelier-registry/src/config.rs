//! Registry tuning knobs

use std::time::Duration;

/// Default bound on a single write transaction
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Upper bound for one transaction; on expiry it is rolled back
    pub transaction_timeout: Duration,
}

impl RegistryConfig {
    pub fn with_timeout(transaction_timeout: Duration) -> Self {
        Self {
            transaction_timeout,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TRANSACTION_TIMEOUT)
    }
}
