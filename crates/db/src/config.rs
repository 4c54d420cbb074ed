use std::sync::Arc;

use typed_sled::transaction::{Backoff, ConstantBackoff};

const DEFAULT_RETRY_COUNT: u16 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 150;
const TEST_RETRY_DELAY_MS: u64 = 50;

/// Retry settings for conflicting sled transactions.
#[derive(Debug, Clone)]
pub struct SledDbConfig {
    pub retry_count: u16,
    pub backoff: Arc<dyn Backoff>,
}

impl SledDbConfig {
    pub fn new_with_constant_backoff(retry_count: u16, delay_ms: u64) -> Self {
        Self {
            retry_count,
            backoff: Arc::new(ConstantBackoff::new(delay_ms)),
        }
    }

    pub fn production() -> Self {
        Self::new_with_constant_backoff(DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY_MS)
    }

    /// Same retry count as production, shorter delay.
    pub fn test() -> Self {
        Self::new_with_constant_backoff(DEFAULT_RETRY_COUNT, TEST_RETRY_DELAY_MS)
    }
}
