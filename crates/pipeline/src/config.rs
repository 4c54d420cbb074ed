use std::time::Duration;

use podseq_common::RetryConfig;
use serde::{Deserialize, Serialize};

/// Wait and retry intervals of the batch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Wait before re-reading a transaction ingestion has not stored yet.
    #[serde(default = "default_record_wait_ms")]
    pub record_wait_ms: u64,

    #[serde(default = "default_da_retry_ms")]
    pub da_retry_ms: u64,

    #[serde(default = "default_settlement_retry_ms")]
    pub settlement_retry_ms: u64,

    /// Cap on commit and verify attempts. Unbounded when unset.
    #[serde(default)]
    pub settlement_max_attempts: Option<u32>,
}

fn default_record_wait_ms() -> u64 {
    1_000
}

fn default_da_retry_ms() -> u64 {
    3_000
}

fn default_settlement_retry_ms() -> u64 {
    5_000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            record_wait_ms: default_record_wait_ms(),
            da_retry_ms: default_da_retry_ms(),
            settlement_retry_ms: default_settlement_retry_ms(),
            settlement_max_attempts: None,
        }
    }
}

impl PipelineConfig {
    pub fn record_wait(&self) -> Duration {
        Duration::from_millis(self.record_wait_ms)
    }

    pub fn da_retry(&self) -> RetryConfig {
        RetryConfig::unbounded(self.da_retry_ms)
    }

    pub fn settlement_retry(&self) -> RetryConfig {
        RetryConfig {
            interval_ms: self.settlement_retry_ms,
            max_attempts: self.settlement_max_attempts,
        }
    }
}
