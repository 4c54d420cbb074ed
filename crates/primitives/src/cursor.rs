use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::params::BATCH_SIZE_U64;

/// Resume point of the batch pipeline.
///
/// Only advanced after a pod has been published, committed and verified.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCursor {
    /// Number of pods fully completed.
    pub batch_count: u64,
    /// Sequence number of the first transaction not yet in a completed pod.
    pub batch_start_index: u64,
}

impl ProgressCursor {
    pub const fn new(batch_count: u64, batch_start_index: u64) -> Self {
        Self {
            batch_count,
            batch_start_index,
        }
    }

    /// Number of the pod to build next.
    pub fn next_batch_number(&self) -> u64 {
        self.batch_count + 1
    }

    /// Exclusive upper bound of the sequence window for the next pod.
    pub fn window_end(&self) -> u64 {
        self.next_batch_number() * BATCH_SIZE_U64
    }

    pub fn advance(&self) -> Self {
        Self {
            batch_count: self.batch_count + 1,
            batch_start_index: self.batch_start_index + BATCH_SIZE_U64,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.batch_start_index == self.batch_count * BATCH_SIZE_U64
    }
}

/// Resume point of chain ingestion.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct IngestCursor {
    pub next_block: u64,
    pub next_tx_seq: u64,
}
