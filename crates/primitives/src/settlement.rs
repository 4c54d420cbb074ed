use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Identity assigned to this node when it registered with the settlement layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementChainInfo {
    pub chain_id: String,
    pub chain_name: String,
}

/// Proof that the settlement layer accepted the commit phase of a pod.
///
/// Only a successful commit produces one, and the verify phase takes one as input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReceipt {
    pub batch_number: u64,
    /// Opaque value returned in the commit response body.
    pub settlement_ref: String,
}
