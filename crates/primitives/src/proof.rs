use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::{Amount, Signature, StateCommitment};

/// Public inputs of a pod proof, revealed to the settlement layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicWitness {
    pub batch_number: u64,
    pub state_commitment: StateCommitment,
    pub entries: Vec<WitnessEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitnessEntry {
    pub sender: String,
    pub receiver: String,
    pub amount: Amount,
    pub tx_hash: String,
    pub sender_balance: Amount,
    pub receiver_balance: Amount,
    pub sender_balance_after: Amount,
    pub receiver_balance_after: Amount,
    pub message: String,
    pub signature: Signature,
}

/// Opaque proof bytes produced by a prover backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(transparent)]
pub struct Proof(#[serde(with = "hex::serde")] Vec<u8>);

impl Proof {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
