use std::io::{self, Read};

use alloy_primitives::{Address, B256};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::{
    params::{BATCH_SIZE, PLACEHOLDER},
    Amount, BatchError, Signature, TransactionRecord,
};

/// Projection of one transaction into a pod.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub sender: String,
    pub receiver: String,
    pub amount: Amount,
    pub tx_hash: String,
    pub sender_balance: Amount,
    pub receiver_balance: Amount,
    pub message: String,
    pub tx_nonce: u64,
    pub account_nonce: u64,
    /// Authorization of the transfer. Zeroed in placeholders.
    pub signature: Signature,
}

impl BatchEntry {
    /// Builds an entry from a stored transaction and the chain state observed before it.
    pub fn from_transaction(
        tx: &TransactionRecord,
        sender_balance: Amount,
        receiver_balance: Amount,
        account_nonce: u64,
    ) -> Self {
        Self {
            sender: format_address(&tx.from),
            receiver: format_address(&tx.to),
            amount: tx.value,
            tx_hash: format_hash(&tx.hash),
            sender_balance,
            receiver_balance,
            message: format!("0x{}", hex::encode(&tx.input)),
            tx_nonce: tx.nonce,
            account_nonce,
            signature: Signature::new(tx.v, tx.r, tx.s),
        }
    }

    /// Zero-valued filler used to pad a pod to its fixed size.
    pub fn placeholder() -> Self {
        Self {
            sender: PLACEHOLDER.to_owned(),
            receiver: PLACEHOLDER.to_owned(),
            amount: Amount::ZERO,
            tx_hash: PLACEHOLDER.to_owned(),
            sender_balance: Amount::ZERO,
            receiver_balance: Amount::ZERO,
            message: PLACEHOLDER.to_owned(),
            tx_nonce: 0,
            account_nonce: 0,
            signature: Signature::default(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.tx_hash == PLACEHOLDER
    }
}

fn format_address(addr: &Address) -> String {
    addr.to_checksum(None)
}

fn format_hash(hash: &B256) -> String {
    format!("{hash:#x}")
}

/// A pod: exactly [`BATCH_SIZE`] entries, real transactions first, placeholders after.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize)]
#[serde(try_from = "Vec<BatchEntry>", into = "Vec<BatchEntry>")]
pub struct Batch {
    entries: Vec<BatchEntry>,
}

impl Batch {
    pub fn new(entries: Vec<BatchEntry>) -> Result<Self, BatchError> {
        if entries.len() != BATCH_SIZE {
            return Err(BatchError::WrongSize {
                expected: BATCH_SIZE,
                actual: entries.len(),
            });
        }
        Ok(Self { entries })
    }

    /// Right-pads `real` with placeholders up to [`BATCH_SIZE`].
    pub fn pad(mut real: Vec<BatchEntry>) -> Result<Self, BatchError> {
        if real.len() > BATCH_SIZE {
            return Err(BatchError::Overfull(real.len()));
        }
        real.resize_with(BATCH_SIZE, BatchEntry::placeholder);
        Self::new(real)
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn real_entries(&self) -> impl Iterator<Item = &BatchEntry> + '_ {
        self.entries.iter().filter(|e| !e.is_placeholder())
    }

    pub fn tx_hashes(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.tx_hash.clone()).collect()
    }

    /// Checks that no real transfer moves more than its sender's pre-balance.
    pub fn check_balances(&self) -> Result<(), BatchError> {
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.is_placeholder() {
                continue;
            }
            if entry.amount > entry.sender_balance {
                return Err(BatchError::AmountExceedsBalance {
                    index,
                    tx_hash: entry.tx_hash.clone(),
                    amount: entry.amount,
                    balance: entry.sender_balance,
                });
            }
        }
        Ok(())
    }
}

impl TryFrom<Vec<BatchEntry>> for Batch {
    type Error = BatchError;

    fn try_from(entries: Vec<BatchEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<Batch> for Vec<BatchEntry> {
    fn from(batch: Batch) -> Self {
        batch.entries
    }
}

impl BorshDeserialize for Batch {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let entries: Vec<BatchEntry> = BorshDeserialize::deserialize_reader(reader)?;
        Self::new(entries).map_err(io::Error::other)
    }
}
