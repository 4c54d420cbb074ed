use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{params::PLACEHOLDER, Batch, BatchEntry};

/// Hex-encoded root of the pairwise accumulator over a batch's entries.
///
/// The genesis value is the placeholder string, not a hash.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(transparent)]
pub struct StateCommitment(String);

impl StateCommitment {
    pub fn genesis() -> Self {
        Self(PLACEHOLDER.to_owned())
    }

    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn compute(batch: &Batch) -> Self {
        let leaves = batch.entries().iter().map(leaf_hash).collect();
        Self(accumulate(leaves))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content hash of a single entry.
pub fn leaf_hash(entry: &BatchEntry) -> String {
    let mut hasher = Sha256::new();
    hasher.update(entry.receiver.as_bytes());
    hasher.update(entry.sender.as_bytes());
    hasher.update(entry.amount.to_string().as_bytes());
    hasher.update(entry.sender_balance.to_string().as_bytes());
    hasher.update(entry.receiver_balance.to_string().as_bytes());
    hasher.update(entry.tx_hash.as_bytes());
    hex::encode(hasher.finalize())
}

fn hash_pair(left: &str, right: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    hex::encode(hasher.finalize())
}

/// Reduces hex leaves level by level. An unpaired last node moves up as-is.
fn accumulate(mut level: Vec<String>) -> String {
    if level.is_empty() {
        return PLACEHOLDER.to_owned();
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_pair(left, right),
                _ => pair[0].clone(),
            })
            .collect();
    }

    level.swap_remove(0)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::Amount;

    #[test]
    fn test_single_leaf_is_root() {
        let leaf = "ab".repeat(32);
        assert_eq!(accumulate(vec![leaf.clone()]), leaf);
    }

    #[test]
    fn test_odd_node_carried_up() {
        let (a, b, c) = ("aa".to_owned(), "bb".to_owned(), "cc".to_owned());
        let expected = hash_pair(&hash_pair(&a, &b), &c);
        assert_eq!(accumulate(vec![a, b, c]), expected);
    }

    #[test]
    fn test_placeholder_leaf_matches_concatenated_zeros() {
        let expected = hex::encode(Sha256::digest(b"000000"));
        assert_eq!(leaf_hash(&BatchEntry::placeholder()), expected);
    }

    #[test]
    fn test_commitment_depends_on_amount() {
        let base = Batch::pad(vec![]).unwrap();
        let mut entry = BatchEntry::placeholder();
        entry.tx_hash = "0x01".to_owned();
        entry.amount = Amount::from(5u64);
        entry.sender_balance = Amount::from(5u64);
        let changed = Batch::pad(vec![entry]).unwrap();
        assert_ne!(StateCommitment::compute(&base), StateCommitment::compute(&changed));
    }

    proptest! {
        #[test]
        fn proptest_root_is_hex_digest(n in 2usize..64) {
            let leaves: Vec<String> = (0..n).map(|i| format!("{i:064x}")).collect();
            let root = accumulate(leaves);
            prop_assert_eq!(root.len(), 64);
            prop_assert!(root.bytes().all(|b| b.is_ascii_hexdigit()));
        }

        #[test]
        fn proptest_root_is_order_sensitive(n in 2usize..32) {
            let leaves: Vec<String> = (0..n).map(|i| format!("{i:064x}")).collect();
            let mut reversed = leaves.clone();
            reversed.reverse();
            prop_assert_ne!(accumulate(leaves), accumulate(reversed));
        }
    }
}
