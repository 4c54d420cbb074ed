use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::{params::PLACEHOLDER, StateCommitment};

/// Receipt of a pod published to the DA network, and the link in the state-hash chain.
///
/// `previous_state_hash` of record N equals `current_state_hash` of record N-1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaRecord {
    pub da_key: String,
    pub client_name: String,
    pub batch_number: u64,
    pub previous_state_hash: StateCommitment,
    pub current_state_hash: StateCommitment,
}

impl DaRecord {
    /// Sentinel record for batch 0 that seeds the chain.
    pub fn genesis() -> Self {
        Self {
            da_key: PLACEHOLDER.to_owned(),
            client_name: PLACEHOLDER.to_owned(),
            batch_number: 0,
            previous_state_hash: StateCommitment::genesis(),
            current_state_hash: StateCommitment::genesis(),
        }
    }

    /// Builds the record for the pod following `prev`.
    pub fn link(
        prev: &DaRecord,
        da_key: String,
        client_name: String,
        current_state_hash: StateCommitment,
    ) -> Self {
        Self {
            da_key,
            client_name,
            batch_number: prev.batch_number + 1,
            previous_state_hash: prev.current_state_hash.clone(),
            current_state_hash,
        }
    }

    pub fn extends(&self, prev: &DaRecord) -> bool {
        self.batch_number == prev.batch_number + 1
            && self.previous_state_hash == prev.current_state_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_chains_hashes() {
        let genesis = DaRecord::genesis();
        let first = DaRecord::link(
            &genesis,
            "key-1".into(),
            "celestia".into(),
            StateCommitment::from_hex("aa"),
        );
        let second = DaRecord::link(
            &first,
            "key-2".into(),
            "celestia".into(),
            StateCommitment::from_hex("bb"),
        );

        assert_eq!(first.previous_state_hash.as_str(), "0");
        assert_eq!(second.previous_state_hash.as_str(), "aa");
        assert_eq!(second.batch_number, 2);
        assert!(first.extends(&genesis));
        assert!(second.extends(&first));
        assert!(!second.extends(&genesis));
    }
}
