//! Native prover backend.
//!
//! Evaluates the transfer constraints directly and emits a keyed attestation instead of a
//! succinct proof. Verification recomputes the attestation, so it is only meaningful to holders
//! of the verifying key.

use podseq_primitives::{Batch, BatchEntry, Proof, PublicWitness, StateCommitment, WitnessEntry};
use sha2::{Digest, Sha256};

use crate::{ProverError, ProvingKey, VerifyingKey};

/// Proof system capability.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait Prover: Send + Sync {
    /// Proves that every real entry of `batch` is an authorized, balance-consistent transfer.
    fn prove(
        &self,
        pk: &ProvingKey,
        batch_number: u64,
        batch: &Batch,
    ) -> Result<(PublicWitness, Proof), ProverError>;

    fn verify(
        &self,
        vk: &VerifyingKey,
        witness: &PublicWitness,
        proof: &Proof,
    ) -> Result<bool, ProverError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeProver;

impl NativeProver {
    pub fn new() -> Self {
        Self
    }
}

fn constraint(index: usize, tx_hash: &str, reason: &'static str) -> ProverError {
    ProverError::Constraint {
        index,
        tx_hash: tx_hash.to_owned(),
        reason,
    }
}

/// Applies the transfer relation to one real entry.
fn witness_entry(index: usize, entry: &BatchEntry) -> Result<WitnessEntry, ProverError> {
    if !entry.signature.has_valid_scalars() {
        return Err(constraint(index, &entry.tx_hash, "missing authorization"));
    }
    let sender_balance_after = entry
        .sender_balance
        .checked_sub(entry.amount)
        .ok_or_else(|| constraint(index, &entry.tx_hash, "amount exceeds sender balance"))?;
    let receiver_balance_after = entry
        .receiver_balance
        .checked_add(entry.amount)
        .ok_or_else(|| constraint(index, &entry.tx_hash, "receiver balance overflow"))?;

    Ok(WitnessEntry {
        sender: entry.sender.clone(),
        receiver: entry.receiver.clone(),
        amount: entry.amount,
        tx_hash: entry.tx_hash.clone(),
        sender_balance: entry.sender_balance,
        receiver_balance: entry.receiver_balance,
        sender_balance_after,
        receiver_balance_after,
        message: entry.message.clone(),
        signature: entry.signature,
    })
}

fn entry_holds(entry: &WitnessEntry) -> bool {
    entry.signature.has_valid_scalars()
        && entry.sender_balance.checked_sub(entry.amount) == Some(entry.sender_balance_after)
        && entry.receiver_balance.checked_add(entry.amount) == Some(entry.receiver_balance_after)
}

fn attestation(vk: &VerifyingKey, witness: &PublicWitness) -> Result<Vec<u8>, ProverError> {
    let encoded = borsh::to_vec(witness).map_err(|e| ProverError::Codec(e.to_string()))?;
    let digest = Sha256::digest(&encoded);

    let mut hasher = Sha256::new();
    hasher.update(vk.as_bytes());
    hasher.update(digest);
    Ok(hasher.finalize().to_vec())
}

impl Prover for NativeProver {
    fn prove(
        &self,
        pk: &ProvingKey,
        batch_number: u64,
        batch: &Batch,
    ) -> Result<(PublicWitness, Proof), ProverError> {
        let entries = batch
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_placeholder())
            .map(|(index, entry)| witness_entry(index, entry))
            .collect::<Result<Vec<_>, _>>()?;

        let witness = PublicWitness {
            batch_number,
            state_commitment: StateCommitment::compute(batch),
            entries,
        };
        let proof = Proof::new(attestation(&pk.verifying_key(), &witness)?);
        Ok((witness, proof))
    }

    fn verify(
        &self,
        vk: &VerifyingKey,
        witness: &PublicWitness,
        proof: &Proof,
    ) -> Result<bool, ProverError> {
        if !witness.entries.iter().all(entry_holds) {
            return Ok(false);
        }
        Ok(attestation(vk, witness)? == proof.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use podseq_primitives::{
        test_utils::{addr, entry, transfer},
        Amount, SECP256K1_ORDER,
    };

    use super::*;

    fn batch(entries: Vec<BatchEntry>) -> Batch {
        Batch::pad(entries).unwrap()
    }

    #[test]
    fn test_prove_then_verify() {
        let pk = ProvingKey::new(vec![1; 32]);
        let prover = NativeProver::new();
        let b = batch(vec![entry(0, 10, 50, 5), entry(1, 50, 50, 0)]);

        let (witness, proof) = prover.prove(&pk, 3, &b).unwrap();
        assert_eq!(witness.batch_number, 3);
        assert_eq!(witness.entries.len(), 2);
        assert_eq!(witness.state_commitment, StateCommitment::compute(&b));
        assert_eq!(witness.entries[0].sender_balance_after, Amount::from(40u64));
        assert_eq!(witness.entries[0].receiver_balance_after, Amount::from(15u64));
        assert_eq!(witness.entries[1].sender_balance_after, Amount::ZERO);
        assert_eq!(witness.entries[0].signature, b.entries()[0].signature);

        assert!(prover.verify(&pk.verifying_key(), &witness, &proof).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_key_and_tampering() {
        let pk = ProvingKey::new(vec![1; 32]);
        let prover = NativeProver::new();
        let (mut witness, proof) = prover
            .prove(&pk, 1, &batch(vec![entry(0, 10, 50, 5)]))
            .unwrap();

        let other = ProvingKey::new(vec![2; 32]).verifying_key();
        assert!(!prover.verify(&other, &witness, &proof).unwrap());

        witness.entries[0].receiver_balance_after = Amount::from(1_000u64);
        assert!(!prover
            .verify(&pk.verifying_key(), &witness, &proof)
            .unwrap());
    }

    #[test]
    fn test_overspend_is_a_constraint_violation() {
        let pk = ProvingKey::new(vec![1; 32]);
        let res = NativeProver::new().prove(&pk, 1, &batch(vec![entry(0, 100, 50, 0)]));
        assert!(matches!(res, Err(ProverError::Constraint { index: 0, .. })));
    }

    #[test]
    fn test_unsigned_transfer_is_a_constraint_violation() {
        let mut tx = transfer(0, 1, addr(0x11), addr(0x22), 10);
        tx.r = Default::default();
        tx.s = Default::default();
        let unsigned = BatchEntry::from_transaction(&tx, Amount::from(50u64), Amount::ZERO, 0);

        let pk = ProvingKey::new(vec![1; 32]);
        let res = NativeProver::new().prove(&pk, 1, &batch(vec![entry(1, 1, 5, 0), unsigned]));
        match res {
            Err(ProverError::Constraint { index, reason, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(reason, "missing authorization");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_verify_rejects_out_of_range_signature() {
        let pk = ProvingKey::new(vec![1; 32]);
        let prover = NativeProver::new();
        let (mut witness, _) = prover
            .prove(&pk, 1, &batch(vec![entry(0, 10, 50, 5)]))
            .unwrap();

        // Re-attest so only the signature check can fail.
        witness.entries[0].signature.s = SECP256K1_ORDER;
        let proof = Proof::new(attestation(&pk.verifying_key(), &witness).unwrap());
        assert!(!prover.verify(&pk.verifying_key(), &witness, &proof).unwrap());
    }

    #[test]
    fn test_placeholders_carry_no_witness() {
        let pk = ProvingKey::new(vec![1; 32]);
        let (witness, _) = NativeProver::new().prove(&pk, 1, &batch(vec![])).unwrap();
        assert!(witness.entries.is_empty());
    }
}
