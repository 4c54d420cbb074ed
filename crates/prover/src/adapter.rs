use std::sync::Arc;

use podseq_db::PodDatabase;
use podseq_primitives::{Batch, Proof, PublicWitness, StateCommitment};
use tracing::*;

use crate::{KeyStore, Prover, ProverError};

/// Everything downstream stages need from a proven batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenBatch {
    pub batch_number: u64,
    pub commitment: StateCommitment,
    pub witness: PublicWitness,
    pub proof: Proof,
}

/// Runs the prover for a batch and persists its output before handing it on.
#[derive(Debug)]
pub struct ProverAdapter<P, D> {
    prover: Arc<P>,
    keys: KeyStore,
    db: Arc<D>,
}

impl<P, D> ProverAdapter<P, D>
where
    P: Prover,
    D: PodDatabase,
{
    pub fn new(prover: Arc<P>, keys: KeyStore, db: Arc<D>) -> Self {
        Self { prover, keys, db }
    }

    /// Proves `batch` as number `batch_number`, reusing a proof persisted by an earlier run.
    pub fn prove_batch(
        &self,
        batch_number: u64,
        batch: &Batch,
    ) -> Result<ProvenBatch, ProverError> {
        let commitment = StateCommitment::compute(batch);

        if let Some((proof, witness)) = self.db.get_proof(batch_number)? {
            if witness.state_commitment != commitment {
                return Err(ProverError::CommitmentMismatch {
                    batch_number,
                    stored: witness.state_commitment.to_string(),
                    computed: commitment.to_string(),
                });
            }
            info!(batch_number, %commitment, "reusing stored proof");
            return Ok(ProvenBatch {
                batch_number,
                commitment,
                witness,
                proof,
            });
        }

        let pk = self.keys.load_proving_key()?;
        let (witness, proof) = self.prover.prove(&pk, batch_number, batch)?;
        if witness.state_commitment != commitment {
            return Err(ProverError::CommitmentMismatch {
                batch_number,
                stored: witness.state_commitment.to_string(),
                computed: commitment.to_string(),
            });
        }

        self.db.put_proof(batch_number, proof.clone(), witness.clone())?;
        info!(batch_number, %commitment, entries = witness.entries.len(), "proved batch");

        Ok(ProvenBatch {
            batch_number,
            commitment,
            witness,
            proof,
        })
    }
}

#[cfg(test)]
mod tests {
    use podseq_db::test_utils::get_test_databases;
    use podseq_primitives::test_utils::entry;

    use super::*;
    use crate::{MockProver, NativeProver};

    fn sample_batch() -> Batch {
        Batch::pad(vec![entry(0, 5, 50, 0), entry(1, 7, 20, 3)]).unwrap()
    }

    #[test]
    fn test_proves_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let keys = KeyStore::new(dir.path());
        let vk = keys.ensure_keys().unwrap();
        let dbs = get_test_databases();
        let adapter = ProverAdapter::new(Arc::new(NativeProver::new()), keys, dbs.pod.clone());

        let proven = adapter.prove_batch(1, &sample_batch()).unwrap();
        assert_eq!(proven.commitment, StateCommitment::compute(&sample_batch()));

        let (proof, witness) = dbs.pod.get_proof(1).unwrap().unwrap();
        assert_eq!(proof, proven.proof);
        assert_eq!(witness, proven.witness);
        assert!(NativeProver::new().verify(&vk, &witness, &proof).unwrap());
    }

    #[test]
    fn test_reuses_stored_proof_without_proving() {
        let dir = tempfile::tempdir().unwrap();
        let keys = KeyStore::new(dir.path());
        keys.ensure_keys().unwrap();
        let dbs = get_test_databases();

        let first = ProverAdapter::new(Arc::new(NativeProver::new()), keys.clone(), dbs.pod.clone())
            .prove_batch(1, &sample_batch())
            .unwrap();

        let mut prover = MockProver::new();
        prover.expect_prove().times(0);
        let resumed = ProverAdapter::new(Arc::new(prover), keys, dbs.pod.clone())
            .prove_batch(1, &sample_batch())
            .unwrap();
        assert_eq!(resumed, first);
    }

    #[test]
    fn test_missing_proving_key_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let dbs = get_test_databases();
        let mut prover = MockProver::new();
        prover.expect_prove().times(0);
        let keys = KeyStore::new(dir.path());
        let adapter = ProverAdapter::new(Arc::new(prover), keys, dbs.pod.clone());

        assert!(matches!(
            adapter.prove_batch(1, &sample_batch()),
            Err(ProverError::MissingProvingKey(_))
        ));
        assert_eq!(dbs.pod.get_proof(1).unwrap(), None);
    }

    #[test]
    fn test_stored_proof_for_other_batch_content_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let keys = KeyStore::new(dir.path());
        keys.ensure_keys().unwrap();
        let dbs = get_test_databases();
        let adapter = ProverAdapter::new(Arc::new(NativeProver::new()), keys, dbs.pod.clone());
        adapter.prove_batch(1, &sample_batch()).unwrap();

        let other = Batch::pad(vec![entry(9, 1, 2, 3)]).unwrap();
        assert!(matches!(
            adapter.prove_batch(1, &other),
            Err(ProverError::CommitmentMismatch { batch_number: 1, .. })
        ));
    }
}
