use podseq_primitives::{
    Batch, CommitReceipt, DaRecord, ProgressCursor, Proof, PublicWitness, SettlementChainInfo,
};
use tracing::*;
use typed_sled::transaction::SledTransactional;

use crate::{
    abort,
    schemas::{
        BatchSchema, CommitReceiptSchema, DaRecordSchema, ProgressCursorSchema, ProofSchema,
        PublicWitnessSchema, SettlementChainInfoSchema, SINGLETON_KEY,
    },
    traits::PodDatabase,
    DbError, DbResult,
};

define_sled_database!(
    /// Sled store for batch artifacts and the progress cursor.
    pub struct PodDBSled {
        batch_tree: BatchSchema,
        da_tree: DaRecordSchema,
        proof_tree: ProofSchema,
        witness_tree: PublicWitnessSchema,
        receipt_tree: CommitReceiptSchema,
        cursor_tree: ProgressCursorSchema,
        chain_info_tree: SettlementChainInfoSchema,
    }
);

impl PodDatabase for PodDBSled {
    fn get_progress_cursor(&self) -> DbResult<Option<ProgressCursor>> {
        Ok(self.cursor_tree.get(&SINGLETON_KEY)?)
    }

    fn init_pipeline_state(&self) -> DbResult<ProgressCursor> {
        (&self.cursor_tree, &self.da_tree).transaction_with_retry(
            self.config.backoff.as_ref(),
            self.config.retry_count.into(),
            |(cursor_tree, da_tree)| {
                let cursor = match cursor_tree.get(&SINGLETON_KEY)? {
                    Some(cursor) => cursor,
                    None => {
                        let cursor = ProgressCursor::default();
                        cursor_tree.insert(&SINGLETON_KEY, &cursor)?;
                        cursor
                    }
                };
                if da_tree.get(&0)?.is_none() {
                    da_tree.insert(&0, &DaRecord::genesis())?;
                }
                Ok(cursor)
            },
        )
        .map_err(DbError::from)
    }

    fn complete_batch(
        &self,
        batch_number: u64,
        batch: Batch,
        next: ProgressCursor,
    ) -> DbResult<()> {
        let current = self.get_progress_cursor()?.unwrap_or_default();
        if current.next_batch_number() != batch_number || current.advance() != next {
            return Err(DbError::OooCursorAdvance {
                expected: format!("{:?}", current.advance()),
                got: format!("{next:?}"),
            });
        }

        (&self.batch_tree, &self.cursor_tree).transaction_with_retry(
            self.config.backoff.as_ref(),
            self.config.retry_count.into(),
            |(batch_tree, cursor_tree)| {
                // NOTE: re-checked here since another writer may have advanced in between.
                if cursor_tree.get(&SINGLETON_KEY)?.unwrap_or_default() != current {
                    return abort(DbError::OooCursorAdvance {
                        expected: format!("{:?}", current.advance()),
                        got: format!("{next:?}"),
                    })?;
                }
                if batch_tree.get(&batch_number)?.is_some() {
                    return abort(DbError::EntryAlreadyExists(
                        BatchSchema::tree_name(),
                        batch_number,
                    ))?;
                }
                batch_tree.insert(&batch_number, &batch)?;
                cursor_tree.insert(&SINGLETON_KEY, &next)?;
                Ok(())
            },
        )?;

        Ok(())
    }

    fn get_batch(&self, batch_number: u64) -> DbResult<Option<Batch>> {
        Ok(self.batch_tree.get(&batch_number)?)
    }

    fn put_da_record(&self, record: DaRecord) -> DbResult<()> {
        let batch_number = record.batch_number;
        if self.da_tree.get(&batch_number)?.is_some() {
            return Err(DbError::EntryAlreadyExists(
                DaRecordSchema::tree_name(),
                batch_number,
            ));
        }
        self.da_tree.compare_and_swap(batch_number, None, Some(record))?;
        Ok(())
    }

    fn get_da_record(&self, batch_number: u64) -> DbResult<Option<DaRecord>> {
        Ok(self.da_tree.get(&batch_number)?)
    }

    fn put_proof(
        &self,
        batch_number: u64,
        proof: Proof,
        witness: PublicWitness,
    ) -> DbResult<()> {
        (&self.proof_tree, &self.witness_tree).transaction_with_retry(
            self.config.backoff.as_ref(),
            self.config.retry_count.into(),
            |(proof_tree, witness_tree)| {
                if proof_tree.get(&batch_number)?.is_some() {
                    return abort(DbError::EntryAlreadyExists(
                        ProofSchema::tree_name(),
                        batch_number,
                    ))?;
                }
                proof_tree.insert(&batch_number, &proof)?;
                witness_tree.insert(&batch_number, &witness)?;
                Ok(())
            },
        )?;
        Ok(())
    }

    fn get_proof(&self, batch_number: u64) -> DbResult<Option<(Proof, PublicWitness)>> {
        let Some(proof) = self.proof_tree.get(&batch_number)? else {
            return Ok(None);
        };
        let witness = self.witness_tree.get(&batch_number)?.ok_or_else(|| {
            DbError::Inconsistent(format!("proof {batch_number} stored without its witness"))
        })?;
        Ok(Some((proof, witness)))
    }

    fn put_commit_receipt(&self, receipt: CommitReceipt) -> DbResult<()> {
        let batch_number = receipt.batch_number;
        if self.receipt_tree.get(&batch_number)?.is_some() {
            return Err(DbError::EntryAlreadyExists(
                CommitReceiptSchema::tree_name(),
                batch_number,
            ));
        }
        self.receipt_tree
            .compare_and_swap(batch_number, None, Some(receipt))?;
        Ok(())
    }

    fn get_commit_receipt(&self, batch_number: u64) -> DbResult<Option<CommitReceipt>> {
        Ok(self.receipt_tree.get(&batch_number)?)
    }

    fn put_settlement_chain_info(&self, info: SettlementChainInfo) -> DbResult<()> {
        self.chain_info_tree.insert(&SINGLETON_KEY, &info)?;
        Ok(())
    }

    fn get_settlement_chain_info(&self) -> DbResult<Option<SettlementChainInfo>> {
        Ok(self.chain_info_tree.get(&SINGLETON_KEY)?)
    }

    fn check_consistency(&self) -> DbResult<ProgressCursor> {
        let cursor = self
            .get_progress_cursor()?
            .ok_or_else(|| DbError::Inconsistent("progress cursor not initialized".into()))?;

        if !cursor.is_consistent() {
            return Err(DbError::Inconsistent(format!(
                "cursor start {} does not match {} completed batches",
                cursor.batch_start_index, cursor.batch_count
            )));
        }

        let count = cursor.batch_count;
        if self.da_tree.get(&count)?.is_none() {
            return Err(DbError::MissingDaRecord(count));
        }
        if count > 0 && self.batch_tree.get(&count)?.is_none() {
            return Err(DbError::Inconsistent(format!(
                "cursor reports {count} batches but snapshot {count} is missing"
            )));
        }

        // At most one published but unfinished batch may be ahead of the cursor.
        if let Some((last, _)) = self.da_tree.last()? {
            if last > count + 1 {
                return Err(DbError::Inconsistent(format!(
                    "DA record {last} is ahead of cursor at {count} completed batches"
                )));
            }
            if last == count + 1 {
                info!(batch_number = last, "resuming batch published before shutdown");
            }
        }

        debug!(?cursor, "pipeline state consistent");
        Ok(cursor)
    }
}
