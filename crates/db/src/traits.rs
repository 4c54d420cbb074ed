//! Storage interfaces used by ingestion and the batch pipeline.

use podseq_primitives::{
    Batch, BlockRecord, CommitReceipt, DaRecord, IngestCursor, ProgressCursor, Proof,
    PublicWitness, SettlementChainInfo, TransactionRecord,
};

use crate::DbResult;

/// Raw execution-layer data written by chain ingestion.
pub trait ChainDatabase: Send + Sync + 'static {
    /// Atomically stores a block, its transactions under consecutive sequence numbers starting at
    /// the current cursor, and `next_cursor`. Returns error if the block is out of order or the
    /// cursor does not match the transactions written.
    fn put_block_with_txs(
        &self,
        block: BlockRecord,
        txs: Vec<TransactionRecord>,
        next_cursor: IngestCursor,
    ) -> DbResult<()>;

    /// Returns the ingestion cursor, or the zero cursor on a fresh database.
    fn get_ingest_cursor(&self) -> DbResult<IngestCursor>;

    /// Returns `Some(..)` if a transaction was stored under `seq`.
    fn get_transaction(&self, seq: u64) -> DbResult<Option<TransactionRecord>>;

    fn get_block(&self, number: u64) -> DbResult<Option<BlockRecord>>;

    /// Number of transactions stored so far.
    fn transaction_count(&self) -> DbResult<u64>;
}

/// Per-batch artifacts and the pipeline's resume point.
pub trait PodDatabase: Send + Sync + 'static {
    /// Returns the progress cursor, or `None` before first startup.
    fn get_progress_cursor(&self) -> DbResult<Option<ProgressCursor>>;

    /// Seeds the zero cursor and the batch 0 DA record if absent, returning the cursor in effect.
    fn init_pipeline_state(&self) -> DbResult<ProgressCursor>;

    /// Atomically stores the snapshot of batch `batch_number` and advances the cursor.
    ///
    /// `next` must be exactly one pod past the stored cursor.
    fn complete_batch(&self, batch_number: u64, batch: Batch, next: ProgressCursor)
        -> DbResult<()>;

    fn get_batch(&self, batch_number: u64) -> DbResult<Option<Batch>>;

    /// Stores a DA record. Write-once.
    fn put_da_record(&self, record: DaRecord) -> DbResult<()>;

    fn get_da_record(&self, batch_number: u64) -> DbResult<Option<DaRecord>>;

    /// Stores a proof together with its public witness. Write-once.
    fn put_proof(&self, batch_number: u64, proof: Proof, witness: PublicWitness)
        -> DbResult<()>;

    /// Returns `Some(..)` if a proof and witness were stored for the batch.
    fn get_proof(&self, batch_number: u64) -> DbResult<Option<(Proof, PublicWitness)>>;

    /// Stores the commit receipt of a batch. Write-once.
    fn put_commit_receipt(&self, receipt: CommitReceipt) -> DbResult<()>;

    fn get_commit_receipt(&self, batch_number: u64) -> DbResult<Option<CommitReceipt>>;

    fn put_settlement_chain_info(&self, info: SettlementChainInfo) -> DbResult<()>;

    fn get_settlement_chain_info(&self) -> DbResult<Option<SettlementChainInfo>>;

    /// Checks the stored cursor against the DA chain and returns it.
    fn check_consistency(&self) -> DbResult<ProgressCursor>;
}
