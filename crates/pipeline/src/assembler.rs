//! Builds the next pod from stored transactions and the chain state before each of them.

use std::{sync::Arc, time::Duration};

use podseq_chain::{ClientError, ExecutionClient};
use podseq_common::{sleep_unless_shutdown, ShutdownSignal};
use podseq_db::ChainDatabase;
use podseq_primitives::{params::BATCH_SIZE, Batch, BatchEntry, ProgressCursor, TransactionRecord};
use tracing::*;

use crate::PipelineError;

#[derive(Debug)]
pub struct BatchAssembler<E, D> {
    client: Arc<E>,
    db: Arc<D>,
    record_wait: Duration,
}

impl<E, D> BatchAssembler<E, D>
where
    E: ExecutionClient,
    D: ChainDatabase,
{
    pub fn new(client: Arc<E>, db: Arc<D>, record_wait: Duration) -> Self {
        Self {
            client,
            db,
            record_wait,
        }
    }

    /// Assembles the pod following `cursor`, covering `[batch_start_index, window_end)`.
    ///
    /// Blocks on each sequence number until ingestion has stored it. Any failure to read chain
    /// state for a stored transaction is fatal, as is a transfer exceeding its sender's balance.
    /// A cursor whose start index does not sit on a pod boundary is rejected up front.
    pub async fn assemble<S>(
        &self,
        cursor: &ProgressCursor,
        shutdown: &S,
    ) -> Result<Batch, PipelineError>
    where
        S: ShutdownSignal + ?Sized,
    {
        if !cursor.is_consistent() {
            return Err(PipelineError::InconsistentCursor(*cursor));
        }

        let batch_number = cursor.next_batch_number();
        let window = cursor.batch_start_index..cursor.window_end();
        debug!(batch_number, start = window.start, end = window.end, "assembling batch");

        let mut entries = Vec::with_capacity(BATCH_SIZE);
        for seq in window {
            let tx = self.wait_for_transaction(seq, shutdown).await?;
            let entry = self
                .build_entry(&tx)
                .await
                .map_err(|source| PipelineError::ChainData { seq, source })?;
            entries.push(entry);
        }

        let batch = Batch::pad(entries).map_err(|source| PipelineError::Integrity {
            batch_number,
            source,
        })?;
        batch
            .check_balances()
            .map_err(|source| PipelineError::Integrity {
                batch_number,
                source,
            })?;

        info!(batch_number, real = batch.real_entries().count(), "assembled batch");
        Ok(batch)
    }

    async fn wait_for_transaction<S>(
        &self,
        seq: u64,
        shutdown: &S,
    ) -> Result<TransactionRecord, PipelineError>
    where
        S: ShutdownSignal + ?Sized,
    {
        loop {
            if let Some(tx) = self.db.get_transaction(seq)? {
                return Ok(tx);
            }
            trace!(seq, "transaction not ingested yet");
            if !sleep_unless_shutdown(self.record_wait, shutdown).await {
                return Err(PipelineError::Shutdown);
            }
        }
    }

    async fn build_entry(&self, tx: &TransactionRecord) -> Result<BatchEntry, ClientError> {
        let state_block = tx.pre_state_block();
        let sender_balance = self.client.balance(tx.from, state_block).await?;
        let receiver_balance = self.client.balance(tx.to, state_block).await?;
        let account_nonce = self.client.account_nonce(tx.hash, tx.block_number).await?;
        Ok(BatchEntry::from_transaction(
            tx,
            sender_balance,
            receiver_balance,
            account_nonce,
        ))
    }
}
