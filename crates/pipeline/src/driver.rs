//! The batch loop: assemble, prove, publish, commit, verify, advance.

use std::sync::Arc;

use podseq_chain::ExecutionClient;
use podseq_common::ShutdownSignal;
use podseq_da::{DaClient, DaPublisher};
use podseq_db::{ChainDatabase, PodDatabase};
use podseq_primitives::ProgressCursor;
use podseq_prover::{Prover, ProverAdapter};
use podseq_settlement::{Settlement, SettlementClient};
use tracing::*;

use crate::{BatchAssembler, PipelineError};

/// Runs one pod at a time through every stage and only then moves the cursor.
#[derive(Debug)]
pub struct PipelineDriver<E, P, A, C, CD, PD> {
    assembler: BatchAssembler<E, CD>,
    prover: ProverAdapter<P, PD>,
    publisher: DaPublisher<A, PD>,
    settlement: Settlement<C, PD>,
    db: Arc<PD>,
}

impl<E, P, A, C, CD, PD> PipelineDriver<E, P, A, C, CD, PD>
where
    E: ExecutionClient,
    P: Prover,
    A: DaClient,
    C: SettlementClient,
    CD: ChainDatabase,
    PD: PodDatabase,
{
    pub fn new(
        assembler: BatchAssembler<E, CD>,
        prover: ProverAdapter<P, PD>,
        publisher: DaPublisher<A, PD>,
        settlement: Settlement<C, PD>,
        db: Arc<PD>,
    ) -> Self {
        Self {
            assembler,
            prover,
            publisher,
            settlement,
            db,
        }
    }

    /// Loops until shutdown or a fatal error, resuming from the persisted cursor.
    pub async fn run<S>(&self, shutdown: &S) -> Result<(), PipelineError>
    where
        S: ShutdownSignal + ?Sized,
    {
        let mut cursor = self
            .db
            .get_progress_cursor()?
            .ok_or(PipelineError::MissingCursor)?;
        info!(
            batch_count = cursor.batch_count,
            batch_start_index = cursor.batch_start_index,
            "starting batch pipeline"
        );

        loop {
            if shutdown.should_shutdown() {
                info!(batch_count = cursor.batch_count, "batch pipeline stopping");
                return Ok(());
            }

            match self.run_cycle(&cursor, shutdown).await {
                Ok(next) => cursor = next,
                Err(PipelineError::Shutdown) => {
                    info!(
                        batch_number = cursor.next_batch_number(),
                        "batch pipeline interrupted by shutdown"
                    );
                    return Ok(());
                }
                Err(err) => {
                    error!(batch_number = cursor.next_batch_number(), %err, "batch pipeline halted");
                    return Err(err);
                }
            }
        }
    }

    /// Takes the pod after `cursor` through every stage and returns the advanced cursor.
    pub async fn run_cycle<S>(
        &self,
        cursor: &ProgressCursor,
        shutdown: &S,
    ) -> Result<ProgressCursor, PipelineError>
    where
        S: ShutdownSignal + ?Sized,
    {
        let batch_number = cursor.next_batch_number();

        let batch = self.assembler.assemble(cursor, shutdown).await?;
        let proven = self.prover.prove_batch(batch_number, &batch)?;

        let da_record = self
            .publisher
            .publish(
                batch_number,
                batch.tx_hashes(),
                &proven.commitment,
                &proven.proof,
                shutdown,
            )
            .await?;

        let receipt = self
            .settlement
            .commit(batch_number, &da_record, &proven.witness, shutdown)
            .await?;
        let verified = self
            .settlement
            .verify(&receipt, &da_record, &proven.proof, shutdown)
            .await?;
        if !verified {
            return Err(PipelineError::VerifyRejected(batch_number));
        }

        let next = cursor.advance();
        self.db.complete_batch(batch_number, batch, next)?;
        info!(
            batch_number,
            commitment = %proven.commitment,
            da_key = %da_record.da_key,
            batch_start_index = next.batch_start_index,
            "batch complete"
        );
        Ok(next)
    }
}
