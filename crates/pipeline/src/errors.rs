use podseq_chain::ClientError;
use podseq_da::PublishError;
use podseq_db::DbError;
use podseq_primitives::{BatchError, ProgressCursor};
use podseq_prover::ProverError;
use podseq_settlement::FlowError;
use thiserror::Error;

/// Why the batch loop stopped. Everything except [`PipelineError::Shutdown`] is fatal.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("shutdown requested")]
    Shutdown,

    #[error("progress cursor missing, pipeline state was never initialized")]
    MissingCursor,

    #[error("progress cursor {0:?} does not start on a pod boundary")]
    InconsistentCursor(ProgressCursor),

    #[error("chain data for tx {seq}: {source}")]
    ChainData {
        seq: u64,
        #[source]
        source: ClientError,
    },

    #[error("batch {batch_number} failed integrity check: {source}")]
    Integrity {
        batch_number: u64,
        #[source]
        source: BatchError,
    },

    #[error("prover: {0}")]
    Prover(#[from] ProverError),

    #[error("da: {0}")]
    Publish(PublishError),

    #[error("settlement: {0}")]
    Settlement(FlowError),

    #[error("settlement rejected the proof of batch {0}")]
    VerifyRejected(u64),

    #[error("storage: {0}")]
    Db(#[from] DbError),
}

impl From<PublishError> for PipelineError {
    fn from(value: PublishError) -> Self {
        match value {
            PublishError::Shutdown => Self::Shutdown,
            other => Self::Publish(other),
        }
    }
}

impl From<FlowError> for PipelineError {
    fn from(value: FlowError) -> Self {
        match value {
            FlowError::Shutdown => Self::Shutdown,
            other => Self::Settlement(other),
        }
    }
}
