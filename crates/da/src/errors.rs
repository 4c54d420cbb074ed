use podseq_db::DbError;
use podseq_primitives::StateCommitment;
use thiserror::Error;

/// A failed submission. The publisher retries every variant.
#[derive(Debug, Error)]
pub enum DaError {
    #[error("transport: {0}")]
    Transport(String),

    #[error("DA service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("undecodable DA response: {0}")]
    Decode(String),

    #[error("DA service not ready")]
    NotReady,
}

impl From<reqwest::Error> for DaError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("no DA record for batch {0}, the hash chain is broken")]
    MissingPrevious(u64),

    #[error("batch {batch_number} was published with state hash {stored}, now hashes to {computed}")]
    CommitmentMismatch {
        batch_number: u64,
        stored: StateCommitment,
        computed: StateCommitment,
    },

    #[error("gave up publishing batch {batch_number}: {source}")]
    Exhausted {
        batch_number: u64,
        #[source]
        source: DaError,
    },

    #[error("shutdown requested")]
    Shutdown,

    #[error("storage: {0}")]
    Db(#[from] DbError),
}
