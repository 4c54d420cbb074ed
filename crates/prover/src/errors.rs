use std::{io, path::PathBuf};

use podseq_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProverError {
    #[error("proving key not found at {0}")]
    MissingProvingKey(PathBuf),

    #[error("verifying key not found at {0}")]
    MissingVerifyingKey(PathBuf),

    #[error("malformed key at {0}")]
    MalformedKey(PathBuf),

    #[error("key io: {0}")]
    Io(#[from] io::Error),

    #[error("entry {index} ({tx_hash}) violates transfer constraints: {reason}")]
    Constraint {
        index: usize,
        tx_hash: String,
        reason: &'static str,
    },

    #[error("stored proof for batch {batch_number} commits to {stored}, batch hashes to {computed}")]
    CommitmentMismatch {
        batch_number: u64,
        stored: String,
        computed: String,
    },

    #[error("codec: {0}")]
    Codec(String),

    #[error("storage: {0}")]
    Db(#[from] DbError),
}
