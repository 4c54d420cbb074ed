use podseq_db::DbError;
use thiserror::Error;

/// A failed settlement call. Commit, verify and registration retry every variant.
#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("transport: {0}")]
    Transport(String),

    #[error("settlement answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("undecodable settlement response: {0}")]
    Decode(String),

    /// The call went through but the settlement layer reported `status: false`.
    #[error("rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for SettlementError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("station is not registered with the settlement layer")]
    MissingChainInfo,

    #[error("settlement reports the station exists but no station id is known locally")]
    UnknownStationId,

    #[error("no commit receipt for batch {0}")]
    NotCommitted(u64),

    #[error("gave up on {phase} for batch {batch_number}: {source}")]
    Exhausted {
        phase: &'static str,
        batch_number: u64,
        #[source]
        source: SettlementError,
    },

    #[error("shutdown requested")]
    Shutdown,

    #[error("encoding {0}")]
    Encode(String),

    #[error("storage: {0}")]
    Db(#[from] DbError),
}
