use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DbError {
    #[error("entry {1} already exists in {0}")]
    EntryAlreadyExists(&'static str, u64),

    #[error("tried to insert into {0} out-of-order index {1}")]
    OooInsert(&'static str, u64),

    #[error("progress cursor must advance from {expected:?} but got {got:?}")]
    OooCursorAdvance { expected: String, got: String },

    #[error("missing DA record for batch {0}")]
    MissingDaRecord(u64),

    #[error("inconsistent pipeline state: {0}")]
    Inconsistent(String),

    #[error("codec: {0}")]
    CodecError(String),

    #[error("{0}")]
    Other(String),
}

impl From<typed_sled::error::Error> for DbError {
    fn from(value: typed_sled::error::Error) -> Self {
        Self::Other(format!("sled error: {value:?}"))
    }
}

impl From<anyhow::Error> for DbError {
    fn from(value: anyhow::Error) -> Self {
        Self::Other(value.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
