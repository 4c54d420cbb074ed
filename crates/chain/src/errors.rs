use jsonrpsee::core::ClientError as RpcError;
use thiserror::Error;

/// Failure talking to the execution layer.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("malformed {0}: {1}")]
    Malformed(&'static str, String),
}

impl ClientError {
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<RpcError> for ClientError {
    fn from(value: RpcError) -> Self {
        match value {
            RpcError::Transport(err) => Self::Network(err.to_string()),
            RpcError::RequestTimeout => Self::Network("request timed out".to_owned()),
            other => Self::Rpc(other.to_string()),
        }
    }
}
