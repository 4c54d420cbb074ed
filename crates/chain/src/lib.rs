//! Execution-layer access and the chain ingestion loop.

mod client;
mod errors;
mod ingest;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub use client::MockExecutionClient;
pub use client::{ExecutionClient, RpcExecutionClient, DEFAULT_RPC_URL};
pub use errors::ClientError;
pub use ingest::{ChainIngestor, IngestConfig, IngestError, IngestStep};
