//! Settlement layer client: station registration and the commit/verify phases of each pod.

mod client;
mod errors;
mod register;
mod settlement;

#[cfg(any(test, feature = "test-utils"))]
pub use client::MockSettlementClient;
pub use client::{
    CommitRequest, HttpSettlementClient, RegisterOutcome, RegisterRequest, SettlementClient,
    SettlementResponse, VerifyRequest, DEFAULT_SETTLEMENT_URL,
};
pub use errors::{FlowError, SettlementError};
pub use register::{ensure_registered, StationParams};
pub use settlement::Settlement;
