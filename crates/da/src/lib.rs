//! Data-availability publishing.

mod client;
mod errors;
mod publisher;

#[cfg(any(test, feature = "test-utils"))]
pub use client::MockDaClient;
pub use client::{
    DaClient, DaMetadata, DaPayload, DaResponse, DaSubmitOutcome, HttpDaClient,
    DEFAULT_CLIENT_NAME, DEFAULT_DA_URL,
};
pub use errors::{DaError, PublishError};
pub use publisher::DaPublisher;
