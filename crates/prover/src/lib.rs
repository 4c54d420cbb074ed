//! Proof generation for pods and the key material it needs.

mod adapter;
mod errors;
mod keys;
mod native;

pub use adapter::{ProvenBatch, ProverAdapter};
pub use errors::ProverError;
pub use keys::{KeyStore, ProvingKey, VerifyingKey};
#[cfg(any(test, feature = "test-utils"))]
pub use native::MockProver;
pub use native::{NativeProver, Prover};
