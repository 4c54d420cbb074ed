//! Data types shared by every stage of the pod sequencer.

mod amount;
mod batch;
mod borsh_helpers;
mod commitment;
mod cursor;
mod da;
mod errors;
mod proof;
mod records;
mod settlement;
mod signature;

pub mod params;
#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use amount::Amount;
pub use batch::{Batch, BatchEntry};
pub use commitment::{leaf_hash, StateCommitment};
pub use cursor::{IngestCursor, ProgressCursor};
pub use da::DaRecord;
pub use errors::{AmountParseError, BatchError};
pub use proof::{Proof, PublicWitness, WitnessEntry};
pub use records::{BlockRecord, TransactionRecord};
pub use settlement::{CommitReceipt, SettlementChainInfo};
pub use signature::{Signature, SECP256K1_ORDER};
