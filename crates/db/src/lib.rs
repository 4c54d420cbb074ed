//! Sled-backed persistence for ingested chain data and batch pipeline state.

use std::error::Error;

#[macro_use]
mod macros;

mod chain;
mod config;
mod errors;
mod init;
mod pod;
mod schemas;
mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use chain::ChainDBSled;
pub use config::SledDbConfig;
pub use errors::{DbError, DbResult};
pub use init::{open_sled_database, Databases, DB_NAME};
pub use pod::PodDBSled;
pub use traits::{ChainDatabase, PodDatabase};
use typed_sled::error::Error as TSledError;

fn abort<T>(reason: impl Error + Send + Sync + 'static) -> Result<T, TSledError> {
    Err(TSledError::abort(reason))
}
