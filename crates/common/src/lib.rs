//! Ambient infrastructure shared by the node's crates: logging bootstrap, fixed-interval retry and
//! shutdown observation.

pub mod logging;
pub mod retry;
pub mod shutdown;

pub use retry::{retry_fixed, sleep_unless_shutdown, RetryConfig, RetryError};
pub use shutdown::{ShutdownFlag, ShutdownSignal};
