use thiserror::Error;

use crate::Amount;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid decimal amount '{0}'")]
pub struct AmountParseError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// A batch was built from a number of entries other than the fixed pod size.
    #[error("batch must hold exactly {expected} entries, got {actual}")]
    WrongSize { expected: usize, actual: usize },

    /// More real transactions than fit into a pod were handed to the padder.
    #[error("cannot pad {0} entries into a single batch")]
    Overfull(usize),

    /// A real transfer moves more than its sender held before the transaction.
    #[error("entry {index} ({tx_hash}) transfers {amount} with sender balance {balance}")]
    AmountExceedsBalance {
        index: usize,
        tx_hash: String,
        amount: Amount,
        balance: Amount,
    },
}
