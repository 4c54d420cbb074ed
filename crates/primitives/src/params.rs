//! Protocol constants.

/// Number of entries in every pod.
pub const BATCH_SIZE: usize = 25;

/// [`BATCH_SIZE`] as a sequence-number stride.
pub const BATCH_SIZE_U64: u64 = BATCH_SIZE as u64;

/// Value written into every field of a padding entry and into the genesis DA record.
pub const PLACEHOLDER: &str = "0";
