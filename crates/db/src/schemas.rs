//! Tree layout. Singleton trees keep their only value under [`SINGLETON_KEY`].

use podseq_primitives::{
    Batch, BlockRecord, CommitReceipt, DaRecord, IngestCursor, ProgressCursor, Proof,
    PublicWitness, SettlementChainInfo, TransactionRecord,
};

pub(crate) const SINGLETON_KEY: u64 = 0;

define_table_with_integer_key!(
    /// Ingested transactions by sequence number.
    (TransactionSchema) u64 => TransactionRecord
);

define_table_with_integer_key!(
    /// Ingested block headers by height.
    (BlockSchema) u64 => BlockRecord
);

define_table_with_integer_key!(
    /// Where ingestion resumes.
    (IngestCursorSchema) u64 => IngestCursor
);

define_table_with_integer_key!(
    /// Snapshot of each completed pod.
    (BatchSchema) u64 => Batch
);

define_table_with_integer_key!(
    /// DA receipts and the state-hash chain, seeded with batch 0.
    (DaRecordSchema) u64 => DaRecord
);

define_table_with_integer_key!(
    /// Proofs by batch number.
    (ProofSchema) u64 => Proof
);

define_table_with_integer_key!(
    /// Public witness per batch number.
    (PublicWitnessSchema) u64 => PublicWitness
);

define_table_with_integer_key!(
    /// Settlement commit receipts by batch number.
    (CommitReceiptSchema) u64 => CommitReceipt
);

define_table_with_integer_key!(
    /// Where the batch pipeline resumes.
    (ProgressCursorSchema) u64 => ProgressCursor
);

define_table_with_integer_key!(
    /// Identity from settlement registration.
    (SettlementChainInfoSchema) u64 => SettlementChainInfo
);
