use podseq_db::ChainDatabase;
use podseq_primitives::{
    test_utils::{addr, block, transfer},
    IngestCursor,
};

/// Stores one single-transfer block per value, continuing from the ingest cursor.
pub(crate) fn ingest_transfers<D: ChainDatabase>(db: &D, values: &[u64]) {
    for value in values {
        let cursor = db.get_ingest_cursor().unwrap();
        let number = cursor.next_block;
        let seq = cursor.next_tx_seq;
        let tx = transfer(seq, number, addr(0x11), addr(0x22), *value);
        let next = IngestCursor {
            next_block: number + 1,
            next_tx_seq: seq + 1,
        };
        db.put_block_with_txs(block(number, 1), vec![tx], next)
            .unwrap();
    }
}
