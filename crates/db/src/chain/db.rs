use podseq_primitives::{BlockRecord, IngestCursor, TransactionRecord};
use typed_sled::transaction::SledTransactional;

use crate::{
    abort,
    schemas::{BlockSchema, IngestCursorSchema, TransactionSchema, SINGLETON_KEY},
    traits::ChainDatabase,
    DbError, DbResult,
};

define_sled_database!(
    /// Sled store for ingested blocks and transactions.
    pub struct ChainDBSled {
        tx_tree: TransactionSchema,
        block_tree: BlockSchema,
        cursor_tree: IngestCursorSchema,
    }
);

impl ChainDatabase for ChainDBSled {
    fn put_block_with_txs(
        &self,
        block: BlockRecord,
        txs: Vec<TransactionRecord>,
        next_cursor: IngestCursor,
    ) -> DbResult<()> {
        let cursor = self.get_ingest_cursor()?;
        if block.number != cursor.next_block {
            return Err(DbError::OooInsert(BlockSchema::tree_name(), block.number));
        }

        let first_seq = cursor.next_tx_seq;
        let expected = IngestCursor {
            next_block: block.number + 1,
            next_tx_seq: first_seq + txs.len() as u64,
        };
        if next_cursor != expected {
            return Err(DbError::OooInsert(
                IngestCursorSchema::tree_name(),
                next_cursor.next_tx_seq,
            ));
        }

        (&self.tx_tree, &self.block_tree, &self.cursor_tree).transaction_with_retry(
            self.config.backoff.as_ref(),
            self.config.retry_count.into(),
            |(tx_tree, block_tree, cursor_tree)| {
                // NOTE: a concurrent writer could have moved the cursor since the check above.
                if cursor_tree.get(&SINGLETON_KEY)?.unwrap_or_default() != cursor {
                    return abort(DbError::OooInsert(
                        IngestCursorSchema::tree_name(),
                        block.number,
                    ))?;
                }
                if block_tree.get(&block.number)?.is_some() {
                    return abort(DbError::EntryAlreadyExists(
                        BlockSchema::tree_name(),
                        block.number,
                    ))?;
                }

                for (seq, tx) in (first_seq..).zip(txs.iter()) {
                    if tx_tree.get(&seq)?.is_some() {
                        return abort(DbError::EntryAlreadyExists(
                            TransactionSchema::tree_name(),
                            seq,
                        ))?;
                    }
                    tx_tree.insert(&seq, tx)?;
                }
                block_tree.insert(&block.number, &block)?;
                cursor_tree.insert(&SINGLETON_KEY, &next_cursor)?;
                Ok(())
            },
        )?;

        Ok(())
    }

    fn get_ingest_cursor(&self) -> DbResult<IngestCursor> {
        Ok(self.cursor_tree.get(&SINGLETON_KEY)?.unwrap_or_default())
    }

    fn get_transaction(&self, seq: u64) -> DbResult<Option<TransactionRecord>> {
        Ok(self.tx_tree.get(&seq)?)
    }

    fn get_block(&self, number: u64) -> DbResult<Option<BlockRecord>> {
        Ok(self.block_tree.get(&number)?)
    }

    fn transaction_count(&self) -> DbResult<u64> {
        Ok(self.get_ingest_cursor()?.next_tx_seq)
    }
}

#[cfg(test)]
mod tests {
    use podseq_primitives::test_utils::{addr, block, transfer};

    use super::*;

    sled_db_test_setup!(ChainDBSled);

    fn txs_for(block_number: u64, first_seq: u64, n: u64) -> Vec<TransactionRecord> {
        (first_seq..first_seq + n)
            .map(|seq| transfer(seq, block_number, addr(1), addr(2), 10))
            .collect()
    }

    #[test]
    fn test_fresh_db_has_zero_cursor() {
        let db = setup_db();
        assert_eq!(db.get_ingest_cursor().unwrap(), IngestCursor::default());
        assert_eq!(db.transaction_count().unwrap(), 0);
    }

    #[test]
    fn test_put_block_assigns_consecutive_seqs() {
        let db = setup_db();

        let first = txs_for(0, 0, 3);
        let next = IngestCursor {
            next_block: 1,
            next_tx_seq: 3,
        };
        db.put_block_with_txs(block(0, 3), first.clone(), next).unwrap();

        let second = txs_for(1, 3, 2);
        let next = IngestCursor {
            next_block: 2,
            next_tx_seq: 5,
        };
        db.put_block_with_txs(block(1, 2), second.clone(), next).unwrap();

        assert_eq!(db.get_ingest_cursor().unwrap(), next);
        assert_eq!(db.transaction_count().unwrap(), 5);
        assert_eq!(db.get_transaction(0).unwrap(), Some(first[0].clone()));
        assert_eq!(db.get_transaction(4).unwrap(), Some(second[1].clone()));
        assert_eq!(db.get_transaction(5).unwrap(), None);
        assert_eq!(db.get_block(1).unwrap(), Some(block(1, 2)));
    }

    #[test]
    fn test_empty_block_only_moves_block_cursor() {
        let db = setup_db();
        let next = IngestCursor {
            next_block: 1,
            next_tx_seq: 0,
        };
        db.put_block_with_txs(block(0, 0), vec![], next).unwrap();
        assert_eq!(db.get_ingest_cursor().unwrap(), next);
    }

    #[test]
    fn test_out_of_order_block_rejected() {
        let db = setup_db();
        let next = IngestCursor {
            next_block: 3,
            next_tx_seq: 0,
        };
        let res = db.put_block_with_txs(block(2, 0), vec![], next);
        assert!(matches!(res, Err(DbError::OooInsert(_, 2))));
        assert_eq!(db.get_block(2).unwrap(), None);
    }

    #[test]
    fn test_mismatched_cursor_rejected() {
        let db = setup_db();
        let wrong = IngestCursor {
            next_block: 1,
            next_tx_seq: 7,
        };
        let res = db.put_block_with_txs(block(0, 2), txs_for(0, 0, 2), wrong);
        assert!(matches!(res, Err(DbError::OooInsert(_, 7))));
        assert_eq!(db.get_transaction(0).unwrap(), None);
    }
}
