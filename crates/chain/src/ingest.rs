//! Polls the execution layer and appends new blocks and transactions to the chain store.

use std::{sync::Arc, time::Duration};

use alloy_primitives::B256;
use podseq_common::{sleep_unless_shutdown, ShutdownSignal};
use podseq_db::{ChainDatabase, DbError};
use podseq_primitives::{IngestCursor, TransactionRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::*;

use crate::{types::to_transaction_record, ClientError, ExecutionClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Wait between polls once caught up with the head, and after a failed fetch.
    #[serde(default = "default_block_delay_ms")]
    pub block_delay_ms: u64,
}

fn default_block_delay_ms() -> u64 {
    5_000
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            block_delay_ms: default_block_delay_ms(),
        }
    }
}

impl IngestConfig {
    pub fn block_delay(&self) -> Duration {
        Duration::from_millis(self.block_delay_ms)
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("execution client: {0}")]
    Client(#[from] ClientError),

    #[error("storage: {0}")]
    Db(#[from] DbError),
}

/// Outcome of one ingestion step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStep {
    Stored { block: u64, txs: usize },
    CaughtUp { head: u64 },
}

#[derive(Debug)]
pub struct ChainIngestor<C, D> {
    client: Arc<C>,
    db: Arc<D>,
    config: IngestConfig,
}

impl<C, D> ChainIngestor<C, D>
where
    C: ExecutionClient,
    D: ChainDatabase,
{
    pub fn new(client: Arc<C>, db: Arc<D>, config: IngestConfig) -> Self {
        Self { client, db, config }
    }

    /// Fetches and stores the block at the ingest cursor if the head has reached it.
    pub async fn ingest_next(&self) -> Result<IngestStep, IngestError> {
        let cursor = self.db.get_ingest_cursor()?;
        let head = self.client.block_number().await?;
        if cursor.next_block > head {
            return Ok(IngestStep::CaughtUp { head });
        }

        let number = cursor.next_block;
        let block = self
            .client
            .block_by_number(number)
            .await?
            .ok_or_else(|| ClientError::not_found("block", number))?;

        let mut txs = Vec::with_capacity(block.transactions.len());
        for hash in &block.transactions {
            txs.push(self.fetch_transaction(*hash).await?);
        }

        let record = block.to_record()?;
        let next = IngestCursor {
            next_block: number + 1,
            next_tx_seq: cursor.next_tx_seq + txs.len() as u64,
        };
        let count = txs.len();
        self.db.put_block_with_txs(record, txs, next)?;

        debug!(block = number, txs = count, next_tx_seq = next.next_tx_seq, "stored block");
        Ok(IngestStep::Stored {
            block: number,
            txs: count,
        })
    }

    async fn fetch_transaction(&self, hash: B256) -> Result<TransactionRecord, ClientError> {
        let tx = self
            .client
            .transaction_by_hash(hash)
            .await?
            .ok_or_else(|| ClientError::not_found("transaction", hash))?;
        let receipt = self
            .client
            .transaction_receipt(hash)
            .await?
            .ok_or_else(|| ClientError::not_found("receipt", hash))?;
        to_transaction_record(&tx, &receipt)
    }

    /// Ingests until shutdown. Client failures retry the same block; storage failures are fatal.
    pub async fn run<S>(&self, shutdown: &S) -> Result<(), IngestError>
    where
        S: ShutdownSignal + ?Sized,
    {
        info!(block_delay_ms = self.config.block_delay_ms, "starting chain ingestion");
        loop {
            if shutdown.should_shutdown() {
                info!("chain ingestion stopping");
                return Ok(());
            }

            let wait = match self.ingest_next().await {
                Ok(IngestStep::Stored { .. }) => false,
                Ok(IngestStep::CaughtUp { head }) => {
                    trace!(head, "caught up with chain head");
                    true
                }
                Err(IngestError::Client(err)) => {
                    warn!(%err, retry_in_ms = self.config.block_delay_ms, "block fetch failed");
                    true
                }
                Err(err) => {
                    error!(%err, "chain ingestion failed");
                    return Err(err);
                }
            };

            if wait && !sleep_unless_shutdown(self.config.block_delay(), shutdown).await {
                info!("chain ingestion stopping");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{U256, U64};
    use podseq_common::ShutdownFlag;
    use podseq_db::test_utils::get_test_databases;
    use podseq_primitives::test_utils::{addr, block_hash, tx_hash};

    use super::*;
    use crate::{
        types::{ChainBlock, ChainReceipt, ChainTransaction},
        MockExecutionClient,
    };

    fn chain_block(number: u64, hashes: Vec<B256>) -> ChainBlock {
        ChainBlock {
            number: U64::from(number),
            hash: block_hash(number),
            parent_hash: block_hash(number.saturating_sub(1)),
            state_root: B256::ZERO,
            transactions_root: B256::ZERO,
            receipts_root: B256::ZERO,
            miner: addr(0xee),
            gas_limit: U64::from(30_000_000u64),
            gas_used: U64::ZERO,
            base_fee_per_gas: None,
            timestamp: U64::from(1_000u64 + number),
            transactions: hashes,
        }
    }

    fn chain_tx(hash: B256, block: u64) -> ChainTransaction {
        ChainTransaction {
            hash,
            from: addr(1),
            to: Some(addr(2)),
            value: U256::from(10u64),
            input: Default::default(),
            nonce: U64::ZERO,
            gas: U64::from(21_000u64),
            gas_price: None,
            block_number: Some(U64::from(block)),
            block_hash: Some(block_hash(block)),
            transaction_index: Some(U64::ZERO),
            tx_type: None,
            v: None,
            r: None,
            s: None,
        }
    }

    fn receipt(hash: B256, block: u64) -> ChainReceipt {
        ChainReceipt {
            transaction_hash: hash,
            transaction_index: U64::ZERO,
            block_number: U64::from(block),
            status: Some(U64::from(1u64)),
            contract_address: None,
        }
    }

    fn config() -> IngestConfig {
        IngestConfig { block_delay_ms: 1 }
    }

    #[tokio::test]
    async fn test_caught_up_when_cursor_beyond_head() {
        let dbs = get_test_databases();
        let mut client = MockExecutionClient::new();
        client.expect_block_number().returning(|| Ok(0));
        client
            .expect_block_by_number()
            .times(1)
            .returning(|n| Ok(Some(chain_block(n, vec![]))));

        let ingestor = ChainIngestor::new(Arc::new(client), dbs.chain.clone(), config());
        assert_eq!(
            ingestor.ingest_next().await.unwrap(),
            IngestStep::Stored { block: 0, txs: 0 }
        );
        assert_eq!(
            ingestor.ingest_next().await.unwrap(),
            IngestStep::CaughtUp { head: 0 }
        );
        assert_eq!(dbs.chain.get_ingest_cursor().unwrap().next_block, 1);
    }

    #[tokio::test]
    async fn test_stores_block_transactions_in_order() {
        let dbs = get_test_databases();
        let hashes = vec![tx_hash(0), tx_hash(1), tx_hash(2)];

        let mut client = MockExecutionClient::new();
        client.expect_block_number().returning(|| Ok(0));
        let block_hashes = hashes.clone();
        client
            .expect_block_by_number()
            .withf(|n| *n == 0)
            .times(1)
            .returning(move |n| Ok(Some(chain_block(n, block_hashes.clone()))));
        client
            .expect_transaction_by_hash()
            .times(3)
            .returning(|h| Ok(Some(chain_tx(h, 0))));
        client
            .expect_transaction_receipt()
            .times(3)
            .returning(|h| Ok(Some(receipt(h, 0))));

        let ingestor = ChainIngestor::new(Arc::new(client), dbs.chain.clone(), config());
        let step = ingestor.ingest_next().await.unwrap();
        assert_eq!(step, IngestStep::Stored { block: 0, txs: 3 });

        assert_eq!(dbs.chain.transaction_count().unwrap(), 3);
        for (seq, hash) in hashes.iter().enumerate() {
            let stored = dbs.chain.get_transaction(seq as u64).unwrap().unwrap();
            assert_eq!(stored.hash, *hash);
        }
        assert_eq!(
            dbs.chain.get_ingest_cursor().unwrap(),
            IngestCursor {
                next_block: 1,
                next_tx_seq: 3
            }
        );
    }

    #[tokio::test]
    async fn test_missing_receipt_stores_nothing() {
        let dbs = get_test_databases();
        let mut client = MockExecutionClient::new();
        client.expect_block_number().returning(|| Ok(5));
        client
            .expect_block_by_number()
            .returning(|n| Ok(Some(chain_block(n, vec![tx_hash(0)]))));
        client
            .expect_transaction_by_hash()
            .returning(|h| Ok(Some(chain_tx(h, 0))));
        client.expect_transaction_receipt().returning(|_| Ok(None));

        let ingestor = ChainIngestor::new(Arc::new(client), dbs.chain.clone(), config());
        let res = ingestor.ingest_next().await;
        assert!(matches!(
            res,
            Err(IngestError::Client(ClientError::NotFound { kind: "receipt", .. }))
        ));
        assert_eq!(dbs.chain.get_ingest_cursor().unwrap(), IngestCursor::default());
        assert_eq!(dbs.chain.get_transaction(0).unwrap(), None);
    }

    #[tokio::test]
    async fn test_run_retries_client_errors_until_shutdown() {
        let dbs = get_test_databases();
        let shutdown = ShutdownFlag::new();
        let trigger = shutdown.clone();

        let mut client = MockExecutionClient::new();
        let mut calls = 0;
        client.expect_block_number().returning(move || {
            calls += 1;
            if calls >= 3 {
                trigger.trigger();
            }
            Err(ClientError::Network("connection refused".into()))
        });

        let ingestor = ChainIngestor::new(Arc::new(client), dbs.chain.clone(), config());
        ingestor.run(&shutdown).await.unwrap();
        assert_eq!(dbs.chain.get_ingest_cursor().unwrap(), IngestCursor::default());
    }
}
