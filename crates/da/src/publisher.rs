use std::sync::Arc;

use podseq_common::{retry_fixed, RetryConfig, RetryError, ShutdownSignal};
use podseq_db::PodDatabase;
use podseq_primitives::{DaRecord, Proof, StateCommitment};
use tracing::*;

use crate::{DaClient, DaError, DaMetadata, DaPayload, DaSubmitOutcome, PublishError};

/// Publishes proven batches to DA and extends the state-hash chain.
#[derive(Debug)]
pub struct DaPublisher<C, D> {
    client: Arc<C>,
    db: Arc<D>,
    chain_id: String,
    retry: RetryConfig,
}

impl<C, D> DaPublisher<C, D>
where
    C: DaClient,
    D: PodDatabase,
{
    pub fn new(client: Arc<C>, db: Arc<D>, chain_id: String, retry: RetryConfig) -> Self {
        Self {
            client,
            db,
            chain_id,
            retry,
        }
    }

    /// Publishes batch `batch_number` and persists exactly one [`DaRecord`] for it.
    ///
    /// A record left by an earlier run is returned without submitting again, provided it was
    /// published for the same commitment.
    pub async fn publish<S>(
        &self,
        batch_number: u64,
        txn_hashes: Vec<String>,
        commitment: &StateCommitment,
        proof: &Proof,
        shutdown: &S,
    ) -> Result<DaRecord, PublishError>
    where
        S: ShutdownSignal + ?Sized,
    {
        if let Some(existing) = self.db.get_da_record(batch_number)? {
            if existing.current_state_hash != *commitment {
                return Err(PublishError::CommitmentMismatch {
                    batch_number,
                    stored: existing.current_state_hash,
                    computed: commitment.clone(),
                });
            }
            info!(batch_number, da_key = %existing.da_key, "batch already published");
            return Ok(existing);
        }

        let prev_number = batch_number.saturating_sub(1);
        let prev = self
            .db
            .get_da_record(prev_number)?
            .ok_or(PublishError::MissingPrevious(prev_number))?;

        let payload = DaPayload {
            proof: proof.clone(),
            txn_hashes,
            current_state_hash: commitment.clone(),
            previous_state_hash: prev.current_state_hash.clone(),
            meta_data: DaMetadata {
                chain_id: self.chain_id.clone(),
                batch_number,
            },
        };

        let da_key = retry_fixed(&self.retry, shutdown, "da_submit", || {
            let client = &self.client;
            let payload = &payload;
            async move {
                match client.submit(payload).await? {
                    DaSubmitOutcome::Accepted(key) => Ok(key),
                    DaSubmitOutcome::NotReady => Err(DaError::NotReady),
                }
            }
        })
        .await
        .map_err(|err| match err {
            RetryError::Shutdown => PublishError::Shutdown,
            RetryError::Exhausted { last, .. } => PublishError::Exhausted {
                batch_number,
                source: last,
            },
        })?;

        let record = DaRecord::link(&prev, da_key, self.client.name(), commitment.clone());
        self.db.put_da_record(record.clone())?;
        info!(batch_number, da_key = %record.da_key, "published batch to DA");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use podseq_common::ShutdownFlag;
    use podseq_db::test_utils::get_test_databases;

    use super::*;
    use crate::MockDaClient;

    fn retry() -> RetryConfig {
        RetryConfig::unbounded(1)
    }

    fn init_db() -> podseq_db::Databases {
        let dbs = get_test_databases();
        dbs.pod.init_pipeline_state().unwrap();
        dbs
    }

    #[tokio::test]
    async fn test_not_ready_twice_then_one_record() {
        let dbs = init_db();
        let calls = Arc::new(AtomicU32::new(0));

        let mut client = MockDaClient::new();
        client.expect_name().returning(|| "celestia".to_owned());
        let counter = calls.clone();
        client.expect_submit().times(3).returning(move |_| {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Ok(DaSubmitOutcome::NotReady),
                _ => Ok(DaSubmitOutcome::Accepted("key-3".to_owned())),
            }
        });

        let publisher =
            DaPublisher::new(Arc::new(client), dbs.pod.clone(), "1337".into(), retry());
        let commitment = StateCommitment::from_hex("c1");
        let record = publisher
            .publish(
                1,
                vec!["0x01".into()],
                &commitment,
                &Proof::new(vec![1]),
                &ShutdownFlag::new(),
            )
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(record.da_key, "key-3");
        assert_eq!(record.batch_number, 1);
        assert!(record.extends(&DaRecord::genesis()));
        assert_eq!(dbs.pod.get_da_record(1).unwrap(), Some(record));
        assert_eq!(dbs.pod.get_da_record(2).unwrap(), None);
    }

    #[tokio::test]
    async fn test_links_previous_commitment() {
        let dbs = init_db();
        let first = DaRecord::link(
            &DaRecord::genesis(),
            "k1".into(),
            "celestia".into(),
            StateCommitment::from_hex("aa"),
        );
        dbs.pod.put_da_record(first).unwrap();

        let mut client = MockDaClient::new();
        client.expect_name().returning(|| "celestia".to_owned());
        client
            .expect_submit()
            .withf(|p| {
                p.previous_state_hash == StateCommitment::from_hex("aa")
                    && p.current_state_hash == StateCommitment::from_hex("bb")
                    && p.meta_data.batch_number == 2
                    && p.meta_data.chain_id == "1337"
            })
            .times(1)
            .returning(|_| Ok(DaSubmitOutcome::Accepted("k2".into())));

        let publisher =
            DaPublisher::new(Arc::new(client), dbs.pod.clone(), "1337".into(), retry());
        let record = publisher
            .publish(
                2,
                vec![],
                &StateCommitment::from_hex("bb"),
                &Proof::new(vec![]),
                &ShutdownFlag::new(),
            )
            .await
            .unwrap();
        assert_eq!(record.previous_state_hash, StateCommitment::from_hex("aa"));
    }

    #[tokio::test]
    async fn test_missing_previous_record_is_fatal() {
        let dbs = init_db();
        let mut client = MockDaClient::new();
        client.expect_submit().times(0);

        let publisher = DaPublisher::new(Arc::new(client), dbs.pod.clone(), "1".into(), retry());
        let res = publisher
            .publish(
                3,
                vec![],
                &StateCommitment::from_hex("cc"),
                &Proof::new(vec![]),
                &ShutdownFlag::new(),
            )
            .await;
        assert!(matches!(res, Err(PublishError::MissingPrevious(2))));
    }

    #[tokio::test]
    async fn test_existing_record_not_resubmitted() {
        let dbs = init_db();
        let first = DaRecord::link(
            &DaRecord::genesis(),
            "k1".into(),
            "celestia".into(),
            StateCommitment::from_hex("aa"),
        );
        dbs.pod.put_da_record(first.clone()).unwrap();

        let mut client = MockDaClient::new();
        client.expect_submit().times(0);
        let publisher = DaPublisher::new(Arc::new(client), dbs.pod.clone(), "1".into(), retry());
        let record = publisher
            .publish(
                1,
                vec![],
                &StateCommitment::from_hex("aa"),
                &Proof::new(vec![]),
                &ShutdownFlag::new(),
            )
            .await
            .unwrap();
        assert_eq!(record, first);
    }

    #[tokio::test]
    async fn test_existing_record_for_other_commitment_rejected() {
        let dbs = init_db();
        let first = DaRecord::link(
            &DaRecord::genesis(),
            "k1".into(),
            "celestia".into(),
            StateCommitment::from_hex("aa"),
        );
        dbs.pod.put_da_record(first.clone()).unwrap();

        let mut client = MockDaClient::new();
        client.expect_submit().times(0);
        let publisher = DaPublisher::new(Arc::new(client), dbs.pod.clone(), "1".into(), retry());
        let res = publisher
            .publish(
                1,
                vec![],
                &StateCommitment::from_hex("bb"),
                &Proof::new(vec![]),
                &ShutdownFlag::new(),
            )
            .await;

        match res {
            Err(PublishError::CommitmentMismatch {
                batch_number,
                stored,
                computed,
            }) => {
                assert_eq!(batch_number, 1);
                assert_eq!(stored, StateCommitment::from_hex("aa"));
                assert_eq!(computed, StateCommitment::from_hex("bb"));
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(dbs.pod.get_da_record(1).unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_error_status_is_retried() {
        let dbs = init_db();
        let calls = Arc::new(AtomicU32::new(0));

        let mut client = MockDaClient::new();
        client.expect_name().returning(|| "celestia".to_owned());
        let counter = calls.clone();
        client.expect_submit().times(2).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(DaError::Status {
                    status: 400,
                    body: "bad request".into(),
                })
            } else {
                Ok(DaSubmitOutcome::Accepted("k1".into()))
            }
        });

        let publisher = DaPublisher::new(Arc::new(client), dbs.pod.clone(), "1".into(), retry());
        let record = publisher
            .publish(
                1,
                vec![],
                &StateCommitment::from_hex("aa"),
                &Proof::new(vec![]),
                &ShutdownFlag::new(),
            )
            .await
            .unwrap();
        assert_eq!(record.da_key, "k1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_retry() {
        let dbs = init_db();
        let shutdown = ShutdownFlag::new();
        let trigger = shutdown.clone();

        let mut client = MockDaClient::new();
        client.expect_submit().returning(move |_| {
            trigger.trigger();
            Err(DaError::Transport("connection refused".into()))
        });

        let publisher = DaPublisher::new(
            Arc::new(client),
            dbs.pod.clone(),
            "1".into(),
            RetryConfig::unbounded(10_000),
        );
        let res = publisher
            .publish(
                1,
                vec![],
                &StateCommitment::from_hex("aa"),
                &Proof::new(vec![]),
                &shutdown,
            )
            .await;
        assert!(matches!(res, Err(PublishError::Shutdown)));
        assert_eq!(dbs.pod.get_da_record(1).unwrap(), None);
    }
}
