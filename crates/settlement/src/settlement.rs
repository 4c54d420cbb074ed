use std::sync::Arc;

use chrono::Utc;
use podseq_common::{retry_fixed, RetryConfig, RetryError, ShutdownSignal};
use podseq_db::PodDatabase;
use podseq_primitives::{CommitReceipt, DaRecord, Proof, PublicWitness};
use tracing::*;

use crate::{
    CommitRequest, FlowError, SettlementClient, SettlementError, SettlementResponse,
    VerifyRequest,
};

/// Drives the commit and verify phases of a pod against the settlement layer.
#[derive(Debug)]
pub struct Settlement<C, D> {
    client: Arc<C>,
    db: Arc<D>,
    retry: RetryConfig,
}

impl<C, D> Settlement<C, D>
where
    C: SettlementClient,
    D: PodDatabase,
{
    pub fn new(client: Arc<C>, db: Arc<D>, retry: RetryConfig) -> Self {
        Self { client, db, retry }
    }

    fn station_id(&self) -> Result<String, FlowError> {
        self.db
            .get_settlement_chain_info()?
            .map(|info| info.chain_id)
            .ok_or(FlowError::MissingChainInfo)
    }

    /// Commits pod `batch_number` and persists the resulting receipt.
    ///
    /// A receipt stored by an earlier run is returned without calling the settlement layer.
    pub async fn commit<S>(
        &self,
        batch_number: u64,
        da_record: &DaRecord,
        public_witness: &PublicWitness,
        shutdown: &S,
    ) -> Result<CommitReceipt, FlowError>
    where
        S: ShutdownSignal + ?Sized,
    {
        if let Some(receipt) = self.db.get_commit_receipt(batch_number)? {
            info!(batch_number, "batch already committed");
            return Ok(receipt);
        }

        let request = CommitRequest {
            station_id: self.station_id()?,
            pod_number: batch_number,
            merkle_root_hash: da_record.current_state_hash.clone(),
            previous_merkle_root_hash: da_record.previous_state_hash.clone(),
            public_witness: public_witness.clone(),
            timestamp: Utc::now().timestamp(),
        };

        let response = retry_fixed(&self.retry, shutdown, "settlement_commit", || {
            let client = &self.client;
            let request = &request;
            async move { accepted(client.add_batch(request).await?) }
        })
        .await
        .map_err(|err| flow_error("commit", batch_number, err))?;

        let receipt = CommitReceipt {
            batch_number,
            settlement_ref: response.data,
        };
        self.db.put_commit_receipt(receipt.clone())?;
        info!(batch_number, settlement_ref = %receipt.settlement_ref, "committed batch");
        Ok(receipt)
    }

    /// Submits the proof of a committed pod and returns the settlement layer's verdict.
    ///
    /// Returns `Ok(false)` only when a bounded retry policy runs out while the settlement layer
    /// keeps rejecting the proof.
    pub async fn verify<S>(
        &self,
        receipt: &CommitReceipt,
        da_record: &DaRecord,
        proof: &Proof,
        shutdown: &S,
    ) -> Result<bool, FlowError>
    where
        S: ShutdownSignal + ?Sized,
    {
        let batch_number = receipt.batch_number;
        if da_record.batch_number != batch_number {
            return Err(FlowError::NotCommitted(da_record.batch_number));
        }

        let request = VerifyRequest {
            station_id: self.station_id()?,
            pod_number: batch_number,
            merkle_root_hash: da_record.current_state_hash.clone(),
            previous_merkle_root_hash: da_record.previous_state_hash.clone(),
            zk_proof: proof.clone(),
        };

        let res = retry_fixed(&self.retry, shutdown, "settlement_verify", || {
            let client = &self.client;
            let request = &request;
            async move { accepted(client.verify_batch(request).await?) }
        })
        .await;

        match res {
            Ok(response) => {
                info!(batch_number, description = %response.description, "verified batch");
                Ok(true)
            }
            Err(RetryError::Exhausted {
                last: SettlementError::Rejected(reason),
                ..
            }) => {
                warn!(batch_number, %reason, "settlement rejected proof");
                Ok(false)
            }
            Err(err) => Err(flow_error("verify", batch_number, err)),
        }
    }
}

/// Turns a `status: false` answer into a retryable error.
fn accepted(response: SettlementResponse) -> Result<SettlementResponse, SettlementError> {
    if response.status {
        Ok(response)
    } else {
        let reason = if response.description.is_empty() {
            response.data
        } else {
            response.description
        };
        Err(SettlementError::Rejected(reason))
    }
}

fn flow_error(
    phase: &'static str,
    batch_number: u64,
    err: RetryError<SettlementError>,
) -> FlowError {
    match err {
        RetryError::Shutdown => FlowError::Shutdown,
        RetryError::Exhausted { last, .. } => FlowError::Exhausted {
            phase,
            batch_number,
            source: last,
        },
    }
}
