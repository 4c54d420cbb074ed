use std::sync::Arc;

use podseq_common::{retry_fixed, RetryConfig, RetryError, ShutdownSignal};
use podseq_db::PodDatabase;
use podseq_primitives::SettlementChainInfo;
use serde_json::Value;
use tracing::*;

use crate::{FlowError, RegisterOutcome, RegisterRequest, SettlementClient};

/// What the node announces about itself when joining the settlement layer.
#[derive(Clone, Debug)]
pub struct StationParams {
    /// Raw verifying key bytes, sent hex-encoded.
    pub verification_key: Vec<u8>,
    /// Free-form station description. Must carry a `moniker` string.
    pub chain_info: Value,
    /// Station id to fall back on when the settlement layer already knows this station.
    pub station_id: Option<String>,
}

impl StationParams {
    pub fn moniker(&self) -> &str {
        self.chain_info
            .get("moniker")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// Registers the station unless chain info is already persisted, and returns the identity in
/// effect.
pub async fn ensure_registered<C, D, S>(
    client: &C,
    db: &Arc<D>,
    params: &StationParams,
    retry: &RetryConfig,
    shutdown: &S,
) -> Result<SettlementChainInfo, FlowError>
where
    C: SettlementClient,
    D: PodDatabase,
    S: ShutdownSignal + ?Sized,
{
    if let Some(info) = db.get_settlement_chain_info()? {
        debug!(chain_id = %info.chain_id, "station already registered");
        return Ok(info);
    }

    let request = RegisterRequest {
        verification_key: hex::encode(&params.verification_key),
        chain_info: serde_json::to_string(&params.chain_info)
            .map_err(|err| FlowError::Encode(err.to_string()))?,
    };

    let outcome = retry_fixed(retry, shutdown, "register_station", || {
        let request = &request;
        async move { client.register_station(request).await }
    })
    .await
    .map_err(|err| match err {
        RetryError::Shutdown => FlowError::Shutdown,
        RetryError::Exhausted { last, .. } => FlowError::Exhausted {
            phase: "register",
            batch_number: 0,
            source: last,
        },
    })?;

    let chain_id = match outcome {
        RegisterOutcome::Registered(chain_id) => chain_id,
        RegisterOutcome::AlreadyExists => {
            warn!("settlement layer already knows this station");
            params
                .station_id
                .clone()
                .ok_or(FlowError::UnknownStationId)?
        }
    };

    let info = SettlementChainInfo {
        chain_id,
        chain_name: params.moniker().to_owned(),
    };
    db.put_settlement_chain_info(info.clone())?;
    info!(chain_id = %info.chain_id, chain_name = %info.chain_name, "registered station");
    Ok(info)
}
