use async_trait::async_trait;
use podseq_primitives::{Proof, PublicWitness, StateCommitment};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::*;

use crate::SettlementError;

pub const DEFAULT_SETTLEMENT_URL: &str = "http://0.0.0.0:8080";

/// `data` value of an `add-station` response for an already known station.
const STATION_EXISTS: &str = "exist";
/// `data` value the settlement layer uses for "no value".
const NIL: &str = "nil";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Hex-encoded verifying key.
    pub verification_key: String,
    /// JSON-encoded station description.
    pub chain_info: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    pub station_id: String,
    pub pod_number: u64,
    pub merkle_root_hash: StateCommitment,
    pub previous_merkle_root_hash: StateCommitment,
    pub public_witness: PublicWitness,
    pub timestamp: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub station_id: String,
    pub pod_number: u64,
    pub merkle_root_hash: StateCommitment,
    pub previous_merkle_root_hash: StateCommitment,
    pub zk_proof: Proof,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResponse {
    pub status: bool,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Newly registered under this station id.
    Registered(String),
    AlreadyExists,
}

impl SettlementResponse {
    pub fn into_register_outcome(self) -> Result<RegisterOutcome, SettlementError> {
        match self.data.as_str() {
            STATION_EXISTS => Ok(RegisterOutcome::AlreadyExists),
            "" | NIL => Err(SettlementError::Rejected(self.description)),
            _ => Ok(RegisterOutcome::Registered(self.data)),
        }
    }
}

/// Settlement layer endpoints.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait SettlementClient: Send + Sync {
    async fn register_station(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisterOutcome, SettlementError>;

    /// Commit phase.
    async fn add_batch(&self, request: &CommitRequest)
        -> Result<SettlementResponse, SettlementError>;

    /// Verify phase. Only valid after a successful commit of the same pod.
    async fn verify_batch(
        &self,
        request: &VerifyRequest,
    ) -> Result<SettlementResponse, SettlementError>;
}

/// [`SettlementClient`] speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSettlementClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSettlementClient {
    pub fn try_new(base_url: &str) -> Result<Self, SettlementError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn post<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp, SettlementError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{path}", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SettlementError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SettlementClient for HttpSettlementClient {
    async fn register_station(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisterOutcome, SettlementError> {
        let response: SettlementResponse = self.post("add-station", request).await?;
        debug!(?response, "add-station response");
        response.into_register_outcome()
    }

    async fn add_batch(
        &self,
        request: &CommitRequest,
    ) -> Result<SettlementResponse, SettlementError> {
        self.post("add_batch", request).await
    }

    async fn verify_batch(
        &self,
        request: &VerifyRequest,
    ) -> Result<SettlementResponse, SettlementError> {
        self.post("verify-pod", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_outcome_from_data() {
        let response = |data: &str| SettlementResponse {
            status: true,
            data: data.to_owned(),
            description: String::new(),
        };

        assert_eq!(
            response("station-9").into_register_outcome().unwrap(),
            RegisterOutcome::Registered("station-9".into())
        );
        assert_eq!(
            response("exist").into_register_outcome().unwrap(),
            RegisterOutcome::AlreadyExists
        );
        assert!(response("nil").into_register_outcome().is_err());
    }

    #[test]
    fn test_verify_request_is_snake_case() {
        let request = VerifyRequest {
            station_id: "s".into(),
            pod_number: 2,
            merkle_root_hash: StateCommitment::from_hex("bb"),
            previous_merkle_root_hash: StateCommitment::from_hex("aa"),
            zk_proof: Proof::new(vec![0x01, 0x02]),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["station_id"], "s");
        assert_eq!(json["pod_number"], 2);
        assert_eq!(json["merkle_root_hash"], "bb");
        assert_eq!(json["previous_merkle_root_hash"], "aa");
        assert_eq!(json["zk_proof"], "0102");
    }

    #[test]
    fn test_response_defaults_missing_fields() {
        let response: SettlementResponse = serde_json::from_str(r#"{"status":false}"#).unwrap();
        assert!(!response.status);
        assert!(response.data.is_empty());
    }
}
