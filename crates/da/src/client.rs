use async_trait::async_trait;
use podseq_primitives::{Proof, StateCommitment};
use serde::{Deserialize, Serialize};
use tracing::*;

use crate::DaError;

pub const DEFAULT_DA_URL: &str = "http://0.0.0.0:5050/celestia";
pub const DEFAULT_CLIENT_NAME: &str = "celestia";

/// Sentinel key the DA service returns while it cannot accept a blob.
const NOT_READY_KEY: &str = "nil";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaPayload {
    pub proof: Proof,
    pub txn_hashes: Vec<String>,
    pub current_state_hash: StateCommitment,
    pub previous_state_hash: StateCommitment,
    pub meta_data: DaMetadata,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaMetadata {
    #[serde(rename = "chainID")]
    pub chain_id: String,
    #[serde(rename = "batchNumber")]
    pub batch_number: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaResponse {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub da_key_hash: String,
}

impl DaResponse {
    pub fn into_outcome(self) -> DaSubmitOutcome {
        if self.da_key_hash == NOT_READY_KEY {
            DaSubmitOutcome::NotReady
        } else {
            DaSubmitOutcome::Accepted(self.da_key_hash)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DaSubmitOutcome {
    /// Blob stored under this content key.
    Accepted(String),
    NotReady,
}

/// Data-availability network endpoint.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait DaClient: Send + Sync {
    /// Name recorded in DA records, e.g. `celestia`.
    fn name(&self) -> String;

    async fn submit(&self, payload: &DaPayload) -> Result<DaSubmitOutcome, DaError>;
}

/// [`DaClient`] posting JSON payloads over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDaClient {
    client: reqwest::Client,
    url: String,
    name: String,
}

impl HttpDaClient {
    pub fn try_new(url: &str, name: &str) -> Result<Self, DaError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            url: url.to_owned(),
            name: name.to_owned(),
        })
    }
}

#[async_trait]
impl DaClient for HttpDaClient {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn submit(&self, payload: &DaPayload) -> Result<DaSubmitOutcome, DaError> {
        let response = self.client.post(&self.url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DaError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response: DaResponse = response.json().await?;
        trace!(batch_number = payload.meta_data.batch_number, ?response, "DA response");
        Ok(response.into_outcome())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_field_names() {
        let payload = DaPayload {
            proof: Proof::new(vec![0xab]),
            txn_hashes: vec!["0x01".into()],
            current_state_hash: StateCommitment::from_hex("cc"),
            previous_state_hash: StateCommitment::genesis(),
            meta_data: DaMetadata {
                chain_id: "1337".into(),
                batch_number: 4,
            },
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["proof"], "ab");
        assert_eq!(json["txnHashes"][0], "0x01");
        assert_eq!(json["currentStateHash"], "cc");
        assert_eq!(json["previousStateHash"], "0");
        assert_eq!(json["metaData"]["chainID"], "1337");
        assert_eq!(json["metaData"]["batchNumber"], 4);
    }

    #[test]
    fn test_nil_key_means_not_ready() {
        let ready: DaResponse =
            serde_json::from_str(r#"{"status":200,"success":true,"message":"ok","daKeyHash":"k1"}"#)
                .unwrap();
        assert_eq!(ready.into_outcome(), DaSubmitOutcome::Accepted("k1".into()));

        let busy: DaResponse = serde_json::from_str(r#"{"daKeyHash":"nil"}"#).unwrap();
        assert_eq!(busy.into_outcome(), DaSubmitOutcome::NotReady);
    }
}
