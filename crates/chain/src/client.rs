use alloy_primitives::{Address, B256, U256, U64};
use async_trait::async_trait;
use jsonrpsee::{
    core::client::ClientT,
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
};
use podseq_primitives::Amount;
use tracing::*;

use crate::{
    types::{ChainBlock, ChainReceipt, ChainTransaction},
    ClientError,
};

pub const DEFAULT_RPC_URL: &str = "http://0.0.0.0:8545";

/// Read access to the execution layer, as needed by ingestion and batch assembly.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Height of the current chain head.
    async fn block_number(&self) -> Result<u64, ClientError>;

    /// Returns `None` if the block is not known yet.
    async fn block_by_number(&self, number: u64) -> Result<Option<ChainBlock>, ClientError>;

    async fn transaction_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<ChainTransaction>, ClientError>;

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<ChainReceipt>, ClientError>;

    async fn network_id(&self) -> Result<u64, ClientError>;

    /// Balance of `address` in the post-state of `block`.
    async fn balance(&self, address: Address, block: u64) -> Result<Amount, ClientError>;

    /// Nonce of the sender of `tx_hash`, as of `block`.
    async fn account_nonce(&self, tx_hash: B256, block: u64) -> Result<u64, ClientError>;
}

/// [`ExecutionClient`] over the standard `eth_*` JSON-RPC methods.
#[derive(Debug)]
pub struct RpcExecutionClient {
    client: HttpClient,
}

impl RpcExecutionClient {
    pub fn try_new(url: &str) -> Result<Self, ClientError> {
        let client = HttpClientBuilder::default()
            .build(url)
            .map_err(|e| ClientError::rpc(e.to_string()))?;
        Ok(Self { client })
    }
}

fn block_tag(number: u64) -> String {
    format!("{number:#x}")
}

#[async_trait]
impl ExecutionClient for RpcExecutionClient {
    async fn block_number(&self) -> Result<u64, ClientError> {
        let height: U64 = self
            .client
            .request("eth_blockNumber", rpc_params![])
            .await?;
        Ok(height.to())
    }

    async fn block_by_number(&self, number: u64) -> Result<Option<ChainBlock>, ClientError> {
        Ok(self
            .client
            .request("eth_getBlockByNumber", rpc_params![block_tag(number), false])
            .await?)
    }

    async fn transaction_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<ChainTransaction>, ClientError> {
        Ok(self
            .client
            .request("eth_getTransactionByHash", rpc_params![hash])
            .await?)
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<ChainReceipt>, ClientError> {
        Ok(self
            .client
            .request("eth_getTransactionReceipt", rpc_params![hash])
            .await?)
    }

    async fn network_id(&self) -> Result<u64, ClientError> {
        // net_version answers with a decimal string.
        let id: String = self.client.request("net_version", rpc_params![]).await?;
        id.parse()
            .map_err(|_| ClientError::Malformed("network id", id.clone()))
    }

    async fn balance(&self, address: Address, block: u64) -> Result<Amount, ClientError> {
        let balance: U256 = self
            .client
            .request("eth_getBalance", rpc_params![address, block_tag(block)])
            .await?;
        Ok(Amount::new(balance))
    }

    async fn account_nonce(&self, tx_hash: B256, block: u64) -> Result<u64, ClientError> {
        let tx = self
            .transaction_by_hash(tx_hash)
            .await?
            .ok_or_else(|| ClientError::not_found("transaction", tx_hash))?;
        let nonce: U64 = self
            .client
            .request(
                "eth_getTransactionCount",
                rpc_params![tx.from, block_tag(block)],
            )
            .await?;
        trace!(%tx_hash, sender = %tx.from, block, "fetched account nonce");
        Ok(nonce.to())
    }
}
