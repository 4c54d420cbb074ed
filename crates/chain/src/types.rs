//! Execution-layer JSON-RPC shapes, decoded from the standard `eth_*` responses.

use alloy_primitives::{Address, Bytes, B256, U128, U256, U64};
use podseq_primitives::{Amount, BlockRecord, TransactionRecord};
use serde::{Deserialize, Serialize};

use crate::ClientError;

/// Block header with transaction hashes only (`eth_getBlockByNumber(n, false)`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainBlock {
    pub number: U64,
    pub hash: B256,
    pub parent_hash: B256,
    pub state_root: B256,
    pub transactions_root: B256,
    pub receipts_root: B256,
    pub miner: Address,
    pub gas_limit: U64,
    pub gas_used: U64,
    #[serde(default)]
    pub base_fee_per_gas: Option<U64>,
    pub timestamp: U64,
    #[serde(default)]
    pub transactions: Vec<B256>,
}

impl ChainBlock {
    pub fn to_record(&self) -> Result<BlockRecord, ClientError> {
        let transaction_count = u32::try_from(self.transactions.len())
            .map_err(|e| ClientError::Malformed("block", e.to_string()))?;
        Ok(BlockRecord {
            number: self.number.to(),
            hash: self.hash,
            parent_hash: self.parent_hash,
            state_root: self.state_root,
            transactions_root: self.transactions_root,
            receipts_root: self.receipts_root,
            miner: self.miner,
            gas_limit: self.gas_limit.to(),
            gas_used: self.gas_used.to(),
            base_fee_per_gas: self.base_fee_per_gas.map(|fee| fee.to()),
            timestamp: self.timestamp.to(),
            transaction_count,
        })
    }
}

/// A mined transaction (`eth_getTransactionByHash`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainTransaction {
    pub hash: B256,
    pub from: Address,
    /// `None` for contract creation.
    #[serde(default)]
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub nonce: U64,
    pub gas: U64,
    #[serde(default)]
    pub gas_price: Option<U128>,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub block_hash: Option<B256>,
    #[serde(default)]
    pub transaction_index: Option<U64>,
    #[serde(rename = "type", default)]
    pub tx_type: Option<U64>,
    #[serde(default)]
    pub v: Option<U64>,
    #[serde(default)]
    pub r: Option<U256>,
    #[serde(default)]
    pub s: Option<U256>,
}

/// Subset of `eth_getTransactionReceipt` used at ingestion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReceipt {
    pub transaction_hash: B256,
    pub transaction_index: U64,
    pub block_number: U64,
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub contract_address: Option<Address>,
}

/// Builds the stored record. Pending transactions are rejected; the receipt supplies the
/// authoritative position inside the block.
pub fn to_transaction_record(
    tx: &ChainTransaction,
    receipt: &ChainReceipt,
) -> Result<TransactionRecord, ClientError> {
    let block_number = tx
        .block_number
        .ok_or_else(|| ClientError::Malformed("transaction", format!("{} is pending", tx.hash)))?;
    let block_hash = tx
        .block_hash
        .ok_or_else(|| ClientError::Malformed("transaction", format!("{} has no block", tx.hash)))?;
    if receipt.transaction_hash != tx.hash {
        return Err(ClientError::Malformed(
            "receipt",
            format!("{} does not belong to {}", receipt.transaction_hash, tx.hash),
        ));
    }

    Ok(TransactionRecord {
        hash: tx.hash,
        from: tx.from,
        // Contract creations are attributed to the sender.
        to: tx.to.unwrap_or(tx.from),
        value: Amount::new(tx.value),
        input: tx.input.clone(),
        nonce: tx.nonce.to(),
        gas: tx.gas.to(),
        gas_price: tx.gas_price.map(|p| p.to()).unwrap_or_default(),
        block_number: block_number.to(),
        block_hash,
        transaction_index: receipt.transaction_index.to(),
        tx_type: tx.tx_type.map(|t| t.saturating_to()).unwrap_or_default(),
        v: tx.v.map(|v| v.to()).unwrap_or_default(),
        r: tx.r.unwrap_or_default(),
        s: tx.s.unwrap_or_default(),
    })
}
