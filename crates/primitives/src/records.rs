//! Raw execution-layer records written by chain ingestion.

use std::io::{self, Read, Write};

use alloy_primitives::{Address, Bytes, B256, U256};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::{borsh_helpers::*, Amount};

/// A transaction as observed on the execution layer.
///
/// Immutable once stored. Records are keyed by the sequence number assigned at ingestion time,
/// not by hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub hash: B256,
    pub from: Address,
    /// Recipient. Contract creations record the sender here.
    pub to: Address,
    pub value: Amount,
    pub input: Bytes,
    pub nonce: u64,
    pub gas: u64,
    pub gas_price: u128,
    pub block_number: u64,
    pub block_hash: B256,
    pub transaction_index: u64,
    pub tx_type: u8,
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

impl TransactionRecord {
    /// Block whose post-state holds the balances seen by this transaction.
    pub fn pre_state_block(&self) -> u64 {
        self.block_number.saturating_sub(1)
    }
}

impl BorshSerialize for TransactionRecord {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_b256(&self.hash, writer)?;
        write_address(&self.from, writer)?;
        write_address(&self.to, writer)?;
        BorshSerialize::serialize(&self.value, writer)?;
        write_bytes(&self.input, writer)?;
        BorshSerialize::serialize(&self.nonce, writer)?;
        BorshSerialize::serialize(&self.gas, writer)?;
        BorshSerialize::serialize(&self.gas_price, writer)?;
        BorshSerialize::serialize(&self.block_number, writer)?;
        write_b256(&self.block_hash, writer)?;
        BorshSerialize::serialize(&self.transaction_index, writer)?;
        BorshSerialize::serialize(&self.tx_type, writer)?;
        BorshSerialize::serialize(&self.v, writer)?;
        write_u256(&self.r, writer)?;
        write_u256(&self.s, writer)
    }
}

impl BorshDeserialize for TransactionRecord {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            hash: read_b256(reader)?,
            from: read_address(reader)?,
            to: read_address(reader)?,
            value: BorshDeserialize::deserialize_reader(reader)?,
            input: read_bytes(reader)?,
            nonce: BorshDeserialize::deserialize_reader(reader)?,
            gas: BorshDeserialize::deserialize_reader(reader)?,
            gas_price: BorshDeserialize::deserialize_reader(reader)?,
            block_number: BorshDeserialize::deserialize_reader(reader)?,
            block_hash: read_b256(reader)?,
            transaction_index: BorshDeserialize::deserialize_reader(reader)?,
            tx_type: BorshDeserialize::deserialize_reader(reader)?,
            v: BorshDeserialize::deserialize_reader(reader)?,
            r: read_u256(reader)?,
            s: read_u256(reader)?,
        })
    }
}

/// Block header summary kept alongside the ingested transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    pub number: u64,
    pub hash: B256,
    pub parent_hash: B256,
    pub state_root: B256,
    pub transactions_root: B256,
    pub receipts_root: B256,
    pub miner: Address,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub base_fee_per_gas: Option<u64>,
    pub timestamp: u64,
    pub transaction_count: u32,
}

impl BorshSerialize for BlockRecord {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        BorshSerialize::serialize(&self.number, writer)?;
        write_b256(&self.hash, writer)?;
        write_b256(&self.parent_hash, writer)?;
        write_b256(&self.state_root, writer)?;
        write_b256(&self.transactions_root, writer)?;
        write_b256(&self.receipts_root, writer)?;
        write_address(&self.miner, writer)?;
        BorshSerialize::serialize(&self.gas_limit, writer)?;
        BorshSerialize::serialize(&self.gas_used, writer)?;
        BorshSerialize::serialize(&self.base_fee_per_gas, writer)?;
        BorshSerialize::serialize(&self.timestamp, writer)?;
        BorshSerialize::serialize(&self.transaction_count, writer)
    }
}

impl BorshDeserialize for BlockRecord {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            number: BorshDeserialize::deserialize_reader(reader)?,
            hash: read_b256(reader)?,
            parent_hash: read_b256(reader)?,
            state_root: read_b256(reader)?,
            transactions_root: read_b256(reader)?,
            receipts_root: read_b256(reader)?,
            miner: read_address(reader)?,
            gas_limit: BorshDeserialize::deserialize_reader(reader)?,
            gas_used: BorshDeserialize::deserialize_reader(reader)?,
            base_fee_per_gas: BorshDeserialize::deserialize_reader(reader)?,
            timestamp: BorshDeserialize::deserialize_reader(reader)?,
            transaction_count: BorshDeserialize::deserialize_reader(reader)?,
        })
    }
}
