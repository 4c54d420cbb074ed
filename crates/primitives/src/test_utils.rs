//! Deterministic record builders for tests in downstream crates.

use alloy_primitives::{Address, Bytes, B256, U256};

use crate::{Amount, BatchEntry, BlockRecord, TransactionRecord};

/// Address whose bytes are all `byte`.
pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// Hash whose trailing 8 bytes encode `seq`, so distinct seqs never collide.
pub fn tx_hash(seq: u64) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[0] = 0xaa;
    bytes[24..].copy_from_slice(&seq.to_be_bytes());
    B256::from(bytes)
}

pub fn block_hash(number: u64) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[0] = 0xbb;
    bytes[24..].copy_from_slice(&number.to_be_bytes());
    B256::from(bytes)
}

/// Value transfer from `from` to `to` mined in `block_number`.
pub fn transfer(
    seq: u64,
    block_number: u64,
    from: Address,
    to: Address,
    value: u64,
) -> TransactionRecord {
    TransactionRecord {
        hash: tx_hash(seq),
        from,
        to,
        value: Amount::from(value),
        input: Bytes::new(),
        nonce: seq,
        gas: 21_000,
        gas_price: 1_000_000_000,
        block_number,
        block_hash: block_hash(block_number),
        transaction_index: 0,
        tx_type: 2,
        v: 0,
        r: U256::from(1u64),
        s: U256::from(1u64),
    }
}

pub fn block(number: u64, transaction_count: u32) -> BlockRecord {
    BlockRecord {
        number,
        hash: block_hash(number),
        parent_hash: block_hash(number.saturating_sub(1)),
        state_root: B256::ZERO,
        transactions_root: B256::ZERO,
        receipts_root: B256::ZERO,
        miner: addr(0xee),
        gas_limit: 30_000_000,
        gas_used: 21_000 * u64::from(transaction_count),
        base_fee_per_gas: Some(7),
        timestamp: 1_700_000_000 + number,
        transaction_count,
    }
}

/// Batch entry for transfer `seq` with explicit balances.
pub fn entry(seq: u64, amount: u64, sender_balance: u64, receiver_balance: u64) -> BatchEntry {
    let tx = transfer(seq, seq + 1, addr(0x11), addr(0x22), amount);
    BatchEntry::from_transaction(
        &tx,
        Amount::from(sender_balance),
        Amount::from(receiver_balance),
        seq,
    )
}
