//! Borsh encoding for the alloy types embedded in chain records.

use std::io::{self, Read, Write};

use alloy_primitives::{Address, Bytes, B256, U256};
use borsh::{BorshDeserialize, BorshSerialize};

pub(crate) fn write_address<W: Write>(addr: &Address, writer: &mut W) -> io::Result<()> {
    writer.write_all(addr.as_slice())
}

pub(crate) fn read_address<R: Read>(reader: &mut R) -> io::Result<Address> {
    let mut buf = [0u8; 20];
    reader.read_exact(&mut buf)?;
    Ok(Address::new(buf))
}

pub(crate) fn write_b256<W: Write>(hash: &B256, writer: &mut W) -> io::Result<()> {
    writer.write_all(hash.as_slice())
}

pub(crate) fn read_b256<R: Read>(reader: &mut R) -> io::Result<B256> {
    let mut buf = [0u8; 32];
    reader.read_exact(&mut buf)?;
    Ok(B256::new(buf))
}

pub(crate) fn write_u256<W: Write>(value: &U256, writer: &mut W) -> io::Result<()> {
    writer.write_all(&value.to_be_bytes::<32>())
}

pub(crate) fn read_u256<R: Read>(reader: &mut R) -> io::Result<U256> {
    let mut buf = [0u8; 32];
    reader.read_exact(&mut buf)?;
    Ok(U256::from_be_bytes(buf))
}

pub(crate) fn write_bytes<W: Write>(bytes: &Bytes, writer: &mut W) -> io::Result<()> {
    BorshSerialize::serialize(&bytes.to_vec(), writer)
}

pub(crate) fn read_bytes<R: Read>(reader: &mut R) -> io::Result<Bytes> {
    let raw: Vec<u8> = BorshDeserialize::deserialize_reader(reader)?;
    Ok(Bytes::from(raw))
}
