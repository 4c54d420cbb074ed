//! ECDSA authorization carried from the execution layer into a pod.

use std::io::{self, Read, Write};

use alloy_primitives::U256;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::borsh_helpers::{read_u256, write_u256};

/// Order of the secp256k1 group.
pub const SECP256K1_ORDER: U256 = U256::from_limbs([
    0xbfd2_5e8c_d036_4141,
    0xbaae_dce6_af48_a03b,
    0xffff_ffff_ffff_fffe,
    0xffff_ffff_ffff_ffff,
]);

/// Signature components of a transaction, as reported by the execution client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

impl Signature {
    pub const fn new(v: u64, r: U256, s: U256) -> Self {
        Self { v, r, s }
    }

    /// Whether both scalars lie in `[1, n)`. An unsigned transaction carries zeros here.
    pub fn has_valid_scalars(&self) -> bool {
        in_scalar_range(&self.r) && in_scalar_range(&self.s)
    }
}

fn in_scalar_range(value: &U256) -> bool {
    !value.is_zero() && *value < SECP256K1_ORDER
}

impl BorshSerialize for Signature {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        BorshSerialize::serialize(&self.v, writer)?;
        write_u256(&self.r, writer)?;
        write_u256(&self.s, writer)
    }
}

impl BorshDeserialize for Signature {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            v: BorshDeserialize::deserialize_reader(reader)?,
            r: read_u256(reader)?,
            s: read_u256(reader)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_bounds() {
        assert!(Signature::new(27, U256::from(1u64), U256::from(1u64)).has_valid_scalars());
        assert!(!Signature::default().has_valid_scalars());
        assert!(!Signature::new(27, U256::from(5u64), U256::ZERO).has_valid_scalars());

        let at_order = Signature::new(0, SECP256K1_ORDER, U256::from(1u64));
        assert!(!at_order.has_valid_scalars());
        let below_order = Signature::new(0, SECP256K1_ORDER - U256::from(1u64), U256::from(9u64));
        assert!(below_order.has_valid_scalars());
    }

    #[test]
    fn test_order_matches_curve_constant() {
        let expected: U256 = "0xfffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
            .parse()
            .unwrap();
        assert_eq!(SECP256K1_ORDER, expected);
    }
}
