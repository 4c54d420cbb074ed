use std::{
    fmt,
    io::{self, Read, Write},
    str::FromStr,
};

use alloy_primitives::U256;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::AmountParseError;

/// Unsigned 256-bit token quantity.
///
/// Decimal strings are the canonical external form. Borsh stores it as 32 big-endian bytes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(U256);

impl Amount {
    pub const ZERO: Self = Self(U256::ZERO);

    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn from_u128(value: u128) -> Self {
        Self(U256::from(value))
    }

    pub fn inner(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountParseError(s.to_owned()));
        }
        U256::from_str_radix(s, 10)
            .map(Self)
            .map_err(|_| AmountParseError(s.to_owned()))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize<'_>>::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl BorshSerialize for Amount {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.0.to_be_bytes::<32>())
    }
}

impl BorshDeserialize for Amount {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; 32];
        reader.read_exact(&mut buf)?;
        Ok(Self(U256::from_be_bytes(buf)))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_parse_rejects_non_decimal() {
        assert!("".parse::<Amount>().is_err());
        assert!("0x10".parse::<Amount>().is_err());
        assert!("-5".parse::<Amount>().is_err());
        assert!("12a".parse::<Amount>().is_err());
    }

    #[test]
    fn test_numeric_not_lexicographic_ordering() {
        let small: Amount = "9".parse().unwrap();
        let large: Amount = "10".parse().unwrap();
        assert!(small < large);
    }

    #[test]
    fn test_json_is_decimal_string() {
        let amount: Amount = "1000000000000000000000".parse().unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"1000000000000000000000\"");
    }

    proptest! {
        #[test]
        fn proptest_decimal_string_preserves_value(value in any::<u128>()) {
            let amount = Amount::from_u128(value);
            let parsed: Amount = amount.to_string().parse().unwrap();
            prop_assert_eq!(parsed, amount);
            prop_assert_eq!(amount.to_string(), value.to_string());
        }

        #[test]
        fn proptest_borsh_is_fixed_width(value in any::<u128>()) {
            let bytes = borsh::to_vec(&Amount::from_u128(value)).unwrap();
            prop_assert_eq!(bytes.len(), 32);
        }
    }
}
