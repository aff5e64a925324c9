//! Arbitrary-precision token amounts

use bigdecimal::num_bigint::{BigInt, Sign};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error("balance must not be negative: {0}")]
    Negative(String),

    #[error("balance is not a base-10 integer: {0:?}")]
    NotAnInteger(String),
}

/// Non-negative integer amount of any size.
///
/// Crosses the storage and wire boundaries as a base-10 string.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Balance(BigInt);

impl Balance {
    pub fn new(value: BigInt) -> Result<Self, BalanceError> {
        if value.sign() == Sign::Minus {
            return Err(BalanceError::Negative(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(BigInt::from(value))
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    pub fn into_bigint(self) -> BigInt {
        self.0
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Balance {
    type Err = BalanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('-') {
            return Err(BalanceError::Negative(s.to_string()));
        }
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BalanceError::NotAnInteger(s.to_string()));
        }
        BigInt::from_str(s)
            .map(Self)
            .map_err(|_| BalanceError::NotAnInteger(s.to_string()))
    }
}

impl From<u64> for Balance {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl Serialize for Balance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Balance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
