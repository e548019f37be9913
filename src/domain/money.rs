use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

use crate::domain::Error;

/// A non-negative monetary amount held at four decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);
    pub const TARGET_DECIMALS: u32 = 4;

    /// Rounds half to even at `TARGET_DECIMALS`. Negative values are rejected.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(Error::InvalidAmount(format!("{} is negative", value)));
        }
        Ok(Self::rounded(value))
    }

    /// Rounds toward zero. Negative values collapse to zero.
    pub fn truncated(value: Decimal) -> Self {
        if value.is_sign_negative() {
            return Self::ZERO;
        }
        Self(value.round_dp_with_strategy(Self::TARGET_DECIMALS, RoundingStrategy::ToZero))
    }

    fn rounded(value: Decimal) -> Self {
        let mut v = value.round_dp(Self::TARGET_DECIMALS);
        // -0 and 0 must compare and hash the same
        v.set_sign_positive(true);
        Self(v)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.0.is_zero()
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// `None` when the result would be negative.
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        if other.0 > self.0 {
            return None;
        }
        Some(Amount(self.0 - other.0))
    }

    pub fn checked_sum<I>(amounts: I) -> Result<Amount, Error>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts.into_iter().try_fold(Amount::ZERO, |total, amount| {
            total
                .checked_add(amount)
                .ok_or_else(|| Error::InvalidAmount(format!("total overflows after {}", total)))
        })
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| Error::InvalidAmount(format!("{}: {}", s, e)))?;
        Amount::new(value)
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
