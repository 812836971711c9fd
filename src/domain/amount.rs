use crate::error::PayoutError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A positive monetary amount in the service's single payout currency.
///
/// This is a wrapper around `rust_decimal::Decimal` so that a zero or negative
/// withdrawal, or one finer than a cent, can never reach the ledger or the
/// payout provider. What the ledger records is exactly what gets paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const MAX_SCALE: u32 = 2;

    pub fn new(value: Decimal) -> Result<Self, PayoutError> {
        if value <= Decimal::ZERO {
            return Err(PayoutError::InvalidRequest(
                "Amount must be positive".to_string(),
            ));
        }
        // 1.50 and 1.500 are the same amount; 1.505 is not payable.
        if value.normalize().scale() > Self::MAX_SCALE {
            return Err(PayoutError::InvalidRequest(format!(
                "Amount must not have more than {} decimal places",
                Self::MAX_SCALE
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PayoutError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // PayPal wants two fractional digits ("5.00", not "5").
        write!(f, "{:.2}", self.0)
    }
}
