//! Value objects for payout computation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fee rate value object: a fraction of the base price in [0, 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeRate(Decimal);

impl FeeRate {
    pub fn new(value: Decimal) -> Result<Self, FeeRateError> {
        if value.is_sign_negative() {
            return Err(FeeRateError::Negative);
        }
        if value >= Decimal::ONE {
            return Err(FeeRateError::NotAFraction);
        }
        Ok(Self(value))
    }

    /// Platform commission default: 15% of base price.
    pub fn platform_default() -> Self {
        Self(Decimal::new(15, 2))
    }

    /// Payment gateway default: 3% of base price.
    pub fn payment_gateway_default() -> Self {
        Self(Decimal::new(3, 2))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum FeeRateError {
    Negative,
    NotAFraction,
}
impl std::error::Error for FeeRateError {}
impl fmt::Display for FeeRateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negative => write!(f, "Fee rate cannot be negative"),
            Self::NotAFraction => write!(f, "Fee rate must be below 1"),
        }
    }
}
