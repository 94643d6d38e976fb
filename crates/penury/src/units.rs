use crate::UnitsError;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

/// Smallest step in which a product is sold, e.g. 0.5 for half kilograms.
///
/// Allocation works on integral units; a decimal quantity is worth `quantity / quantum` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Quantum(Decimal);

impl Default for Quantum {
    fn default() -> Self {
        Self(Decimal::ONE)
    }
}

impl Quantum {
    pub fn new(step: Decimal) -> Result<Self, UnitsError> {
        if step <= Decimal::ZERO {
            return Err(UnitsError::InvalidQuantum);
        }
        Ok(Self(step))
    }

    pub fn step(&self) -> Decimal {
        self.0
    }

    /// Number of whole units in `quantity`, truncated toward zero
    pub fn to_units(&self, quantity: Decimal) -> Result<i64, UnitsError> {
        if quantity < Decimal::ZERO {
            return Err(UnitsError::Negative);
        }
        quantity
            .checked_div(self.0)
            .and_then(|units| units.trunc().to_i64())
            .ok_or(UnitsError::OutOfRange)
    }

    pub fn from_units(&self, units: i64) -> Result<Decimal, UnitsError> {
        if units < 0 {
            return Err(UnitsError::Negative);
        }
        Decimal::from(units)
            .checked_mul(self.0)
            .map(|q| q.normalize())
            .ok_or(UnitsError::OutOfRange)
    }
}

impl TryFrom<Decimal> for Quantum {
    type Error = UnitsError;

    fn try_from(step: Decimal) -> Result<Self, Self::Error> {
        Self::new(step)
    }
}

impl From<Quantum> for Decimal {
    fn from(quantum: Quantum) -> Self {
        quantum.0
    }
}
