use lockdrop_core::error::LockdropError;
use lockdrop_core::types::{wei_serde, Wei};
use serde::{Deserialize, Serialize};

/// Remaining allocatable token supply.
///
/// `remaining` only moves between zero and `total`: `allocate` consumes,
/// `release` returns what a cancelled lock had consumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityLedger {
    #[serde(with = "wei_serde")]
    total: Wei,
    #[serde(with = "wei_serde")]
    remaining: Wei,
}

impl CapacityLedger {
    pub fn new(total: Wei) -> Result<Self, LockdropError> {
        if total.is_zero() {
            return Err(LockdropError::ZeroCapacity);
        }
        Ok(Self { total, remaining: total })
    }

    pub fn total(&self) -> Wei {
        self.total
    }

    pub fn remaining(&self) -> Wei {
        self.remaining
    }

    pub fn allocated(&self) -> Wei {
        self.total - self.remaining
    }

    /// Number of whole tokens `effective` buys at `price`, checked against
    /// what is left. Does not mutate.
    pub fn quote(&self, effective: Wei, price: Wei) -> Result<Wei, LockdropError> {
        if price.is_zero() {
            return Err(LockdropError::ZeroPrice);
        }
        let units = effective / price;
        if units.is_zero() {
            return Err(LockdropError::DepositTooSmall { effective, price });
        }
        if units > self.remaining {
            return Err(LockdropError::CapacityExceeded {
                requested: units,
                remaining: self.remaining,
            });
        }
        Ok(units)
    }

    /// Quote and consume. On error the ledger is unchanged.
    pub fn allocate(&mut self, effective: Wei, price: Wei) -> Result<Wei, LockdropError> {
        let units = self.quote(effective, price)?;
        self.remaining -= units;
        Ok(units)
    }

    /// Return `units` to the pool. Never lifts `remaining` above `total`.
    pub fn release(&mut self, units: Wei) -> Result<(), LockdropError> {
        let restored = self
            .remaining
            .checked_add(units)
            .ok_or(LockdropError::Overflow("released capacity"))?;
        if restored > self.total {
            return Err(LockdropError::CapacityOverRelease {
                units,
                total: self.total,
            });
        }
        self.remaining = restored;
        Ok(())
    }
}
