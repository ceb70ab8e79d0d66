use serde::{Deserialize, Serialize};

use crate::error::LockdropError;
use crate::types::{wei_serde, Wei};

/// Construction-time campaign parameters.
///
/// Loaded from JSON by the CLI; amounts are decimal strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignParams {
    /// Length of the deposit window in days.
    pub lock_period_days: u64,
    /// Total number of token units allocatable over the whole campaign.
    #[serde(with = "wei_serde")]
    pub token_capacity: Wei,
    /// Price of one token unit in wei.
    #[serde(with = "wei_serde")]
    pub token_price: Wei,
}

impl CampaignParams {
    pub fn validate(&self) -> Result<(), LockdropError> {
        if self.lock_period_days == 0 {
            return Err(LockdropError::ZeroLockPeriod);
        }
        if self.token_capacity.is_zero() {
            return Err(LockdropError::ZeroCapacity);
        }
        if self.token_price.is_zero() {
            return Err(LockdropError::ZeroPrice);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn zero_price_rejected() {
        let p = CampaignParams {
            lock_period_days: 1,
            token_capacity: Wei::from(100u64),
            token_price: Wei::zero(),
        };
        assert_eq!(p.validate().unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn params_json_uses_decimal_strings() {
        let p: CampaignParams = serde_json::from_str(
            r#"{"lock_period_days": 14, "token_capacity": "1000000", "token_price": "1"}"#,
        )
        .unwrap();
        assert_eq!(p.token_capacity, Wei::from(1_000_000u64));
        assert!(p.validate().is_ok());
    }
}
