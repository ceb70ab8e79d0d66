//! Duration bonus curve.
//!
//! Tiers (inclusive lower bound, days → bonus):
//!
//!   [ 91, 182) →  0%
//!   [182, 364) →  3.75%
//!   [364, 546) →  7.5%
//!   [546, 728) → 11.25%
//!   [728,   ∞) → 15%   (flat cap)
//!
//! effective = amount + floor(amount × rate / 1e18), exact 256-bit integer math.

use lockdrop_core::constants::{BONUS_RATE_SCALE, BONUS_TIERS, MIN_LOCK_DAYS};
use lockdrop_core::error::LockdropError;
use lockdrop_core::types::Wei;

/// Bonus rate for a lock of `duration_days`, 18-decimal fixed point.
///
/// Durations below the first tier return zero; rejecting them is the
/// caller's job (see [`is_accepted_duration`]).
pub fn bonus_rate(duration_days: u64) -> Wei {
    BONUS_TIERS
        .iter()
        .rev()
        .find(|(lower, _)| duration_days >= *lower)
        .map(|(_, rate)| Wei::from(*rate))
        .unwrap_or_else(Wei::zero)
}

/// True if `lock` accepts this duration.
pub fn is_accepted_duration(duration_days: u64) -> bool {
    duration_days >= MIN_LOCK_DAYS
}

/// Apply the duration bonus to `amount`.
///
/// # Errors
/// `LockdropError::Overflow` if `amount × rate` does not fit in 256 bits.
pub fn effective_amount(amount: Wei, duration_days: u64) -> Result<Wei, LockdropError> {
    let rate = bonus_rate(duration_days);
    let scaled = amount
        .checked_mul(rate)
        .ok_or(LockdropError::Overflow("duration bonus"))?;
    let bonus = scaled / Wei::from(BONUS_RATE_SCALE);
    amount
        .checked_add(bonus)
        .ok_or(LockdropError::Overflow("effective amount"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockdrop_core::error::ErrorKind;

    fn ether(n: u64) -> Wei {
        Wei::from(n) * Wei::exp10(18)
    }

    #[test]
    fn tier_boundaries_belong_to_upper_tier() {
        assert_eq!(bonus_rate(91), Wei::zero());
        assert_eq!(bonus_rate(181), Wei::zero());
        assert_eq!(bonus_rate(182), Wei::from(37_500_000_000_000_000u128));
        assert_eq!(bonus_rate(363), Wei::from(37_500_000_000_000_000u128));
        assert_eq!(bonus_rate(364), Wei::from(75_000_000_000_000_000u128));
        assert_eq!(bonus_rate(546), Wei::from(112_500_000_000_000_000u128));
        assert_eq!(bonus_rate(727), Wei::from(112_500_000_000_000_000u128));
        assert_eq!(bonus_rate(728), Wei::from(150_000_000_000_000_000u128));
    }

    #[test]
    fn top_tier_is_capped() {
        assert_eq!(bonus_rate(728), bonus_rate(10_000));
        assert_eq!(
            effective_amount(ether(100), 5_000).unwrap(),
            ether(115)
        );
    }

    #[test]
    fn exact_bonus_amounts() {
        // 1 ether locked for each tier.
        assert_eq!(effective_amount(ether(1), 91).unwrap(), ether(1));
        assert_eq!(
            effective_amount(ether(1), 182).unwrap(),
            Wei::from(1_037_500_000_000_000_000u128)
        );
        assert_eq!(
            effective_amount(ether(1), 364).unwrap(),
            Wei::from(1_075_000_000_000_000_000u128)
        );
        assert_eq!(
            effective_amount(ether(1), 546).unwrap(),
            Wei::from(1_112_500_000_000_000_000u128)
        );
        assert_eq!(
            effective_amount(ether(1), 728).unwrap(),
            Wei::from(1_150_000_000_000_000_000u128)
        );
    }

    #[test]
    fn small_amounts_floor_the_bonus() {
        // 10 × 3.75% = 0.375 → floored away.
        assert_eq!(effective_amount(Wei::from(10u64), 182).unwrap(), Wei::from(10u64));
        // 100 × 15% = 15 exactly.
        assert_eq!(effective_amount(Wei::from(100u64), 728).unwrap(), Wei::from(115u64));
    }

    #[test]
    fn effective_never_below_amount_and_equal_only_below_182() {
        let amount = ether(3);
        for d in 0..1_000u64 {
            let eff = effective_amount(amount, d).unwrap();
            assert!(eff >= amount);
            assert_eq!(eff == amount, d < 182, "duration {d}");
        }
    }

    #[test]
    fn monotone_in_duration_and_amount() {
        let mut prev = Wei::zero();
        for d in 91..2_000u64 {
            let eff = effective_amount(ether(7), d).unwrap();
            assert!(eff >= prev, "duration {d} decreased the effective amount");
            prev = eff;
        }
        for d in [91u64, 182, 364, 546, 728, 900] {
            let mut prev = Wei::zero();
            for a in 0..500u64 {
                let eff = effective_amount(Wei::from(a), d).unwrap();
                assert!(eff >= prev);
                prev = eff;
            }
        }
    }

    #[test]
    fn overflow_is_reported_not_wrapped() {
        let err = effective_amount(Wei::MAX, 182).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArithmeticOverflow);
        // Zero-rate tier never multiplies past the width.
        assert_eq!(effective_amount(Wei::MAX, 91).unwrap(), Wei::MAX);
    }

    #[test]
    fn minimum_duration_gate() {
        assert!(!is_accepted_duration(0));
        assert!(!is_accepted_duration(90));
        assert!(is_accepted_duration(91));
        assert!(is_accepted_duration(100_000));
    }
}
