/// ─── Lock-drop Protocol Constants ───────────────────────────────────────────
///
/// Bonus rates are 18-decimal fixed point: 1e18 == 100%.

// ── Time ─────────────────────────────────────────────────────────────────────

/// Seconds in one campaign day.
pub const SECONDS_PER_DAY: i64 = 86_400;

// ── Lock durations ───────────────────────────────────────────────────────────

/// Shortest accepted lock duration (days). Anything below is rejected by `lock`.
pub const MIN_LOCK_DAYS: u64 = 91;

// ── Bonus curve ──────────────────────────────────────────────────────────────

/// Fixed-point scale for bonus rates (18 fractional digits).
pub const BONUS_RATE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Bonus tiers as `(inclusive lower bound in days, rate)`, ascending.
///
/// The top tier is a flat cap: no further bonus accrues past 728 days.
pub const BONUS_TIERS: [(u64, u128); 5] = [
    (91, 0),
    (182, 37_500_000_000_000_000),  // 3.75%
    (364, 75_000_000_000_000_000),  // 7.5%
    (546, 112_500_000_000_000_000), // 11.25%
    (728, 150_000_000_000_000_000), // 15%
];
