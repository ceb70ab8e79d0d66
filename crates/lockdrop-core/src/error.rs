use std::fmt;

use thiserror::Error;

use crate::types::{Timestamp, Wei};

/// Coarse failure category surfaced alongside every error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    CampaignClosed,
    CapacityExhausted,
    ArithmeticOverflow,
    StateConflict,
    LogIntegrityFault,
    Storage,
    Aborted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::CampaignClosed => "campaign_closed",
            ErrorKind::CapacityExhausted => "capacity_exhausted",
            ErrorKind::ArithmeticOverflow => "arithmetic_overflow",
            ErrorKind::StateConflict => "state_conflict",
            ErrorKind::LogIntegrityFault => "log_integrity_fault",
            ErrorKind::Storage => "storage",
            ErrorKind::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum LockdropError {
    // ── Input validation ─────────────────────────────────────────────────────
    #[error("value must be greater than zero")]
    ZeroValue,

    #[error("lock duration of {days} days is below the minimum of {min} days")]
    DurationTooShort { days: u64, min: u64 },

    #[error("campaign lock period must be at least one day")]
    ZeroLockPeriod,

    #[error("token capacity must be greater than zero")]
    ZeroCapacity,

    #[error("token price must be greater than zero")]
    ZeroPrice,

    #[error("invalid {what}: {reason}")]
    InvalidEncoding { what: &'static str, reason: String },

    // ── Campaign window ──────────────────────────────────────────────────────
    #[error("campaign ended at {ending}; deposits and cancellations are closed")]
    CampaignEnded { ending: Timestamp },

    #[error("campaign still running until {ending}; withdrawals open after it ends")]
    CampaignNotEnded { ending: Timestamp },

    // ── Capacity ─────────────────────────────────────────────────────────────
    #[error("deposit too small: effective amount {effective} buys no tokens at price {price}")]
    DepositTooSmall { effective: Wei, price: Wei },

    #[error("insufficient capacity: requested {requested} tokens, {remaining} remaining")]
    CapacityExceeded { requested: Wei, remaining: Wei },

    // ── Arithmetic ───────────────────────────────────────────────────────────
    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),

    // ── Lock state ───────────────────────────────────────────────────────────
    #[error("no lock at index {index} for account {account}")]
    LockNotFound { account: String, index: u64 },

    #[error("lock {index} of account {account} is no longer active")]
    LockInactive { account: String, index: u64 },

    #[error("no matured active locks to withdraw for account {0}")]
    NothingToWithdraw(String),

    #[error("releasing {units} tokens would exceed total capacity {total}")]
    CapacityOverRelease { units: Wei, total: Wei },

    // ── Event log integrity ──────────────────────────────────────────────────
    #[error("duplicate deposit key {key} (sender {sender}, lock index {index})")]
    DuplicateDeposit { key: String, sender: String, index: u64 },

    #[error("unlock of sender {sender} lock index {index} has no prior deposit")]
    OrphanUnlock { sender: String, index: u64 },

    #[error("lock index {index} of sender {sender} was unlocked more than once")]
    RepeatedUnlock { sender: String, index: u64 },

    #[error("replay aborted by caller after {processed} events")]
    Aborted { processed: u64 },

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("no campaign has been initialised in this data directory")]
    NoCampaign,

    #[error("a campaign is already initialised in this data directory")]
    CampaignExists,
}

impl LockdropError {
    pub fn kind(&self) -> ErrorKind {
        use LockdropError::*;
        match self {
            ZeroValue
            | DurationTooShort { .. }
            | ZeroLockPeriod
            | ZeroCapacity
            | ZeroPrice
            | InvalidEncoding { .. } => ErrorKind::InvalidInput,
            CampaignEnded { .. } | CampaignNotEnded { .. } => ErrorKind::CampaignClosed,
            DepositTooSmall { .. } | CapacityExceeded { .. } => ErrorKind::CapacityExhausted,
            Overflow(_) => ErrorKind::ArithmeticOverflow,
            LockNotFound { .. }
            | LockInactive { .. }
            | NothingToWithdraw(_)
            | CapacityOverRelease { .. }
            | NoCampaign
            | CampaignExists => ErrorKind::StateConflict,
            DuplicateDeposit { .. } | OrphanUnlock { .. } | RepeatedUnlock { .. } => {
                ErrorKind::LogIntegrityFault
            }
            Aborted { .. } => ErrorKind::Aborted,
            Serialization(_) | Storage(_) => ErrorKind::Storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_failure_categories() {
        assert_eq!(LockdropError::ZeroValue.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            LockdropError::CampaignEnded { ending: 1 }.kind(),
            ErrorKind::CampaignClosed
        );
        assert_eq!(
            LockdropError::Overflow("bonus").kind(),
            ErrorKind::ArithmeticOverflow
        );
        assert_eq!(
            LockdropError::OrphanUnlock { sender: "0x00".into(), index: 0 }.kind(),
            ErrorKind::LogIntegrityFault
        );
    }

    #[test]
    fn kind_display_is_snake_case() {
        assert_eq!(ErrorKind::CapacityExhausted.to_string(), "capacity_exhausted");
        assert_eq!(ErrorKind::LogIntegrityFault.to_string(), "log_integrity_fault");
    }
}
