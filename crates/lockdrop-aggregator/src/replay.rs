//! Event-log replay.
//!
//! 1. Deposits, in log order, are keyed by `deposit_key(sender, lock_index)`.
//! 2. Unlocks, in log order, zero the deposit they name.
//! 3. Surviving deposits are folded per receiver with unbounded addition.
//! 4. Receivers are listed by the log position of their first surviving deposit.
//!
//! Any integrity fault aborts the whole run; a partial table is never returned.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lockdrop_core::error::LockdropError;
use lockdrop_core::source::EventSource;
use lockdrop_core::types::{AccountId, LockIndex, ReceiverKey, Wei};
use lockdrop_crypto::{deposit_key, DepositKey};
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{debug, info, warn};

use crate::table::BalanceTable;

struct DepositEntry {
    receiver: ReceiverKey,
    tokens: BigUint,
    cancelled: bool,
}

fn to_biguint(value: Wei) -> BigUint {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    BigUint::from_bytes_be(&buf)
}

/// Rebuilds the final balance table from an [`EventSource`].
///
/// Holds no cursor: every `reconstruct` call scans the source from genesis.
#[derive(Clone, Debug, Default)]
pub struct Aggregator {
    abort: Option<Arc<AtomicBool>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `flag` before every event; once set, the scan stops with
    /// `LockdropError::Aborted`.
    pub fn with_abort_flag(flag: Arc<AtomicBool>) -> Self {
        Self { abort: Some(flag) }
    }

    fn check_abort(&self, processed: u64) -> Result<(), LockdropError> {
        match &self.abort {
            Some(flag) if flag.load(Ordering::Relaxed) => {
                warn!(processed, "replay aborted");
                Err(LockdropError::Aborted { processed })
            }
            _ => Ok(()),
        }
    }

    pub fn reconstruct<S>(&self, source: &S) -> Result<BalanceTable, LockdropError>
    where
        S: EventSource + ?Sized,
    {
        let mut entries: Vec<DepositEntry> = Vec::new();
        let mut by_key: HashMap<DepositKey, usize> = HashMap::new();
        let mut processed = 0u64;

        // ── 1. Deposits ───────────────────────────────────────────────────────
        for item in source.deposits() {
            self.check_abort(processed)?;
            let deposit = item?;
            let key = deposit_key(&deposit.sender, deposit.lock_index);
            if by_key.contains_key(&key) {
                warn!(%key, sender = %deposit.sender, lock_index = deposit.lock_index, "duplicate deposit");
                return Err(LockdropError::DuplicateDeposit {
                    key: key.to_hex(),
                    sender: deposit.sender.to_hex(),
                    index: deposit.lock_index,
                });
            }
            by_key.insert(key, entries.len());
            entries.push(DepositEntry {
                receiver: deposit.receiver,
                tokens: to_biguint(deposit.num_of_tokens),
                cancelled: false,
            });
            processed += 1;
        }
        let deposits = entries.len();

        // ── 2. Unlocks ────────────────────────────────────────────────────────
        let mut unlocks = 0usize;
        for item in source.unlocks() {
            self.check_abort(processed)?;
            let unlock = item?;
            let key = deposit_key(&unlock.sender, unlock.lock_index);
            let entry = by_key
                .get(&key)
                .map(|&i| &mut entries[i])
                .ok_or_else(|| orphan(&unlock.sender, unlock.lock_index))?;
            if entry.cancelled {
                warn!(sender = %unlock.sender, lock_index = unlock.lock_index, "repeated unlock");
                return Err(LockdropError::RepeatedUnlock {
                    sender: unlock.sender.to_hex(),
                    index: unlock.lock_index,
                });
            }
            entry.tokens = BigUint::zero();
            entry.cancelled = true;
            unlocks += 1;
            processed += 1;
        }

        // ── 3 & 4. Fold per receiver, first surviving deposit fixes order ─────
        let mut totals: HashMap<ReceiverKey, BigUint> = HashMap::new();
        let mut order: Vec<ReceiverKey> = Vec::new();
        for entry in entries.iter().filter(|e| !e.tokens.is_zero()) {
            match totals.get_mut(&entry.receiver) {
                Some(total) => *total += &entry.tokens,
                None => {
                    totals.insert(entry.receiver, entry.tokens.clone());
                    order.push(entry.receiver);
                }
            }
        }
        let ordered: Vec<(ReceiverKey, BigUint)> = order
            .into_iter()
            .filter_map(|k| totals.get(&k).map(|v| (k, v.clone())))
            .collect();

        debug!(entries = entries.len(), "deposit entries folded");
        info!(deposits, unlocks, receivers = ordered.len(), "event log replayed");
        Ok(BalanceTable { totals, ordered })
    }
}

fn orphan(sender: &AccountId, index: LockIndex) -> LockdropError {
    warn!(%sender, lock_index = index, "unlock without prior deposit");
    LockdropError::OrphanUnlock {
        sender: sender.to_hex(),
        index,
    }
}
