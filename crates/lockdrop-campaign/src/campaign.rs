use std::collections::HashMap;

use lockdrop_core::constants::{MIN_LOCK_DAYS, SECONDS_PER_DAY};
use lockdrop_core::error::LockdropError;
use lockdrop_core::event::{DepositEvent, LockdropEvent, UnlockEvent};
use lockdrop_core::params::CampaignParams;
use lockdrop_core::types::{wei_serde, AccountId, LockIndex, ReceiverKey, Timestamp, Wei};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bonus::{effective_amount, is_accepted_duration};
use crate::capacity::CapacityLedger;
use crate::clock::CampaignClock;

// ── Lock records ──────────────────────────────────────────────────────────────

/// Lifecycle of one lock. `Active` is the only state carrying amounts; the
/// other two are terminal and read as zero everywhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockStatus {
    Active {
        #[serde(with = "wei_serde")]
        value: Wei,
        #[serde(with = "wei_serde")]
        token_amount: Wei,
        lock_end: Timestamp,
    },
    /// Cancelled by the owner while the campaign was running.
    Cancelled { at: Timestamp },
    /// Matured and claimed after the campaign ended.
    Redeemed { at: Timestamp },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub owner: AccountId,
    pub index: LockIndex,
    pub receiver: ReceiverKey,
    pub duration_days: u64,
    pub created_at: Timestamp,
    pub status: LockStatus,
}

impl LockRecord {
    pub fn is_active(&self) -> bool {
        matches!(self.status, LockStatus::Active { .. })
    }

    pub fn value(&self) -> Wei {
        match self.status {
            LockStatus::Active { value, .. } => value,
            _ => Wei::zero(),
        }
    }

    pub fn token_amount(&self) -> Wei {
        match self.status {
            LockStatus::Active { token_amount, .. } => token_amount,
            _ => Wei::zero(),
        }
    }

    pub fn lock_end(&self) -> Timestamp {
        match self.status {
            LockStatus::Active { lock_end, .. } => lock_end,
            _ => 0,
        }
    }

    /// Active and past its lock end.
    pub fn is_matured(&self, now: Timestamp) -> bool {
        match self.status {
            LockStatus::Active { lock_end, .. } => lock_end <= now,
            _ => false,
        }
    }
}

// ── Receipts ──────────────────────────────────────────────────────────────────

/// Outcome of a successful `unlock`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnlockReceipt {
    pub event: UnlockEvent,
    /// Locked value handed back to the caller.
    pub refund: Wei,
    /// Tokens returned to the capacity pool.
    pub released_tokens: Wei,
}

/// Outcome of a successful `withdraw`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawReceipt {
    pub account: AccountId,
    /// Tokens paid out across all matured locks.
    pub tokens: Wei,
    /// Locked value returned alongside the tokens.
    pub value: Wei,
    /// Indices of the locks that were redeemed.
    pub indices: Vec<LockIndex>,
}

// ── Campaign ──────────────────────────────────────────────────────────────────

/// The lock-drop campaign aggregate.
///
/// Owns the capacity ledger and every account's lock list. Each transition is
/// all-or-nothing: every precondition and every checked computation runs
/// before the first field is written.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Campaign {
    pub beginning: Timestamp,
    pub ending: Timestamp,
    pub lock_period_days: u64,
    #[serde(with = "wei_serde")]
    pub token_price: Wei,
    capacity: CapacityLedger,
    /// Value currently held in active locks.
    #[serde(with = "wei_serde")]
    balance: Wei,
    /// Accounts in order of their first lock.
    participants: Vec<AccountId>,
    locks: HashMap<AccountId, Vec<LockRecord>>,
    /// Events emitted since this instance was built or last drained.
    #[serde(skip)]
    events: Vec<LockdropEvent>,
}

fn days_to_secs(days: u64) -> Option<i64> {
    i64::try_from(days).ok()?.checked_mul(SECONDS_PER_DAY)
}

impl Campaign {
    /// Open a campaign at the clock's current time.
    pub fn new(params: &CampaignParams, clock: &dyn CampaignClock) -> Result<Self, LockdropError> {
        params.validate()?;
        let beginning = clock.now();
        let ending = days_to_secs(params.lock_period_days)
            .and_then(|secs| beginning.checked_add(secs))
            .ok_or(LockdropError::Overflow("campaign ending"))?;
        let capacity = CapacityLedger::new(params.token_capacity)?;

        info!(
            beginning,
            ending,
            capacity = %params.token_capacity,
            price = %params.token_price,
            "campaign opened"
        );

        Ok(Self {
            beginning,
            ending,
            lock_period_days: params.lock_period_days,
            token_price: params.token_price,
            capacity,
            balance: Wei::zero(),
            participants: Vec::new(),
            locks: HashMap::new(),
            events: Vec::new(),
        })
    }

    // ── Window ────────────────────────────────────────────────────────────────

    pub fn has_ended(&self, now: Timestamp) -> bool {
        now >= self.ending
    }

    /// Seconds until the deposit window closes (0 once ended).
    pub fn time_remaining(&self, now: Timestamp) -> i64 {
        self.ending.saturating_sub(now).max(0)
    }

    fn ensure_open(&self, now: Timestamp) -> Result<(), LockdropError> {
        if self.has_ended(now) {
            return Err(LockdropError::CampaignEnded { ending: self.ending });
        }
        Ok(())
    }

    // ── Transitions ───────────────────────────────────────────────────────────

    /// Lock `value` for `duration_days`, crediting the allocation to `receiver`.
    pub fn lock(
        &mut self,
        caller: &AccountId,
        duration_days: u64,
        receiver: ReceiverKey,
        value: Wei,
        clock: &dyn CampaignClock,
    ) -> Result<DepositEvent, LockdropError> {
        let now = clock.now();
        self.ensure_open(now)?;
        if value.is_zero() {
            return Err(LockdropError::ZeroValue);
        }
        if !is_accepted_duration(duration_days) {
            return Err(LockdropError::DurationTooShort {
                days: duration_days,
                min: MIN_LOCK_DAYS,
            });
        }

        let effective = effective_amount(value, duration_days)?;
        let lock_end = days_to_secs(duration_days)
            .and_then(|secs| self.ending.checked_add(secs))
            .ok_or(LockdropError::Overflow("lock end"))?;
        let balance = self
            .balance
            .checked_add(value)
            .ok_or(LockdropError::Overflow("campaign balance"))?;

        // Last fallible step; it leaves the ledger untouched on error.
        let token_amount = self.capacity.allocate(effective, self.token_price)?;

        // ── Commit ────────────────────────────────────────────────────────────
        self.balance = balance;
        if !self.locks.contains_key(caller) {
            self.participants.push(*caller);
        }
        let records = self.locks.entry(*caller).or_default();
        let lock_index = records.len() as LockIndex;
        records.push(LockRecord {
            owner: *caller,
            index: lock_index,
            receiver,
            duration_days,
            created_at: now,
            status: LockStatus::Active { value, token_amount, lock_end },
        });

        let event = DepositEvent {
            sender: *caller,
            receiver,
            lock_index,
            num_of_tokens: token_amount,
        };
        self.events.push(LockdropEvent::Deposit(event.clone()));

        info!(
            sender = %caller,
            receiver = %receiver,
            lock_index,
            duration_days,
            value = %value,
            tokens = %token_amount,
            remaining = %self.capacity.remaining(),
            "lock created"
        );
        Ok(event)
    }

    /// Cancel an active lock while the campaign is still open.
    pub fn unlock(
        &mut self,
        caller: &AccountId,
        lock_index: LockIndex,
        clock: &dyn CampaignClock,
    ) -> Result<UnlockReceipt, LockdropError> {
        let now = clock.now();
        self.ensure_open(now)?;

        let not_found = || LockdropError::LockNotFound {
            account: caller.to_hex(),
            index: lock_index,
        };
        let record = self
            .locks
            .get_mut(caller)
            .and_then(|records| usize::try_from(lock_index).ok().and_then(|i| records.get_mut(i)))
            .ok_or_else(not_found)?;

        let (value, token_amount) = match record.status {
            LockStatus::Active { value, token_amount, .. } => (value, token_amount),
            _ => {
                return Err(LockdropError::LockInactive {
                    account: caller.to_hex(),
                    index: lock_index,
                })
            }
        };
        let balance = self
            .balance
            .checked_sub(value)
            .ok_or(LockdropError::Overflow("campaign balance"))?;
        self.capacity.release(token_amount)?;

        // ── Commit ────────────────────────────────────────────────────────────
        self.balance = balance;
        record.status = LockStatus::Cancelled { at: now };

        let event = UnlockEvent { sender: *caller, lock_index };
        self.events.push(LockdropEvent::Unlock(event.clone()));

        info!(
            sender = %caller,
            lock_index,
            refund = %value,
            released = %token_amount,
            "lock cancelled"
        );
        Ok(UnlockReceipt {
            event,
            refund: value,
            released_tokens: token_amount,
        })
    }

    /// Redeem every matured active lock of `caller` once the campaign has ended.
    pub fn withdraw(
        &mut self,
        caller: &AccountId,
        clock: &dyn CampaignClock,
    ) -> Result<WithdrawReceipt, LockdropError> {
        let now = clock.now();
        if !self.has_ended(now) {
            return Err(LockdropError::CampaignNotEnded { ending: self.ending });
        }

        let nothing = || LockdropError::NothingToWithdraw(caller.to_hex());
        let records = self.locks.get_mut(caller).ok_or_else(nothing)?;
        let matured: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_matured(now))
            .map(|(i, _)| i)
            .collect();
        if matured.is_empty() {
            return Err(nothing());
        }

        let mut tokens = Wei::zero();
        let mut value = Wei::zero();
        for &i in &matured {
            tokens = tokens
                .checked_add(records[i].token_amount())
                .ok_or(LockdropError::Overflow("withdrawn tokens"))?;
            value = value
                .checked_add(records[i].value())
                .ok_or(LockdropError::Overflow("withdrawn value"))?;
        }
        let balance = self
            .balance
            .checked_sub(value)
            .ok_or(LockdropError::Overflow("campaign balance"))?;

        // ── Commit ────────────────────────────────────────────────────────────
        self.balance = balance;
        for &i in &matured {
            records[i].status = LockStatus::Redeemed { at: now };
            debug!(account = %caller, lock_index = i, "lock redeemed");
        }

        let indices: Vec<LockIndex> = matured.iter().map(|&i| i as LockIndex).collect();
        info!(
            account = %caller,
            locks = indices.len(),
            tokens = %tokens,
            value = %value,
            "matured locks withdrawn"
        );
        Ok(WithdrawReceipt {
            account: *caller,
            tokens,
            value,
            indices,
        })
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    pub fn capacity(&self) -> &CapacityLedger {
        &self.capacity
    }

    pub fn remaining_capacity(&self) -> Wei {
        self.capacity.remaining()
    }

    /// Value currently held in active locks.
    pub fn balance(&self) -> Wei {
        self.balance
    }

    pub fn participants(&self) -> &[AccountId] {
        &self.participants
    }

    /// Every lock `account` ever created, in index order.
    pub fn locks_for(&self, account: &AccountId) -> &[LockRecord] {
        self.locks.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn record(&self, account: &AccountId, lock_index: LockIndex) -> Option<&LockRecord> {
        let i = usize::try_from(lock_index).ok()?;
        self.locks.get(account)?.get(i)
    }

    /// Events emitted since this instance was built or last drained.
    pub fn events(&self) -> &[LockdropEvent] {
        &self.events
    }

    /// Hand the pending events to a persistence layer.
    pub fn take_events(&mut self) -> Vec<LockdropEvent> {
        std::mem::take(&mut self.events)
    }
}
