use lockdrop_core::error::LockdropError;
use lockdrop_core::types::{AccountId, LockIndex, ReceiverKey, Timestamp, Wei};

use crate::campaign::{Campaign, LockStatus};

/// Read-side helpers over live campaign state.
pub struct CampaignQuery<'a> {
    campaign: &'a Campaign,
}

impl<'a> CampaignQuery<'a> {
    pub fn new(campaign: &'a Campaign) -> Self {
        Self { campaign }
    }

    /// Receivers and token amounts of every lock `account` created, by index.
    /// Inactive locks report zero tokens.
    pub fn locks_for(&self, account: &AccountId) -> Vec<(ReceiverKey, Wei)> {
        self.campaign
            .locks_for(account)
            .iter()
            .map(|r| (r.receiver, r.token_amount()))
            .collect()
    }

    /// Token amounts of active locks summed per receiver, in the order each
    /// receiver first shows up while walking participants and their locks.
    ///
    /// This reads current storage; the authoritative table comes from event
    /// replay.
    pub fn live_balance_sheet(&self) -> Vec<(ReceiverKey, Wei)> {
        let mut sheet: Vec<(ReceiverKey, Wei)> = Vec::new();
        for account in self.campaign.participants() {
            for record in self.campaign.locks_for(account).iter().filter(|r| r.is_active()) {
                match sheet.iter_mut().find(|(k, _)| *k == record.receiver) {
                    Some((_, total)) => *total = total.saturating_add(record.token_amount()),
                    None => sheet.push((record.receiver, record.token_amount())),
                }
            }
        }
        sheet
    }

    /// Value `account` currently holds in active locks.
    pub fn locked_value(&self, account: &AccountId) -> Wei {
        self.campaign
            .locks_for(account)
            .iter()
            .fold(Wei::zero(), |acc, r| acc.saturating_add(r.value()))
    }

    /// Human-readable summary of one lock.
    pub fn describe(
        &self,
        account: &AccountId,
        lock_index: LockIndex,
        now: Timestamp,
    ) -> Result<String, LockdropError> {
        let r = self
            .campaign
            .record(account, lock_index)
            .ok_or_else(|| LockdropError::LockNotFound {
                account: account.to_hex(),
                index: lock_index,
            })?;

        let status_str = match &r.status {
            LockStatus::Active { value, token_amount, lock_end } => {
                let secs_remaining = lock_end.saturating_sub(now);
                if secs_remaining > 0 {
                    format!(
                        "Active, {} wei for {} tokens, matures in {} days",
                        value,
                        token_amount,
                        secs_remaining / 86_400
                    )
                } else {
                    format!("Active, {} wei for {} tokens, matured", value, token_amount)
                }
            }
            LockStatus::Cancelled { at } => format!("Cancelled at Unix timestamp {}", at),
            LockStatus::Redeemed { at } => format!("Redeemed at Unix timestamp {}", at),
        };

        Ok(format!(
            "Lock {}#{} | {} days | receiver: {} | {}",
            account, lock_index, r.duration_days, r.receiver, status_str
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{CampaignClock, ManualClock};
    use lockdrop_core::params::CampaignParams;

    fn setup() -> (ManualClock, Campaign) {
        let clock = ManualClock::new(1_000_000);
        let params = CampaignParams {
            lock_period_days: 1,
            token_capacity: Wei::from(1_000u64),
            token_price: Wei::one(),
        };
        let c = Campaign::new(&params, &clock).unwrap();
        (clock, c)
    }

    #[test]
    fn live_sheet_sums_active_locks_in_first_seen_order() {
        let (clock, mut c) = setup();
        let alice = AccountId([1; 20]);
        let bob = AccountId([2; 20]);
        let k1 = ReceiverKey([1; 32]);
        let k2 = ReceiverKey([2; 32]);
        c.lock(&alice, 91, k2, Wei::from(5u64), &clock).unwrap();
        c.lock(&bob, 91, k1, Wei::from(7u64), &clock).unwrap();
        c.lock(&alice, 91, k1, Wei::from(3u64), &clock).unwrap();
        c.lock(&bob, 91, k2, Wei::from(11u64), &clock).unwrap();
        c.unlock(&bob, 1, &clock).unwrap();

        let q = CampaignQuery::new(&c);
        assert_eq!(
            q.live_balance_sheet(),
            vec![(k2, Wei::from(5u64)), (k1, Wei::from(10u64))]
        );
        assert_eq!(
            q.locks_for(&bob),
            vec![(k1, Wei::from(7u64)), (k2, Wei::zero())]
        );
        assert_eq!(q.locked_value(&alice), Wei::from(8u64));
    }

    #[test]
    fn describe_reports_status() {
        let (clock, mut c) = setup();
        let alice = AccountId([1; 20]);
        c.lock(&alice, 182, ReceiverKey([3; 32]), Wei::from(10u64), &clock).unwrap();
        c.lock(&alice, 91, ReceiverKey([3; 32]), Wei::from(10u64), &clock).unwrap();
        c.unlock(&alice, 1, &clock).unwrap();

        let q = CampaignQuery::new(&c);
        let active = q.describe(&alice, 0, clock.now()).unwrap();
        assert!(active.contains("Active"), "{active}");
        assert!(active.contains("matures in 183 days"), "{active}");
        let cancelled = q.describe(&alice, 1, clock.now()).unwrap();
        assert!(cancelled.contains("Cancelled"), "{cancelled}");
        assert!(q.describe(&alice, 2, 0).is_err());
    }

    #[test]
    fn describe_accepts_extreme_timestamps() {
        let (clock, mut c) = setup();
        let alice = AccountId([1; 20]);
        c.lock(&alice, 91, ReceiverKey([3; 32]), Wei::from(10u64), &clock).unwrap();

        let q = CampaignQuery::new(&c);
        let early = q.describe(&alice, 0, i64::MIN).unwrap();
        assert!(early.contains("matures in"), "{early}");
        let late = q.describe(&alice, 0, i64::MAX).unwrap();
        assert!(late.contains("matured"), "{late}");
    }
}
