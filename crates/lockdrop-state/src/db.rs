use std::path::Path;

use lockdrop_campaign::Campaign;
use lockdrop_core::error::LockdropError;
use lockdrop_core::event::{DepositEvent, LockdropEvent, UnlockEvent};
use lockdrop_core::source::{EventIter, EventSource};
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionResult};
use sled::Transactional;
use tracing::{debug, info};

const CAMPAIGN_KEY: &str = "campaign";
const EVENT_SEQ_KEY: &str = "event_seq";

fn storage(e: impl ToString) -> LockdropError {
    LockdropError::Storage(e.to_string())
}

fn serialization(e: impl ToString) -> LockdropError {
    LockdropError::Serialization(e.to_string())
}

/// Persistent campaign database backed by sled (pure-Rust, no C dependencies).
///
/// Named trees:
///   meta    : "campaign"  → bincode(Campaign)
///             "event_seq" → next event sequence number (u64 BE)
///   events  : u64 BE seq  → bincode(LockdropEvent)
pub struct StateDb {
    _db: sled::Db,
    meta: sled::Tree,
    events: sled::Tree,
}

impl StateDb {
    /// Open or create the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LockdropError> {
        let db = sled::open(path).map_err(storage)?;
        let meta = db.open_tree("meta").map_err(storage)?;
        let events = db.open_tree("events").map_err(storage)?;
        Ok(Self { _db: db, meta, events })
    }

    // ── Campaign snapshot ────────────────────────────────────────────────────

    pub fn get_campaign(&self) -> Result<Option<Campaign>, LockdropError> {
        match self.meta.get(CAMPAIGN_KEY).map_err(storage)? {
            Some(bytes) => {
                let campaign = bincode::deserialize(&bytes).map_err(serialization)?;
                Ok(Some(campaign))
            }
            None => Ok(None),
        }
    }

    /// Load the campaign, failing if none was initialised.
    pub fn load_campaign(&self) -> Result<Campaign, LockdropError> {
        self.get_campaign()?.ok_or(LockdropError::NoCampaign)
    }

    /// Store a freshly opened campaign. Refuses to overwrite an existing one.
    pub fn init_campaign(&self, campaign: &mut Campaign) -> Result<(), LockdropError> {
        if self.meta.contains_key(CAMPAIGN_KEY).map_err(storage)? {
            return Err(LockdropError::CampaignExists);
        }
        self.commit(campaign)?;
        info!(ending = campaign.ending, "campaign initialised");
        Ok(())
    }

    // ── Commit ───────────────────────────────────────────────────────────────

    /// Append the campaign's pending events and write its snapshot in one
    /// sled transaction. Returns the number of events appended.
    pub fn commit(&self, campaign: &mut Campaign) -> Result<usize, LockdropError> {
        let pending = campaign.take_events();
        let snapshot = bincode::serialize(&*campaign).map_err(serialization)?;
        let encoded = pending
            .iter()
            .map(bincode::serialize)
            .collect::<Result<Vec<_>, _>>()
            .map_err(serialization)?;

        let result: TransactionResult<u64, String> =
            (&self.meta, &self.events).transaction(|(meta, events)| {
                let mut seq = match meta.get(EVENT_SEQ_KEY)? {
                    Some(bytes) => {
                        let arr = <[u8; 8]>::try_from(bytes.as_ref()).map_err(|_| {
                            ConflictableTransactionError::Abort("corrupt event sequence".to_string())
                        })?;
                        u64::from_be_bytes(arr)
                    }
                    None => 0,
                };
                for bytes in &encoded {
                    events.insert(seq.to_be_bytes().to_vec(), bytes.as_slice())?;
                    seq += 1;
                }
                meta.insert(EVENT_SEQ_KEY, seq.to_be_bytes().to_vec())?;
                meta.insert(CAMPAIGN_KEY, snapshot.as_slice())?;
                Ok(seq)
            });

        let next_seq = result.map_err(|e| match e {
            TransactionError::Abort(reason) => LockdropError::Storage(reason),
            TransactionError::Storage(err) => storage(err),
        })?;
        self.flush()?;

        debug!(appended = pending.len(), next_seq, "campaign committed");
        Ok(pending.len())
    }

    // ── Event log ────────────────────────────────────────────────────────────

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Every event in append order.
    pub fn iter_events(&self) -> impl Iterator<Item = Result<LockdropEvent, LockdropError>> + '_ {
        self.events.iter().values().map(|item| {
            let bytes = item.map_err(storage)?;
            bincode::deserialize(&bytes).map_err(serialization)
        })
    }

    /// Collect the full log into memory.
    pub fn events(&self) -> Result<Vec<LockdropEvent>, LockdropError> {
        self.iter_events().collect()
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), LockdropError> {
        self._db.flush().map_err(storage)?;
        Ok(())
    }
}

impl EventSource for StateDb {
    fn deposits(&self) -> EventIter<'_, DepositEvent> {
        Box::new(self.iter_events().filter_map(|item| match item {
            Ok(LockdropEvent::Deposit(d)) => Some(Ok(d)),
            Ok(LockdropEvent::Unlock(_)) => None,
            Err(e) => Some(Err(e)),
        }))
    }

    fn unlocks(&self) -> EventIter<'_, UnlockEvent> {
        Box::new(self.iter_events().filter_map(|item| match item {
            Ok(LockdropEvent::Unlock(u)) => Some(Ok(u)),
            Ok(LockdropEvent::Deposit(_)) => None,
            Err(e) => Some(Err(e)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockdrop_campaign::ManualClock;
    use lockdrop_core::params::CampaignParams;
    use lockdrop_core::types::{AccountId, ReceiverKey, Wei};

    fn temp_db(name: &str) -> StateDb {
        let dir = std::env::temp_dir().join(format!("lockdrop_state_test_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        StateDb::open(&dir).expect("open temp db")
    }

    fn new_campaign(clock: &ManualClock) -> Campaign {
        let params = CampaignParams {
            lock_period_days: 7,
            token_capacity: Wei::from(1_000u64),
            token_price: Wei::one(),
        };
        Campaign::new(&params, clock).unwrap()
    }

    #[test]
    fn missing_campaign_is_reported() {
        let db = temp_db("missing");
        assert!(db.get_campaign().unwrap().is_none());
        assert!(matches!(db.load_campaign(), Err(LockdropError::NoCampaign)));
    }

    #[test]
    fn init_refuses_second_campaign() {
        let db = temp_db("init_twice");
        let clock = ManualClock::new(1_000);
        let mut c = new_campaign(&clock);
        db.init_campaign(&mut c).unwrap();
        let mut again = new_campaign(&clock);
        assert!(matches!(
            db.init_campaign(&mut again),
            Err(LockdropError::CampaignExists)
        ));
    }

    #[test]
    fn commit_appends_events_in_order() {
        let db = temp_db("commit_order");
        let clock = ManualClock::new(1_000);
        let mut c = new_campaign(&clock);
        db.init_campaign(&mut c).unwrap();

        let alice = AccountId([1; 20]);
        c.lock(&alice, 91, ReceiverKey([4; 32]), Wei::from(10u64), &clock).unwrap();
        c.lock(&alice, 91, ReceiverKey([5; 32]), Wei::from(20u64), &clock).unwrap();
        assert_eq!(db.commit(&mut c).unwrap(), 2);

        let mut reloaded = db.load_campaign().unwrap();
        assert_eq!(reloaded.remaining_capacity(), Wei::from(970u64));
        reloaded.unlock(&alice, 0, &clock).unwrap();
        assert_eq!(db.commit(&mut reloaded).unwrap(), 1);

        let events = db.events().unwrap();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], LockdropEvent::Deposit(d) if d.lock_index == 0));
        assert!(matches!(&events[1], LockdropEvent::Deposit(d) if d.lock_index == 1));
        assert!(matches!(&events[2], LockdropEvent::Unlock(u) if u.lock_index == 0));

        assert_eq!(db.deposits().count(), 2);
        assert_eq!(db.unlocks().count(), 1);
        assert_eq!(db.event_count(), 3);
    }

    #[test]
    fn state_survives_reopen() {
        let dir = std::env::temp_dir().join("lockdrop_state_test_reopen");
        let _ = std::fs::remove_dir_all(&dir);
        let clock = ManualClock::new(1_000);
        {
            let db = StateDb::open(&dir).unwrap();
            let mut c = new_campaign(&clock);
            c.lock(&AccountId([2; 20]), 200, ReceiverKey([6; 32]), Wei::from(50u64), &clock)
                .unwrap();
            db.init_campaign(&mut c).unwrap();
        }
        let db = StateDb::open(&dir).unwrap();
        let c = db.load_campaign().unwrap();
        assert_eq!(c.participants().len(), 1);
        assert_eq!(db.event_count(), 1);
    }
}
