//! Time sources gating the campaign window.
//!
//! Each call is authoritative at call time; nothing is cached.

use std::cell::Cell;

use lockdrop_core::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Reference to the most recent block of the host ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub number: u64,
    pub timestamp: Timestamp,
}

pub trait CampaignClock {
    /// Current ledger time (Unix seconds).
    fn now(&self) -> Timestamp;

    /// Latest block reference.
    fn latest_block(&self) -> BlockRef;
}

/// Host wall clock. With no ledger attached the block number is always 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl CampaignClock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp()
    }

    fn latest_block(&self) -> BlockRef {
        BlockRef { number: 0, timestamp: self.now() }
    }
}

/// A clock frozen at one instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub Timestamp);

impl CampaignClock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }

    fn latest_block(&self) -> BlockRef {
        BlockRef { number: 0, timestamp: self.0 }
    }
}

/// Test clock that is moved forward by hand, one mined block at a time.
#[derive(Debug)]
pub struct ManualClock {
    head: Cell<BlockRef>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self { head: Cell::new(BlockRef { number: 0, timestamp: start }) }
    }

    /// Shift time forward without producing a block.
    pub fn advance_time(&self, secs: i64) {
        let mut head = self.head.get();
        head.timestamp += secs;
        self.head.set(head);
    }

    /// Mine one block at the current time.
    pub fn advance_block(&self) -> BlockRef {
        let mut head = self.head.get();
        head.number += 1;
        self.head.set(head);
        head
    }

    /// Advance time by `secs` and mine a block; returns the new head.
    pub fn advance_time_and_block(&self, secs: i64) -> BlockRef {
        self.advance_time(secs);
        self.advance_block()
    }
}

impl CampaignClock for ManualClock {
    fn now(&self) -> Timestamp {
        self.head.get().timestamp
    }

    fn latest_block(&self) -> BlockRef {
        self.head.get()
    }
}
