//! lockdrop-campaign
//!
//! The allocation state machine: bonus curve, capacity accounting and the
//! per-account lock ledger, plus a read-side query layer. Every transition
//! runs against an explicitly passed `Campaign` and `CampaignClock`.

pub mod bonus;
pub mod campaign;
pub mod capacity;
pub mod clock;
pub mod query;

pub use bonus::{bonus_rate, effective_amount, is_accepted_duration};
pub use campaign::{Campaign, LockRecord, LockStatus, UnlockReceipt, WithdrawReceipt};
pub use capacity::CapacityLedger;
pub use clock::{BlockRef, CampaignClock, FixedClock, ManualClock, SystemClock};
pub use query::CampaignQuery;
