//! lockdrop-aggregator
//!
//! Offline reconstruction of the final allocation table from the campaign's
//! event history alone. Never reads live campaign storage.

pub mod replay;
pub mod table;

pub use replay::Aggregator;
pub use table::BalanceTable;
