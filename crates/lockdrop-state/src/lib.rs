//! lockdrop-state
//!
//! Persistence for a locally run campaign: the campaign snapshot and the
//! append-only event log live in one sled database, and a decoded event log
//! can also be read from a JSON file. Both are replayable `EventSource`s.

pub mod db;
pub mod json;

pub use db::StateDb;
pub use json::JsonEventLog;
