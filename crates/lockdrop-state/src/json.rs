use std::path::Path;

use lockdrop_core::error::LockdropError;
use lockdrop_core::event::{DepositEvent, LockdropEvent, UnlockEvent};
use lockdrop_core::source::{EventIter, EventSource};
use serde::{Deserialize, Serialize};

/// A decoded event log as produced by an external log fetcher:
///
/// ```json
/// { "deposits": [ { "sender": "0x…", "receiver": "0x…", "lockIndex": "0", "numOfTokens": "10" } ],
///   "unlocks":  [ { "sender": "0x…", "lockIndex": "0" } ] }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonEventLog {
    #[serde(default)]
    pub deposits: Vec<DepositEvent>,
    #[serde(default)]
    pub unlocks: Vec<UnlockEvent>,
}

impl JsonEventLog {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LockdropError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| LockdropError::Storage(format!("reading {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, LockdropError> {
        serde_json::from_str(json).map_err(|e| LockdropError::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, LockdropError> {
        serde_json::to_string_pretty(self).map_err(|e| LockdropError::Serialization(e.to_string()))
    }

    /// Split a combined log into the two per-kind sequences, preserving order.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a LockdropEvent>) -> Self {
        let mut log = Self::default();
        for event in events {
            match event {
                LockdropEvent::Deposit(d) => log.deposits.push(d.clone()),
                LockdropEvent::Unlock(u) => log.unlocks.push(u.clone()),
            }
        }
        log
    }
}

impl EventSource for JsonEventLog {
    fn deposits(&self) -> EventIter<'_, DepositEvent> {
        Box::new(self.deposits.iter().cloned().map(Ok))
    }

    fn unlocks(&self) -> EventIter<'_, UnlockEvent> {
        Box::new(self.unlocks.iter().cloned().map(Ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockdrop_core::types::{AccountId, ReceiverKey, Wei};

    #[test]
    fn parses_decoded_web3_events() {
        let json = r#"{
            "deposits": [
                { "sender": "0x0101010101010101010101010101010101010101",
                  "receiver": "0x04", "lockIndex": "0", "numOfTokens": "10" },
                { "sender": "0x0101010101010101010101010101010101010101",
                  "receiver": "0x04", "lockIndex": 1, "numOfTokens": 10 }
            ],
            "unlocks": [
                { "sender": "0x0101010101010101010101010101010101010101", "lockIndex": "1" }
            ]
        }"#;
        let log = JsonEventLog::from_json(json).unwrap();
        assert_eq!(log.deposits.len(), 2);
        assert_eq!(log.deposits[1].lock_index, 1);
        assert_eq!(log.deposits[1].num_of_tokens, Wei::from(10u64));
        assert_eq!(log.unlocks[0].sender, AccountId([1; 20]));
        assert_eq!(log.deposits().count(), 2);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let log = JsonEventLog::from_json("{}").unwrap();
        assert!(log.deposits.is_empty() && log.unlocks.is_empty());
    }

    #[test]
    fn export_then_load_keeps_order() {
        let events = vec![
            LockdropEvent::Deposit(DepositEvent {
                sender: AccountId([1; 20]),
                receiver: ReceiverKey([9; 32]),
                lock_index: 0,
                num_of_tokens: Wei::from(5u64),
            }),
            LockdropEvent::Unlock(UnlockEvent { sender: AccountId([1; 20]), lock_index: 0 }),
        ];
        let log = JsonEventLog::from_events(&events);
        let back = JsonEventLog::from_json(&log.to_json().unwrap()).unwrap();
        assert_eq!(back, log);
    }
}
