//! Events appended to the campaign's log on every lock transition.
//!
//! These are the only externally observable trace of campaign history. The
//! JSON form mirrors the decoded `returnValues` of the source contract's
//! `Deposit` and `Unlock` events.

use serde::{Deserialize, Serialize};

use crate::types::{index_serde, wei_serde, AccountId, LockIndex, ReceiverKey, Wei};

/// A new lock was created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositEvent {
    pub sender: AccountId,
    pub receiver: ReceiverKey,
    #[serde(with = "index_serde")]
    pub lock_index: LockIndex,
    #[serde(with = "wei_serde")]
    pub num_of_tokens: Wei,
}

/// A lock was cancelled before the campaign ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockEvent {
    pub sender: AccountId,
    #[serde(with = "index_serde")]
    pub lock_index: LockIndex,
}

/// One entry of the append-only event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockdropEvent {
    Deposit(DepositEvent),
    Unlock(UnlockEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_parses_web3_return_values() {
        let json = r#"{
            "sender": "0x1111111111111111111111111111111111111111",
            "receiver": "0x04",
            "lockIndex": "2",
            "numOfTokens": "1000000000000000000000"
        }"#;
        let ev: DepositEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ev.lock_index, 2);
        assert_eq!(ev.receiver, ReceiverKey::from_hex("0x04").unwrap());
        assert_eq!(ev.num_of_tokens, Wei::exp10(21));
    }

    #[test]
    fn event_survives_bincode() {
        let ev = LockdropEvent::Deposit(DepositEvent {
            sender: AccountId([7; 20]),
            receiver: ReceiverKey([9; 32]),
            lock_index: 5,
            num_of_tokens: Wei::from(42u64),
        });
        let bytes = bincode::serialize(&ev).unwrap();
        let back: LockdropEvent = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, ev);
    }
}
