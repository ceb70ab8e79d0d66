use crate::error::LockdropError;
use crate::event::{DepositEvent, LockdropEvent, UnlockEvent};

/// Boxed, fallible event iterator.
pub type EventIter<'a, T> = Box<dyn Iterator<Item = Result<T, LockdropError>> + 'a>;

/// An ordered, append-only event history.
///
/// Each call starts a fresh scan from genesis, so a source can be replayed
/// any number of times.
pub trait EventSource {
    /// Deposit events in log order.
    fn deposits(&self) -> EventIter<'_, DepositEvent>;

    /// Unlock events in log order.
    fn unlocks(&self) -> EventIter<'_, UnlockEvent>;
}

impl EventSource for [LockdropEvent] {
    fn deposits(&self) -> EventIter<'_, DepositEvent> {
        Box::new(self.iter().filter_map(|ev| match ev {
            LockdropEvent::Deposit(d) => Some(Ok(d.clone())),
            LockdropEvent::Unlock(_) => None,
        }))
    }

    fn unlocks(&self) -> EventIter<'_, UnlockEvent> {
        Box::new(self.iter().filter_map(|ev| match ev {
            LockdropEvent::Unlock(u) => Some(Ok(u.clone())),
            LockdropEvent::Deposit(_) => None,
        }))
    }
}

impl EventSource for Vec<LockdropEvent> {
    fn deposits(&self) -> EventIter<'_, DepositEvent> {
        self.as_slice().deposits()
    }

    fn unlocks(&self) -> EventIter<'_, UnlockEvent> {
        self.as_slice().unlocks()
    }
}
